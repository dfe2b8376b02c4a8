//! Client for the engine's task queue API, used by worker loops to claim
//! pending work items and post results back.

use serde::{Deserialize, Serialize};
use tracing::debug;

use flowline_core::{EngineConfig, JsonMap, Result, TaskResultStatus};

use crate::http::{build_client, check_status, transport};

/// A claimed work item: one scheduled execution of a task type inside a run.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingTask {
    pub task_id: String,
    pub workflow_instance_id: String,
    #[serde(default)]
    pub task_type: String,
    #[serde(default)]
    pub input_data: JsonMap,
}

/// Result envelope posted back for one work item.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResult {
    pub workflow_instance_id: String,
    pub task_id: String,
    pub worker_id: String,
    pub status: TaskResultStatus,
    pub output_data: JsonMap,
    pub logs: Vec<String>,
}

pub struct TaskClient {
    http: reqwest::Client,
    base_url: String,
}

impl TaskClient {
    pub fn new(config: &EngineConfig) -> Result<Self> {
        Ok(Self {
            http: build_client(config)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Claim one pending work item of `task_type`, if any is queued.
    pub async fn poll(
        &self,
        task_type: &str,
        worker_id: &str,
        domain: Option<&str>,
    ) -> Result<Option<PendingTask>> {
        let mut request = self
            .http
            .get(format!("{}/tasks/poll/{}", self.base_url, task_type))
            .query(&[("workerid", worker_id)]);
        if let Some(domain) = domain {
            request = request.query(&[("domain", domain)]);
        }
        let response = request.send().await.map_err(transport)?;
        let response = check_status(response).await?;

        // An empty queue is a 204 or an empty body, not an error.
        if response.status() == reqwest::StatusCode::NO_CONTENT {
            return Ok(None);
        }
        let body = response.bytes().await.map_err(transport)?;
        if body.is_empty() {
            return Ok(None);
        }
        let task: PendingTask = serde_json::from_slice(&body)?;
        debug!(task_id = %task.task_id, task_type, "Claimed work item");
        Ok(Some(task))
    }

    /// Post the result of a claimed work item.
    pub async fn update_task(&self, result: &TaskResult) -> Result<()> {
        debug!(task_id = %result.task_id, status = ?result.status, "Posting task result");
        let response = self
            .http
            .post(format!("{}/tasks", self.base_url))
            .json(result)
            .send()
            .await
            .map_err(transport)?;
        check_status(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_task_parses_engine_payload() {
        let body = r#"{
            "taskId": "t-1",
            "workflowInstanceId": "wf-1",
            "taskType": "sum",
            "inputData": {"i0": 1.0, "i1": 2.0},
            "status": "IN_PROGRESS"
        }"#;
        let task: PendingTask = serde_json::from_str(body).unwrap();
        assert_eq!(task.task_id, "t-1");
        assert_eq!(task.input_data["i1"], serde_json::json!(2.0));
    }

    #[test]
    fn test_task_result_wire_format() {
        let result = TaskResult {
            workflow_instance_id: "wf-1".into(),
            task_id: "t-1".into(),
            worker_id: "w-1".into(),
            status: TaskResultStatus::Completed,
            output_data: JsonMap::new(),
            logs: vec!["done".into()],
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["workflowInstanceId"], "wf-1");
        assert_eq!(json["status"], "COMPLETED");
        assert_eq!(json["outputData"], serde_json::json!({}));
    }
}
