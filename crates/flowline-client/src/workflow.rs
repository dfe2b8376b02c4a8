//! Client for the engine's run lifecycle API: start a run, fetch its state.

use serde::Deserialize;
use tracing::debug;

use flowline_core::{EngineConfig, JsonMap, Result, RunStatus};

use crate::http::{build_client, check_status, transport};

/// State of one run, as reported by the engine.
///
/// `output` is only meaningful once `status` is terminal; the engine may
/// omit it entirely before then.
#[derive(Debug, Clone, Deserialize)]
pub struct RunState {
    pub status: RunStatus,
    #[serde(default)]
    pub output: JsonMap,
}

pub struct WorkflowClient {
    http: reqwest::Client,
    base_url: String,
}

impl WorkflowClient {
    pub fn new(config: &EngineConfig) -> Result<Self> {
        Ok(Self {
            http: build_client(config)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Start a run of a registered workflow definition, passing `input` as
    /// the workflow-level input bindings. Returns the opaque run id.
    pub async fn start_workflow(
        &self,
        name: &str,
        version: u32,
        input: &JsonMap,
    ) -> Result<String> {
        debug!(workflow = name, version, "Starting workflow run");
        let response = self
            .http
            .post(format!("{}/workflow/{}", self.base_url, name))
            .query(&[("version", version)])
            .json(input)
            .send()
            .await
            .map_err(transport)?;
        let run_id = check_status(response)
            .await?
            .text()
            .await
            .map_err(transport)?;
        Ok(run_id.trim().trim_matches('"').to_string())
    }

    /// Fetch the current state of a run.
    pub async fn get_workflow(&self, run_id: &str) -> Result<RunState> {
        let response = self
            .http
            .get(format!("{}/workflow/{}", self.base_url, run_id))
            .query(&[("includeTasks", "false")])
            .send()
            .await
            .map_err(transport)?;
        check_status(response).await?.json().await.map_err(transport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_state_parses_engine_payload() {
        let body = r#"{
            "workflowId": "abc-123",
            "status": "COMPLETED",
            "output": {"total": 7.0},
            "startTime": 1
        }"#;
        let state: RunState = serde_json::from_str(body).unwrap();
        assert_eq!(state.status, RunStatus::Completed);
        assert_eq!(state.output["total"], serde_json::json!(7.0));
    }

    #[test]
    fn test_run_state_without_output() {
        let state: RunState = serde_json::from_str(r#"{"status": "RUNNING"}"#).unwrap();
        assert_eq!(state.status, RunStatus::Running);
        assert!(state.output.is_empty());
    }
}
