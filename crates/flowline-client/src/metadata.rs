//! Client for the engine's metadata registry: task type definitions and
//! workflow definitions. All writes are idempotent upserts keyed by name
//! (and version, for workflow definitions).

use tracing::debug;

use flowline_core::{EngineConfig, Result, TaskDef, WorkflowDefinition};

use crate::http::{build_client, check_status, transport};

pub struct MetadataClient {
    http: reqwest::Client,
    base_url: String,
}

impl MetadataClient {
    pub fn new(config: &EngineConfig) -> Result<Self> {
        Ok(Self {
            http: build_client(config)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Upsert task type definitions.
    pub async fn register_task_defs(&self, defs: &[TaskDef]) -> Result<()> {
        debug!(count = defs.len(), "Registering task definitions");
        let response = self
            .http
            .post(format!("{}/metadata/taskdefs", self.base_url))
            .json(defs)
            .send()
            .await
            .map_err(transport)?;
        check_status(response).await?;
        Ok(())
    }

    /// List every task type definition known to the engine.
    pub async fn list_task_defs(&self) -> Result<Vec<TaskDef>> {
        let response = self
            .http
            .get(format!("{}/metadata/taskdefs", self.base_url))
            .send()
            .await
            .map_err(transport)?;
        check_status(response).await?.json().await.map_err(transport)
    }

    /// Remove a task type definition by name.
    pub async fn unregister_task_def(&self, name: &str) -> Result<()> {
        debug!(name, "Unregistering task definition");
        let response = self
            .http
            .delete(format!("{}/metadata/taskdefs/{}", self.base_url, name))
            .send()
            .await
            .map_err(transport)?;
        check_status(response).await?;
        Ok(())
    }

    /// Upsert workflow definitions.
    pub async fn update_workflow_defs(&self, defs: &[WorkflowDefinition]) -> Result<()> {
        debug!(count = defs.len(), "Updating workflow definitions");
        let response = self
            .http
            .put(format!("{}/metadata/workflow", self.base_url))
            .json(defs)
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
    fn test_base_url_trailing_slash_trimmed() {
        let config = EngineConfig::new("http://localhost:8080/api/");
        let client = MetadataClient::new(&config).unwrap();
        assert_eq!(client.base_url, "http://localhost:8080/api");
    }
}
