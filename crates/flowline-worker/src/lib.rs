//! Task worker loop.
//!
//! A [`TaskWorker`] binds one [`TaskHandler`] to its task type and
//! repeatedly claims pending work items from the engine, executes the
//! handler, and posts the `{status, output, logs}` envelope back. Workers
//! are independent of each other; the only shared state is the engine
//! itself.
//!
//! Transport hiccups while polling or posting are logged and the loop keeps
//! going — a worker must survive an engine restart. Handler failures become
//! `FAILED` task results, with the error text attached as a log line.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use flowline_client::{PendingTask, TaskClient, TaskResult};
use flowline_core::{EngineConfig, Result, TaskHandler, TaskResultStatus};

pub struct TaskWorker {
    client: TaskClient,
    handler: Arc<dyn TaskHandler>,
    task_type: String,
    worker_id: String,
    poll_interval: Duration,
    domain: Option<String>,
}

impl TaskWorker {
    pub fn new(config: &EngineConfig, handler: Arc<dyn TaskHandler>) -> Result<Self> {
        let worker_id = config
            .worker
            .worker_id
            .clone()
            .unwrap_or_else(|| format!("flowline-{}", uuid::Uuid::new_v4()));
        Ok(Self {
            client: TaskClient::new(config)?,
            task_type: handler.descriptor().name.clone(),
            handler,
            worker_id,
            poll_interval: Duration::from_millis(config.worker.poll_interval_ms),
            domain: config.worker.domain.clone(),
        })
    }

    /// Run the poll-execute loop. Blocks until cancelled.
    pub async fn run(&self, cancel: CancellationToken) {
        info!(
            task_type = %self.task_type,
            worker_id = %self.worker_id,
            "Worker started"
        );

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                _ = cancel.cancelled() => {
                    info!(task_type = %self.task_type, "Worker shutting down");
                    break;
                }
            }

            let pending = match self
                .client
                .poll(&self.task_type, &self.worker_id, self.domain.as_deref())
                .await
            {
                Ok(Some(task)) => task,
                Ok(None) => continue,
                Err(e) => {
                    warn!(task_type = %self.task_type, error = %e, "Poll failed");
                    continue;
                }
            };

            let result = execute_handler(self.handler.as_ref(), &self.worker_id, pending).await;
            if let Err(e) = self.client.update_task(&result).await {
                error!(
                    task_type = %self.task_type,
                    task_id = %result.task_id,
                    error = %e,
                    "Failed to post task result"
                );
            }
        }
    }

    /// Start the loop on the runtime without blocking the caller.
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(cancel).await })
    }
}

/// Execute a handler against one claimed work item and build the result
/// envelope.
///
/// The input map starts from the descriptor's declared defaults, overlaid
/// with whatever the engine bound for this run.
pub async fn execute_handler(
    handler: &dyn TaskHandler,
    worker_id: &str,
    task: PendingTask,
) -> TaskResult {
    let mut inputs = handler.descriptor().default_inputs();
    for (key, value) in task.input_data {
        inputs.insert(key, value);
    }

    match handler.run(inputs).await {
        Ok(outputs) => TaskResult {
            workflow_instance_id: task.workflow_instance_id,
            task_id: task.task_id,
            worker_id: worker_id.to_string(),
            status: TaskResultStatus::Completed,
            output_data: outputs,
            logs: Vec::new(),
        },
        Err(e) => {
            error!(task_id = %task.task_id, error = %e, "Task handler failed");
            TaskResult {
                workflow_instance_id: task.workflow_instance_id,
                task_id: task.task_id,
                worker_id: worker_id.to_string(),
                status: TaskResultStatus::Failed,
                output_data: flowline_core::JsonMap::new(),
                logs: vec![e.to_string()],
            }
        }
    }
}
