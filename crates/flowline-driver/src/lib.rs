//! Execution driver.
//!
//! Ties the pieces together for one run: compile and register the workflow
//! definition, register the task types it uses, start the run, optionally
//! start a worker per task type, and poll until the run reaches a terminal
//! status.
//!
//! Polling is a single-threaded cooperative wait: one status fetch per
//! interval, no concurrent polls of the same run. A transport failure while
//! polling is fatal to the driver and propagates; a run that ends `FAILED`
//! or `TERMINATED` is not an error here — the caller reads the handle's
//! status.

use std::collections::HashSet;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use flowline_client::{MetadataClient, WorkflowClient};
use flowline_core::{
    EngineConfig, ExecutionHandle, JsonMap, Result, RunStatus, TaskDef, TaskHandler, Workflow,
    WorkflowDefinition,
};
use flowline_worker::TaskWorker;

/// Per-call knobs for [`ExecutionDriver::execute`].
pub struct ExecuteOptions {
    /// Spawn a worker loop for every task type in the workflow.
    pub start_workers: bool,
    /// Poll until the run is terminal before returning.
    pub wait: bool,
    /// Aborts the wait (and any spawned workers) when cancelled.
    pub cancel: CancellationToken,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            start_workers: false,
            wait: true,
            cancel: CancellationToken::new(),
        }
    }
}

pub struct ExecutionDriver {
    config: EngineConfig,
    metadata: MetadataClient,
    workflows: WorkflowClient,
}

impl ExecutionDriver {
    pub fn new(config: EngineConfig) -> Result<Self> {
        Ok(Self {
            metadata: MetadataClient::new(&config)?,
            workflows: WorkflowClient::new(&config)?,
            config,
        })
    }

    /// Compile `workflow` and upsert its definition and the task type
    /// definitions it uses. Safe to call repeatedly.
    pub async fn register(&self, workflow: &Workflow) -> Result<WorkflowDefinition> {
        let definition = workflow.compile()?;
        self.metadata
            .update_workflow_defs(std::slice::from_ref(&definition))
            .await?;

        let task_defs = distinct_task_defs(workflow);
        if !task_defs.is_empty() {
            self.metadata.register_task_defs(&task_defs).await?;
        }

        info!(workflow = %definition.name, tasks = definition.tasks.len(), "Workflow registered");
        Ok(definition)
    }

    /// Register, start a run with `initial_inputs`, and drive it according
    /// to `opts`.
    ///
    /// `handlers` are only consulted when `opts.start_workers` is set; one
    /// worker is spawned per handler, each bound to its descriptor's task
    /// type.
    pub async fn execute(
        &self,
        workflow: &Workflow,
        handlers: &[Arc<dyn TaskHandler>],
        initial_inputs: JsonMap,
        opts: ExecuteOptions,
    ) -> Result<ExecutionHandle> {
        let definition = self.register(workflow).await?;
        let run_id = self
            .workflows
            .start_workflow(&definition.name, definition.version, &initial_inputs)
            .await?;
        info!(workflow = %definition.name, run_id = %run_id, "Run started");

        if opts.start_workers {
            for handler in handlers {
                let worker = TaskWorker::new(&self.config, Arc::clone(handler))?;
                worker.spawn(opts.cancel.child_token());
            }
        }

        if opts.wait {
            self.wait_for_completion(&run_id, &opts.cancel).await
        } else {
            Ok(ExecutionHandle::running(run_id))
        }
    }

    /// Poll the run at the configured interval until it reaches a terminal
    /// status or `cancel` fires. On cancellation the handle carries the last
    /// observed (non-terminal) status.
    pub async fn wait_for_completion(
        &self,
        run_id: &str,
        cancel: &CancellationToken,
    ) -> Result<ExecutionHandle> {
        loop {
            let state = self.workflows.get_workflow(run_id).await?;
            if state.status.is_terminal() {
                if state.status != RunStatus::Completed {
                    warn!(run_id, status = %state.status, "Run ended unsuccessfully");
                }
                return Ok(ExecutionHandle {
                    id: run_id.to_string(),
                    status: state.status,
                    output: state.output,
                });
            }

            tokio::select! {
                _ = tokio::time::sleep(self.config.poll_interval()) => {}
                _ = cancel.cancelled() => {
                    info!(run_id, "Wait cancelled");
                    return Ok(ExecutionHandle {
                        id: run_id.to_string(),
                        status: state.status,
                        output: state.output,
                    });
                }
            }
        }
    }
}

/// Registration payloads for every distinct task type in the workflow.
///
/// Two aliases of the same task type register it once.
pub fn distinct_task_defs(workflow: &Workflow) -> Vec<TaskDef> {
    let mut seen = HashSet::new();
    let mut defs: Vec<TaskDef> = workflow
        .tasks()
        .values()
        .filter(|task| seen.insert(task.name.clone()))
        .map(|task| task.to_task_def())
        .collect();
    defs.sort_by(|a, b| a.name.cmp(&b.name));
    defs
}
