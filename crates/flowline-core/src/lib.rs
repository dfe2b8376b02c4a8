pub mod config;
pub mod error;
pub mod task;
pub mod types;
pub mod workflow;

pub use config::{EngineConfig, WorkerConfig};
pub use error::{FlowlineError, Result};
pub use task::{TaskDef, TaskDescriptor, TaskHandler};
pub use types::{ExecutionHandle, JsonMap, RunStatus, TaskResultStatus};
pub use workflow::{resolve_endpoint, CompiledTask, Workflow, WorkflowDefinition};
