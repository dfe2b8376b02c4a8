//! HTTP clients for the remote orchestration engine.
//!
//! Three thin clients over the engine's JSON API: [`MetadataClient`] for the
//! task/workflow definition registry, [`WorkflowClient`] for the run
//! lifecycle, and [`TaskClient`] for the worker-side task queue. Transport
//! failures surface as [`flowline_core::FlowlineError::Transport`] and are
//! never retried here.

mod http;
pub mod metadata;
pub mod tasks;
pub mod workflow;

pub use metadata::MetadataClient;
pub use tasks::{PendingTask, TaskClient, TaskResult};
pub use workflow::{RunState, WorkflowClient};
