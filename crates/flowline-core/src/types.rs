use serde::{Deserialize, Serialize};

/// Keyed document used for all engine payloads (inputs, outputs, templates).
pub type JsonMap = serde_json::Map<String, serde_json::Value>;

/// Status of a workflow run as reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
    Terminated,
    Paused,
    TimedOut,
}

impl RunStatus {
    /// Whether the run has finished. `Paused` is deliberately non-terminal:
    /// a poll loop must keep looping through it.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunStatus::Completed | RunStatus::Failed | RunStatus::Terminated | RunStatus::TimedOut
        )
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Running => write!(f, "RUNNING"),
            RunStatus::Completed => write!(f, "COMPLETED"),
            RunStatus::Failed => write!(f, "FAILED"),
            RunStatus::Terminated => write!(f, "TERMINATED"),
            RunStatus::Paused => write!(f, "PAUSED"),
            RunStatus::TimedOut => write!(f, "TIMED_OUT"),
        }
    }
}

/// Handle to one execution of a workflow definition.
///
/// `output` stays empty until the run reaches a terminal status.
#[derive(Debug, Clone)]
pub struct ExecutionHandle {
    pub id: String,
    pub status: RunStatus,
    pub output: JsonMap,
}

impl ExecutionHandle {
    pub fn running(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: RunStatus::Running,
            output: JsonMap::new(),
        }
    }
}

/// Terminal status of one task execution inside a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskResultStatus {
    Completed,
    Failed,
}
