//! Engine connection configuration.
//!
//! The engine endpoint is always passed in explicitly — nothing in this
//! workspace bakes a default service address into call sites. Binaries load
//! an [`EngineConfig`] from TOML or construct one from a flag.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{FlowlineError, Result};

/// Connection settings for the remote orchestration engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Base URL of the engine API, e.g. `http://localhost:8080/api`.
    pub base_url: String,

    /// Interval between run-status polls while waiting for completion.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Per-request timeout for engine calls.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub worker: WorkerConfig,
}

/// Settings for task worker loops.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Stable worker identity reported to the engine. Auto-generated when
    /// unset.
    #[serde(default)]
    pub worker_id: Option<String>,

    /// Interval between work-item polls when the queue is empty.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Optional task domain to poll within.
    #[serde(default)]
    pub domain: Option<String>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            worker_id: None,
            poll_interval_ms: default_poll_interval_ms(),
            domain: None,
        }
    }
}

fn default_poll_interval_ms() -> u64 {
    100
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl EngineConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            poll_interval_ms: default_poll_interval_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            worker: WorkerConfig::default(),
        }
    }

    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| FlowlineError::Config(e.to_string()))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
