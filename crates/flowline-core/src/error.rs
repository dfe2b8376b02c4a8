use thiserror::Error;

#[derive(Debug, Error)]
pub enum FlowlineError {
    // Graph build errors
    #[error("A task with alias '{alias}' already exists in this workflow")]
    DuplicateAlias { alias: String },

    #[error("Connection endpoint '{endpoint}' does not match any task port or workflow input")]
    UnknownEndpoint { endpoint: String },

    // Engine transport errors
    #[error("Engine request failed: {0}")]
    Transport(String),

    #[error("Engine returned HTTP {status}: {body}")]
    Engine { status: u16, body: String },

    // Config errors
    #[error("Config error: {0}")]
    Config(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FlowlineError>;
