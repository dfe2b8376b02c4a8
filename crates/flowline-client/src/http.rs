use flowline_core::{EngineConfig, FlowlineError, Result};

/// Build the shared reqwest client with the configured request timeout.
pub(crate) fn build_client(config: &EngineConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.request_timeout())
        .build()
        .map_err(|e| FlowlineError::Transport(e.to_string()))
}

pub(crate) fn transport(e: reqwest::Error) -> FlowlineError {
    FlowlineError::Transport(e.to_string())
}

/// Map a non-2xx engine reply into [`FlowlineError::Engine`].
pub(crate) async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "unknown".to_string());
    Err(FlowlineError::Engine {
        status: status.as_u16(),
        body,
    })
}
