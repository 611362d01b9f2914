use thiserror::Error;

/// Unified application error.
///
/// Clients, the idempotency store and the chat sinks all report through
/// this type so the orchestrator can log every failure the same way.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Store error: {0}")]
    Store(#[from] sqlx::Error),

    #[error("Delivery error: {0}")]
    Delivery(String),
}

impl AppError {
    /// Build a `Network` error from a non-2xx upstream answer.
    pub fn http_status(service: &str, status: reqwest::StatusCode) -> Self {
        AppError::Network(format!("{} returned HTTP {}", service, status))
    }
}
