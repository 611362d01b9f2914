//! Error types for address watchers

use thiserror::Error;

use crate::error::AppError;

/// Errors from a watcher. Any of them empties that target's result for
/// the current invocation.
#[derive(Error, Debug)]
pub enum WatcherError {
    #[error("Network error: {message}")]
    NetworkError { message: String },

    #[error("Data format error: {message}")]
    FormatError { message: String },

    #[error("No watcher registered for provider {provider}")]
    Unsupported { provider: String },
}

impl From<AppError> for WatcherError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Parse(message) => WatcherError::FormatError { message },
            other => WatcherError::NetworkError {
                message: other.to_string(),
            },
        }
    }
}
