//! Error types module
//!
//! All failures a client operation can hit are unified under [`ClientError`]. Each variant
//! describes how it should be presented: whether the user can retry, which message to show,
//! and at which level it should be logged.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like a rejected request
    Warn,
    /// Error level - for unexpected failures
    Error,
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("API request failed with status {status}: {detail}")]
    Api { status: u16, detail: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

pub type ClientResult<T> = Result<T, ClientError>;

impl From<anyhow::Error> for ClientError {
    fn from(err: anyhow::Error) -> Self {
        ClientError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for ClientError {
    fn from(err: io::Error) -> Self {
        ClientError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(format!("JSON parsing error: {}", err))
    }
}

impl From<validator::ValidationErrors> for ClientError {
    fn from(err: validator::ValidationErrors) -> Self {
        ClientError::Validation(format!("Validation error: {}", err))
    }
}

impl ClientError {
    /// Whether retrying the same operation may succeed.
    pub fn is_recoverable(&self) -> bool {
        match self {
            ClientError::Api { status, .. } => *status >= 500 || *status == 408 || *status == 429,
            ClientError::Transport(_) => true,
            ClientError::Decode(_)
            | ClientError::Validation(_)
            | ClientError::NotFound(_)
            | ClientError::Internal(_)
            | ClientError::InternalWithSource { .. } => false,
        }
    }

    pub fn log_level(&self) -> LogLevel {
        match self {
            ClientError::Validation(_) | ClientError::NotFound(_) => LogLevel::Debug,
            ClientError::Api { status, .. } if *status < 500 => LogLevel::Warn,
            ClientError::Transport(_) => LogLevel::Warn,
            _ => LogLevel::Error,
        }
    }

    /// Message suitable for showing to the user.
    ///
    /// API failures surface the server's `detail` verbatim; internal failures are not
    /// described beyond a generic line.
    pub fn client_message(&self) -> String {
        match self {
            ClientError::Api { detail, .. } => detail.clone(),
            ClientError::Transport(_) => "Network error".to_string(),
            ClientError::Decode(_) => "Unexpected response from server".to_string(),
            ClientError::Validation(msg) | ClientError::NotFound(msg) => msg.clone(),
            ClientError::Internal(_) | ClientError::InternalWithSource { .. } => {
                "An internal error occurred".to_string()
            }
        }
    }

    /// Emit this error through `tracing` at its own level.
    pub fn log(&self, operation: &str) {
        match self.log_level() {
            LogLevel::Debug => tracing::debug!(operation, error = %self, "operation rejected"),
            LogLevel::Warn => tracing::warn!(operation, error = %self, "operation failed"),
            LogLevel::Error => tracing::error!(operation, error = ?self, "operation failed"),
        }
    }
}
