//! Error types for the crawl, checkpoint, and CLI layers.

use std::path::PathBuf;
use thiserror::Error;

/// Checkpoint persistence errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Corrupt checkpoint {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Failed to serialize checkpoint: {0}")]
    SerializeError(String),
}

/// Top-level error surfaced to callers of the engine and the CLI
#[derive(Debug, Error)]
pub enum ApiError {
    /// A listing call did not succeed. `status` is the HTTP status when one was received.
    #[error("Remote error{}: {message}", status.map(|s| format!(" ({})", s)).unwrap_or_default())]
    RemoteError {
        status: Option<u16>,
        message: String,
    },

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Authentication failed: {0}")]
    AuthError(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl ApiError {
    pub fn remote(status: Option<u16>, message: impl Into<String>) -> Self {
        ApiError::RemoteError {
            status,
            message: message.into(),
        }
    }

    /// True for a corrupt checkpoint, which `--no-resume` is allowed to override.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, ApiError::StorageError(StorageError::ParseError { .. }))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::RemoteError {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_display_includes_status() {
        let err = ApiError::remote(Some(429), "rate limited");
        assert_eq!(err.to_string(), "Remote error (429): rate limited");

        let err = ApiError::remote(None, "connection reset");
        assert_eq!(err.to_string(), "Remote error: connection reset");
    }

    #[test]
    fn test_is_parse_error() {
        let err = ApiError::from(StorageError::ParseError {
            path: PathBuf::from(".checkpoint"),
            message: "expected value".to_string(),
        });
        assert!(err.is_parse_error());

        let err = ApiError::from(StorageError::IoError(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        )));
        assert!(!err.is_parse_error());
    }
}
