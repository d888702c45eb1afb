//! HTTP transport error types

use thiserror::Error;

/// HTTP transport error types
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP client error (connection refused, non-success status, unreadable body)
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// HTTP method name that is not a valid token
    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    /// Server error
    #[error("Server error: {0}")]
    ServerError(String),
}

/// Result type for HTTP transport operations
pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for remotestage_core::Error {
    fn from(e: Error) -> Self {
        match e {
            Error::SerializationError(e) => remotestage_core::Error::Serialization(e),
            Error::InvalidMethod(method) => {
                remotestage_core::Error::ConfigError(format!("Invalid HTTP method: {}", method))
            }
            other => remotestage_core::Error::RemoteExecutionFailed(other.to_string()),
        }
    }
}
