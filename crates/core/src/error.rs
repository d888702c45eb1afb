//! Error types for remotestage-core

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while running a pipeline
#[derive(Debug, Error)]
pub enum Error {
    /// Step was called outside of a batch context
    #[error("{0}: must be used inside a pipeline")]
    MustBeUsedInsidePipeline(String),

    /// Request body could not be decoded
    #[error("Decoding error: {0}")]
    Decode(String),

    /// Step output could not be encoded
    #[error("Encoding error: {0}")]
    Encode(String),

    /// General execution error raised by a wrapped step
    #[error("Execution error: {0}")]
    Execution(String),

    /// Remote stage call failed (transport or non-success status)
    #[error("Remote execution failed: {0}")]
    RemoteExecutionFailed(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
