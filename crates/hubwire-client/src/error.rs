//! Error types for hub connections.

use thiserror::Error;

/// Result type alias for connection operations.
pub type HubResult<T> = Result<T, HubError>;

/// Error type for connection operations.
#[derive(Debug, Error)]
pub enum HubError {
    /// The underlying transport failed to deliver.
    #[error("transport error: {0}")]
    Transport(String),

    /// A wire argument could not be serialized or deserialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The operation was cancelled before completion.
    #[error("operation cancelled")]
    Cancelled,

    /// The connection is no longer usable.
    #[error("connection closed")]
    Closed,
}
