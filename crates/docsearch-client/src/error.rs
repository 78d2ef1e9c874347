//! Client error types.

use thiserror::Error;

/// Client errors.
///
/// Cloneable so a single initialization failure can be observed by every
/// caller waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The worker raised an error event. Every in-flight request fails with it.
    #[error("Search worker error: {0}")]
    Worker(String),

    /// The worker is gone.
    #[error("Search worker disconnected")]
    Disconnected,

    /// The worker answered a request with an error payload.
    #[error("Search worker rejected request: {0}")]
    Rejected(String),

    /// A response payload did not have the expected shape.
    #[error("Unexpected response payload: {0}")]
    Payload(String),
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
