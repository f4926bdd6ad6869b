//! Backend error surface

use thiserror::Error;

/// Errors a backend operation can surface
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    /// The server answered and refused the operation
    #[error("request rejected: {0}")]
    Rejected(String),

    /// The request never completed (network, serialization, timeout)
    #[error("transport failure: {0}")]
    Transport(String),
}

/// Result alias for backend operations
pub type BackendResult<T> = Result<T, BackendError>;
