//! Error types for the notification client.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The gateway refused the credential. Retrying with the same token is pointless.
    #[error("Authentication rejected: {0}")]
    AuthRejected(String),

    /// The URL or token cannot be turned into a handshake request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// An established connection dropped
    #[error("Connection lost: {0}")]
    ConnectionLost(String),
}
