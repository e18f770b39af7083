//! Error types for the roundfeed client.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Namespace key is empty after trimming
    #[error("Namespace must not be empty")]
    EmptyNamespace,

    /// Connection error reported by the transport
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The connection was closed before the operation could run
    #[error("Connection for namespace '{0}' is closed")]
    ConnectionClosed(String),
}
