//! Error types for daemon RPC operations.

/// Errors that can occur when talking to the Verus daemon.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Failed to serialize or deserialize data.
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Daemon returned a JSON-RPC error object.
    #[error("daemon error ({code}): {message}")]
    DaemonError {
        /// JSON-RPC error code.
        code: i64,
        /// Error message from the daemon.
        message: String,
    },

    /// Daemon returned a non-2xx response outside the JSON-RPC protocol.
    #[error("server error ({status_code}): {message}")]
    ServerError {
        /// HTTP status code.
        status_code: u16,
        /// Response body from the daemon.
        message: String,
    },

    /// Daemon returned neither a result nor an error.
    #[error("empty RPC response for method {0}")]
    EmptyResponse(String),
}
