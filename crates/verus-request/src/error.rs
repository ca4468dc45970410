//! Error types for the request pipeline.

use verus_primitives::PrimitivesError;
use verus_rpc::RpcError;

/// Errors produced while building, signing, or verifying a request.
///
/// [`RequestError::Validation`] is a caller-input problem, detected
/// before any network call; everything else is operational. HTTP-facing
/// callers map this split to 400 versus 500.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// Caller supplied a missing, malformed, or disallowed value.
    #[error("{0}")]
    Validation(String),

    /// Wire encoding or decoding failed.
    #[error("encoding error: {0}")]
    Encoding(#[from] PrimitivesError),

    /// A daemon RPC call failed.
    #[error("rpc error: {0}")]
    Rpc(#[from] RpcError),

    /// Failed to serialize or deserialize data.
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// The signing oracle failed or the signer did not qualify.
    #[error("signing failed: {0}")]
    Signing(String),

    /// The finished deeplink's signature did not re-verify.
    #[error("verification failed: {0}")]
    Verification(String),

    /// QR code rendering failed.
    #[error("qr encoding failed: {0}")]
    Qr(String),
}

impl RequestError {
    /// Whether this error is a caller-input problem.
    pub fn is_validation(&self) -> bool {
        matches!(self, RequestError::Validation(_))
    }
}
