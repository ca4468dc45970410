//! Deeplink round-trip verification.
//!
//! A deeplink whose embedded signature does not independently
//! re-verify must never reach the caller, so the finished URI is
//! decoded back into an envelope and its signature checked against the
//! declared identity before release.

use std::future::Future;

use base64::Engine;
use tracing::error;
use verus_primitives::RequestEnvelope;
use verus_rpc::VerusRpcClient;

use crate::error::RequestError;

/// Confirms a detached signature validates against an identity.
pub trait SignatureVerifier {
    /// Verify a base64 signature over a hex-encoded hash.
    fn verify_signature(
        &self,
        identity: &str,
        signature_b64: &str,
        hash_hex: &str,
    ) -> impl Future<Output = Result<bool, RequestError>> + Send;
}

impl SignatureVerifier for VerusRpcClient {
    async fn verify_signature(
        &self,
        identity: &str,
        signature_b64: &str,
        hash_hex: &str,
    ) -> Result<bool, RequestError> {
        Ok(self.verify_hash(identity, signature_b64, hash_hex).await?)
    }
}

/// Decode the deeplink back into an envelope and re-verify its
/// signature. A failure here is fatal for the whole operation.
pub async fn release_verified<V: SignatureVerifier>(
    verifier: &V,
    deeplink: &str,
) -> Result<RequestEnvelope, RequestError> {
    let decoded = RequestEnvelope::from_wallet_deeplink_uri(deeplink)?;

    let block = decoded.signature.as_ref().ok_or_else(|| {
        RequestError::Verification("decoded envelope carries no signature".to_string())
    })?;
    if block.signature.is_empty() {
        return Err(RequestError::Verification(
            "decoded envelope carries an empty signature".to_string(),
        ));
    }

    let identity = block.identity_id.address.clone();
    let signature_b64 = base64::engine::general_purpose::STANDARD.encode(&block.signature);
    let hash_hex = hex::encode(decoded.raw_data_sha256(false));

    let ok = verifier
        .verify_signature(&identity, &signature_b64, &hash_hex)
        .await?;
    if !ok {
        error!(identity, "deeplink signature failed re-verification");
        return Err(RequestError::Verification(format!(
            "deeplink signature does not verify against {identity}"
        )));
    }
    Ok(decoded)
}
