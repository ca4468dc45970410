//! Envelope assembler: wraps a built detail sequence into one envelope.

use std::time::{SystemTime, UNIX_EPOCH};

use verus_primitives::{CompactIdentityReference, RequestEnvelope, SignatureBlock};

use crate::builders::BuiltRequest;
use crate::error::RequestError;
use crate::redirects::build_response_uris;

/// Assemble the envelope for a built request.
///
/// The creation timestamp is taken at assembly time and the network
/// flag is always set explicitly. When the request is signed, an
/// unsigned placeholder block carrying the system and signing identity
/// is attached so the remote signer has somewhere to put the bytes;
/// a signed request without a signing identity is a validation failure.
pub fn assemble(
    built: &BuiltRequest,
    system_id: &str,
    testnet: bool,
) -> Result<RequestEnvelope, RequestError> {
    let created_at = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let mut envelope = RequestEnvelope::new(created_at, built.details.clone());
    envelope.response_uris = build_response_uris(built.redirects.as_deref());
    envelope.set_testnet(testnet);

    if built.signed {
        let signing_id = built.signing_id.as_deref().ok_or_else(|| {
            RequestError::Validation("signingId is required when signed is true.".to_string())
        })?;
        let system = CompactIdentityReference::from_address(system_id)?;
        let identity = CompactIdentityReference::from_address(signing_id).map_err(|_| {
            RequestError::Validation(
                "signingId must be a valid i-address or fully qualified name.".to_string(),
            )
        })?;
        envelope.set_signature(SignatureBlock::placeholder(system, identity));
    }

    Ok(envelope)
}
