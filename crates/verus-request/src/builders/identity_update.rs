//! Identity update request builder.

use serde::Deserialize;
use serde_json::Value;
use verus_primitives::details::IdentityUpdateDetails;
use verus_primitives::DetailEntry;

use crate::builders::BuiltRequest;
use crate::error::RequestError;
use crate::fields::{parse_address, require_string, resolve_json};
use crate::redirects::parse_redirects;

/// Payload for an identity update request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityUpdatePayload {
    /// Identity that signs the request.
    #[serde(default)]
    pub signing_id: Option<Value>,
    /// Optional request id the response must echo.
    #[serde(default)]
    pub request_id: Option<Value>,
    /// The identity changes document, pre-parsed or as JSON text.
    #[serde(default)]
    pub identity_changes: Option<Value>,
    /// Optional response redirects.
    #[serde(default)]
    pub redirects: Option<Value>,
}

/// Validate the payload and build the detail sequence.
pub fn build(payload: &IdentityUpdatePayload) -> Result<BuiltRequest, RequestError> {
    let signing_id = require_string(payload.signing_id.as_ref(), "signingId")?;
    let request_id = parse_address(payload.request_id.as_ref(), "requestId")?;

    let changes = resolve_json(payload.identity_changes.as_ref(), "identityChanges", true)?
        .and_then(|v| v.as_object().cloned())
        .ok_or_else(|| {
            RequestError::Validation("identityChanges must be a JSON object.".to_string())
        })?;

    let redirects = parse_redirects(payload.redirects.as_ref(), false)?;

    let details = IdentityUpdateDetails::from_cli_json(changes, request_id);
    Ok(BuiltRequest {
        details: vec![DetailEntry::IdentityUpdate(details)],
        signed: true,
        signing_id: Some(signing_id),
        redirects,
        data_packet_flags: None,
    })
}
