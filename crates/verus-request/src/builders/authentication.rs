//! Authentication request builder.

use serde::Deserialize;
use serde_json::Value;
use verus_primitives::details::{AuthenticationDetails, ConstraintKind, RecipientConstraint};
use verus_primitives::DetailEntry;

use crate::builders::BuiltRequest;
use crate::error::RequestError;
use crate::fields::{
    parse_optional_positive_u64, require_address, require_string,
};
use crate::redirects::parse_redirects;

/// Payload for an authentication request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationPayload {
    /// Identity that signs the request.
    #[serde(default)]
    pub signing_id: Option<Value>,
    /// Request id the response must echo. Required for this kind.
    #[serde(default)]
    pub request_id: Option<Value>,
    /// Unix time after which the request is void.
    #[serde(default)]
    pub expiry_time: Option<Value>,
    /// Recipient constraint kind, 1 (ID), 2 (System), or 3 (Parent).
    #[serde(default)]
    pub recipient_constraint_type: Option<Value>,
    /// Identity the constraint is evaluated against.
    #[serde(default)]
    pub recipient_constraint_identity: Option<Value>,
    /// Optional response redirects.
    #[serde(default)]
    pub redirects: Option<Value>,
}

fn parse_recipient_constraint(
    kind_value: Option<&Value>,
    identity_value: Option<&Value>,
) -> Result<Option<RecipientConstraint>, RequestError> {
    let kind_num = match kind_value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(None),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        Some(Value::Number(n)) => n.as_u64(),
        Some(_) => None,
    };
    let kind = kind_num.and_then(|n| ConstraintKind::from_ordinal(n).ok()).ok_or_else(|| {
        RequestError::Validation(
            "recipientConstraintType must be 1 (ID), 2 (System), or 3 (Parent).".to_string(),
        )
    })?;
    let identity = require_address(identity_value, "recipientConstraintIdentity")?;
    Ok(Some(RecipientConstraint { kind, identity }))
}

/// Validate the payload and build the detail sequence.
pub fn build(payload: &AuthenticationPayload) -> Result<BuiltRequest, RequestError> {
    let signing_id = require_string(payload.signing_id.as_ref(), "signingId")?;
    let request_id = require_address(payload.request_id.as_ref(), "requestId")?;
    let expiry_time = parse_optional_positive_u64(payload.expiry_time.as_ref(), "expiryTime")?;
    let constraint = parse_recipient_constraint(
        payload.recipient_constraint_type.as_ref(),
        payload.recipient_constraint_identity.as_ref(),
    )?;
    let redirects = parse_redirects(payload.redirects.as_ref(), false)?;

    let details = AuthenticationDetails::new(
        Some(request_id),
        expiry_time,
        constraint.into_iter().collect(),
    );
    Ok(BuiltRequest {
        details: vec![DetailEntry::Authentication(details)],
        signed: true,
        signing_id: Some(signing_id),
        redirects,
        data_packet_flags: None,
    })
}
