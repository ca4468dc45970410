//! Application encryption request builder.

use serde::Deserialize;
use serde_json::Value;
use verus_primitives::details::AppEncryptionDetails;
use verus_primitives::DetailEntry;

use crate::builders::BuiltRequest;
use crate::error::RequestError;
use crate::fields::{parse_address, parse_non_negative_u64, parse_z_address, require_string};
use crate::redirects::parse_redirects;

/// Payload for an application encryption request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppEncryptionPayload {
    /// Identity that signs the request.
    #[serde(default)]
    pub signing_id: Option<Value>,
    /// Sapling address the data should be encrypted to.
    #[serde(default)]
    pub encrypt_to_z_address: Option<Value>,
    /// Key derivation index, defaults to 0.
    #[serde(default)]
    pub derivation_number: Option<Value>,
    /// Identity the derivation is scoped to.
    #[serde(default, rename = "derivationID")]
    pub derivation_id: Option<Value>,
    /// Request id the response must echo.
    #[serde(default)]
    pub request_id: Option<Value>,
    /// Ask the responder to return the ephemeral session key.
    #[serde(default)]
    pub return_esk: bool,
    /// Response redirects; required for this kind.
    #[serde(default)]
    pub redirects: Option<Value>,
}

/// Validate the payload and build the detail sequence.
pub fn build(payload: &AppEncryptionPayload) -> Result<BuiltRequest, RequestError> {
    let signing_id = require_string(payload.signing_id.as_ref(), "signingId")?;
    let encrypt_to_z_address =
        parse_z_address(payload.encrypt_to_z_address.as_ref(), "encryptToZAddress")?;
    let derivation_number =
        parse_non_negative_u64(payload.derivation_number.as_ref(), "derivationNumber")?;
    let derivation_id = parse_address(payload.derivation_id.as_ref(), "derivationID")?;
    let request_id = parse_address(payload.request_id.as_ref(), "requestId")?;
    let redirects = parse_redirects(payload.redirects.as_ref(), true)?;

    let details = AppEncryptionDetails::new(
        encrypt_to_z_address,
        derivation_number,
        derivation_id,
        request_id,
        payload.return_esk,
    );
    Ok(BuiltRequest {
        details: vec![DetailEntry::AppEncryption(details)],
        signed: true,
        signing_id: Some(signing_id),
        redirects,
        data_packet_flags: None,
    })
}
