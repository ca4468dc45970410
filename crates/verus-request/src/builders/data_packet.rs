//! Data packet request builder.
//!
//! The most involved kind: the flags the caller asks for drive which
//! fields are parsed at all, the signable objects are either synthesized
//! from a download URL or taken from the caller, and a recipient
//! identity turns into an authentication preamble that must precede the
//! data packet entry in the envelope.

use serde::Deserialize;
use serde_json::Value;
use verus_primitives::details::{
    AuthenticationDetails, ConstraintKind, DataPacketDetails, RecipientConstraint,
};
use verus_primitives::{CompactIdentityReference, DataDescriptor, DetailEntry, SignatureBlock, UrlRef};

use crate::builders::BuiltRequest;
use crate::error::RequestError;
use crate::fields::{
    parse_address, parse_hash32, parse_string_array, require_string, resolve_json,
};
use crate::flags::{apply_intent_bits, DataPacketFlagOptions};
use crate::redirects::parse_redirects;

/// Payload for a data packet request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataPacketPayload {
    /// Identity that signs the request.
    #[serde(default)]
    pub signing_id: Option<Value>,
    /// A request id will be supplied.
    #[serde(default)]
    pub flag_has_request_id: bool,
    /// Statements will be supplied.
    #[serde(default)]
    pub flag_has_statements: bool,
    /// A pre-existing signature object will be supplied.
    #[serde(default)]
    pub flag_has_signature: bool,
    /// The receiving user is asked to sign the packet.
    #[serde(default)]
    pub flag_for_users_signature: bool,
    /// The packet is to be transmitted to a user.
    #[serde(default)]
    pub flag_for_transmittal_to_user: bool,
    /// The signable object is a download URL descriptor.
    #[serde(default)]
    pub flag_has_url_for_download: bool,
    /// Caller-supplied signable objects, ignored in the download-URL case.
    #[serde(default)]
    pub signable_objects: Option<Value>,
    /// Statements the signer attests to.
    #[serde(default)]
    pub statements: Option<Value>,
    /// Request id the response must echo.
    #[serde(default)]
    pub request_id: Option<Value>,
    /// URL the packet data is downloaded from.
    #[serde(default)]
    pub download_url: Option<Value>,
    /// SHA-256 of the downloadable content, 64 hex characters.
    #[serde(default)]
    pub data_hash: Option<Value>,
    /// Pre-existing signature object over the signable objects.
    #[serde(default)]
    pub signature: Option<Value>,
    /// Identity the packet is restricted to.
    #[serde(default)]
    pub recipient_identity: Option<Value>,
    /// Response redirects; required for the deeplink flow.
    #[serde(default)]
    pub redirects: Option<Value>,
}

impl DataPacketPayload {
    fn flag_options(&self) -> DataPacketFlagOptions {
        DataPacketFlagOptions {
            has_request_id: self.flag_has_request_id,
            has_statements: self.flag_has_statements,
            has_signature: self.flag_has_signature,
            for_users_signature: self.flag_for_users_signature,
            for_transmittal_to_user: self.flag_for_transmittal_to_user,
            has_url_for_download: self.flag_has_url_for_download,
        }
    }
}

fn parse_signable_objects(value: Option<&Value>) -> Result<Vec<DataDescriptor>, RequestError> {
    let Some(resolved) = resolve_json(value, "signableObjects", false)? else {
        return Ok(Vec::new());
    };
    let items = resolved.as_array().ok_or_else(|| {
        RequestError::Validation("signableObjects must be a JSON array.".to_string())
    })?;
    let mut objects = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let descriptor = DataDescriptor::from_json(item).map_err(|e| {
            RequestError::Validation(format!("Invalid DataDescriptor at index {index}: {e}"))
        })?;
        objects.push(descriptor);
    }
    Ok(objects)
}

fn parse_signature_object(value: Option<&Value>) -> Result<Option<SignatureBlock>, RequestError> {
    let Some(resolved) = resolve_json(value, "signature", false)? else {
        return Ok(None);
    };
    if resolved.as_object().map_or(true, serde_json::Map::is_empty) {
        if resolved.is_object() {
            return Ok(None);
        }
        return Err(RequestError::Validation(
            "signature must be a JSON object.".to_string(),
        ));
    }
    SignatureBlock::from_json(&resolved)
        .map(Some)
        .map_err(|e| RequestError::Validation(format!("Invalid signature object: {e}")))
}

/// Build the authentication preamble restricting the packet to one
/// recipient. It must precede the data packet entry so a wallet
/// evaluates the constraint before showing the payload.
fn recipient_preamble(identity: CompactIdentityReference) -> DetailEntry {
    DetailEntry::Authentication(AuthenticationDetails::new(
        None,
        None,
        vec![RecipientConstraint {
            kind: ConstraintKind::RequiredId,
            identity,
        }],
    ))
}

/// Validate the payload and build the detail sequence.
///
/// The returned [`BuiltRequest::data_packet_flags`] carries the stored
/// flags so the pipeline can patch the envelope's lossy JSON view.
pub fn build(payload: &DataPacketPayload) -> Result<BuiltRequest, RequestError> {
    let signing_id = require_string(payload.signing_id.as_ref(), "signingId")?;
    let requested_flags = payload.flag_options().to_mask();

    let statements = if payload.flag_has_statements {
        parse_string_array(payload.statements.as_ref(), "statements")?
    } else {
        None
    };
    let request_id = if payload.flag_has_request_id {
        parse_address(payload.request_id.as_ref(), "requestId")?
    } else {
        None
    };

    // The download-URL case replaces any caller-supplied objects with
    // exactly one synthesized descriptor.
    let signable_objects = if payload.flag_has_url_for_download {
        let url = require_string(payload.download_url.as_ref(), "downloadUrl").map_err(|_| {
            RequestError::Validation(
                "Download URL is required when the download URL flag is set.".to_string(),
            )
        })?;
        let data_hash = parse_hash32(payload.data_hash.as_ref(), "dataHash")?;
        vec![DataDescriptor::from_url_ref(&UrlRef::new(url, data_hash))]
    } else {
        parse_signable_objects(payload.signable_objects.as_ref())?
    };

    let signature = if payload.flag_has_signature {
        parse_signature_object(payload.signature.as_ref())?
    } else {
        None
    };

    let recipient_identity = if payload.flag_for_transmittal_to_user {
        parse_address(payload.recipient_identity.as_ref(), "recipientIdentity")?
    } else {
        None
    };

    // A set flag whose value is absent is an inconsistency, not a default.
    if payload.flag_has_statements && statements.is_none() {
        return Err(RequestError::Validation(
            "Statements are required when the statements flag is set.".to_string(),
        ));
    }
    if payload.flag_has_request_id && request_id.is_none() {
        return Err(RequestError::Validation(
            "Request ID is required when the request ID flag is set.".to_string(),
        ));
    }
    if payload.flag_has_signature && signature.is_none() {
        return Err(RequestError::Validation(
            "Signature is required when the signature flag is set.".to_string(),
        ));
    }

    let redirects = parse_redirects(payload.redirects.as_ref(), false)?;

    let mut packet = DataPacketDetails::new(
        signable_objects,
        statements.unwrap_or_default(),
        request_id,
        signature,
    );
    apply_intent_bits(&mut packet, requested_flags);
    let stored_flags = packet.flags;

    let mut details = Vec::with_capacity(2);
    if let Some(identity) = recipient_identity {
        details.push(recipient_preamble(identity));
    }
    details.push(DetailEntry::DataPacket(packet));

    Ok(BuiltRequest {
        details,
        signed: true,
        signing_id: Some(signing_id),
        redirects,
        data_packet_flags: Some(stored_flags),
    })
}
