//! User data request builder.

use serde::Deserialize;
use serde_json::Value;
use verus_primitives::details::UserDataDetails;
use verus_primitives::DetailEntry;

use crate::builders::BuiltRequest;
use crate::error::RequestError;
use crate::fields::{
    optional_string, parse_address, parse_positive_u64, parse_string_array, require_string,
};
use crate::redirects::parse_redirects;

/// Payload for a user data request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDataPayload {
    /// Identity that signs the request.
    #[serde(default)]
    pub signing_id: Option<Value>,
    /// Data type code: 1 full data, 2 partial data, 3 collection.
    #[serde(default)]
    pub data_type: Option<Value>,
    /// Request type code: 1 attestation, 2 claim, 3 credential.
    #[serde(default)]
    pub request_type: Option<Value>,
    /// Key the requested data is looked up under.
    #[serde(default)]
    pub search_data_key: Option<Value>,
    /// Value the search key must map to.
    #[serde(default)]
    pub search_data_value: Option<Value>,
    /// Identity whose signature must appear over the data.
    #[serde(default)]
    pub signer: Option<Value>,
    /// Specific data keys requested, partial-data only.
    #[serde(default)]
    pub requested_keys: Option<Value>,
    /// Request id the response must echo.
    #[serde(default)]
    pub request_id: Option<Value>,
    /// Optional response redirects.
    #[serde(default)]
    pub redirects: Option<Value>,
}

fn parse_code(
    value: Option<&Value>,
    field: &str,
    fallback: u64,
    message: &str,
) -> Result<u64, RequestError> {
    let code = parse_positive_u64(value, field, Some(fallback))
        .map_err(|_| RequestError::Validation(message.to_string()))?;
    if !(1..=3).contains(&code) {
        return Err(RequestError::Validation(message.to_string()));
    }
    Ok(code)
}

/// Validate the payload and build the detail sequence.
pub fn build(payload: &UserDataPayload) -> Result<BuiltRequest, RequestError> {
    let signing_id = require_string(payload.signing_id.as_ref(), "signingId")?;

    let data_type = parse_code(
        payload.data_type.as_ref(),
        "dataType",
        UserDataDetails::FULL_DATA,
        "dataType must be 1 (Full Data), 2 (Partial Data), or 3 (Collection).",
    )?;
    let request_type = parse_code(
        payload.request_type.as_ref(),
        "requestType",
        UserDataDetails::ATTESTATION,
        "requestType must be 1 (Attestation), 2 (Claim), or 3 (Credential).",
    )?;

    let search_data = match optional_string(payload.search_data_key.as_ref(), "searchDataKey")? {
        Some(key) => {
            let value = optional_string(payload.search_data_value.as_ref(), "searchDataValue")?
                .unwrap_or_default();
            vec![(key, value)]
        }
        None => Vec::new(),
    };

    let signer = parse_address(payload.signer.as_ref(), "signer")?;
    let requested_keys = parse_string_array(payload.requested_keys.as_ref(), "requestedKeys")?;
    let request_id = parse_address(payload.request_id.as_ref(), "requestId")?;

    if requested_keys.is_some() && data_type != UserDataDetails::PARTIAL_DATA {
        return Err(RequestError::Validation(
            "Requested Keys can only be used with Partial Data type.".to_string(),
        ));
    }

    let redirects = parse_redirects(payload.redirects.as_ref(), false)?;

    let details = UserDataDetails::new(
        data_type,
        request_type,
        search_data,
        signer,
        requested_keys.unwrap_or_default(),
        request_id,
    );
    Ok(BuiltRequest {
        details: vec![DetailEntry::UserData(details)],
        signed: true,
        signing_id: Some(signing_id),
        redirects,
        data_packet_flags: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(value: serde_json::Value) -> UserDataPayload {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_defaults_to_full_data_attestation() {
        let built = build(&payload(serde_json::json!({ "signingId": "service@" }))).unwrap();
        let DetailEntry::UserData(details) = &built.details[0] else {
            panic!("wrong entry kind");
        };
        assert_eq!(details.data_type, UserDataDetails::FULL_DATA);
        assert_eq!(details.request_type, UserDataDetails::ATTESTATION);
        assert_eq!(details.flags, 0);
    }

    #[test]
    fn test_requested_keys_need_partial_data() {
        let err = build(&payload(serde_json::json!({
            "signingId": "service@",
            "dataType": 1,
            "requestedKeys": ["iKeyAddress"],
        })))
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Requested Keys can only be used with Partial Data type."
        );

        let ok = build(&payload(serde_json::json!({
            "signingId": "service@",
            "dataType": 2,
            "requestedKeys": "[\"iKeyAddress\"]",
        })));
        assert!(ok.is_ok());
    }

    #[test]
    fn test_code_allow_lists() {
        let err = build(&payload(serde_json::json!({
            "signingId": "service@",
            "dataType": 4,
        })))
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "dataType must be 1 (Full Data), 2 (Partial Data), or 3 (Collection)."
        );

        let err = build(&payload(serde_json::json!({
            "signingId": "service@",
            "requestType": 0,
        })))
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "requestType must be 1 (Attestation), 2 (Claim), or 3 (Credential)."
        );
    }

    #[test]
    fn test_search_pair_and_presence_flags() {
        let built = build(&payload(serde_json::json!({
            "signingId": "service@",
            "searchDataKey": "iSearchKey",
            "searchDataValue": "passport",
            "signer": "issuer@",
            "requestId": "request@",
        })))
        .unwrap();
        let DetailEntry::UserData(details) = &built.details[0] else {
            panic!("wrong entry kind");
        };
        assert_eq!(details.search_data, vec![("iSearchKey".to_string(), "passport".to_string())]);
        assert_eq!(
            details.flags,
            UserDataDetails::FLAG_HAS_SIGNER | UserDataDetails::FLAG_HAS_REQUEST_ID
        );
    }
}
