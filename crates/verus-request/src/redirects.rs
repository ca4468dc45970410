//! Redirect assembler: projects caller `{type, uri}` pairs into typed
//! response URIs.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use verus_primitives::{ResponseUri, ResponseUriKind};

use crate::error::RequestError;
use crate::fields::resolve_json;

/// One caller-supplied redirect entry, not yet validated.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RedirectInput {
    /// Delivery type: `"1"` for redirect, `"2"` for POST. Numbers are
    /// coerced to strings before matching.
    #[serde(rename = "type", default)]
    pub kind: Option<Value>,
    /// Destination URI.
    #[serde(default)]
    pub uri: Option<String>,
}

/// Project redirects into response URIs.
///
/// Entries with an empty URI or an unrecognized type are dropped, not
/// errored: partial redirect lists are an intentional use case. An
/// empty result collapses to `None` so the envelope carries no
/// response-URI section at all.
pub fn build_response_uris(redirects: Option<&[RedirectInput]>) -> Option<Vec<ResponseUri>> {
    let redirects = redirects?;
    let mut uris = Vec::with_capacity(redirects.len());
    for redirect in redirects {
        let uri = redirect.uri.as_deref().map(str::trim).unwrap_or("");
        if uri.is_empty() {
            debug!("dropping redirect entry with empty uri");
            continue;
        }
        let kind = match redirect.kind.as_ref() {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        };
        match kind.as_str() {
            "1" => uris.push(ResponseUri::from_uri_string(uri, ResponseUriKind::Redirect)),
            "2" => uris.push(ResponseUri::from_uri_string(uri, ResponseUriKind::Post)),
            other => debug!(kind = other, uri, "dropping redirect entry with unrecognized type"),
        }
    }
    if uris.is_empty() {
        None
    } else {
        Some(uris)
    }
}

/// Parse the raw `redirects` payload field into redirect entries.
///
/// Accepts a pre-parsed JSON array or a string still to be parsed; when
/// `required` the field must be present and non-empty.
pub fn parse_redirects(
    value: Option<&Value>,
    required: bool,
) -> Result<Option<Vec<RedirectInput>>, RequestError> {
    let Some(resolved) = resolve_json(value, "redirects", required)? else {
        return Ok(None);
    };
    let entries: Vec<RedirectInput> = serde_json::from_value(resolved)
        .map_err(|_| RequestError::Validation("redirects must be a JSON array.".to_string()))?;
    if required && entries.is_empty() {
        return Err(RequestError::Validation(
            "redirects must be a non-empty JSON array.".to_string(),
        ));
    }
    Ok(if entries.is_empty() { None } else { Some(entries) })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(kind: serde_json::Value, uri: &str) -> RedirectInput {
        RedirectInput {
            kind: Some(kind),
            uri: Some(uri.to_string()),
        }
    }

    #[test]
    fn test_filters_malformed_entries() {
        let redirects = vec![
            entry(serde_json::json!("1"), "https://a"),
            entry(serde_json::json!("9"), "https://b"),
            entry(serde_json::json!("2"), ""),
        ];
        let uris = build_response_uris(Some(&redirects)).unwrap();
        assert_eq!(uris.len(), 1);
        assert_eq!(uris[0].kind, ResponseUriKind::Redirect);
        assert_eq!(uris[0].uri, "https://a");
    }

    #[test]
    fn test_numeric_type_is_coerced() {
        let redirects = vec![entry(serde_json::json!(2), "https://post.example")];
        let uris = build_response_uris(Some(&redirects)).unwrap();
        assert_eq!(uris[0].kind, ResponseUriKind::Post);
    }

    #[test]
    fn test_empty_result_is_absence() {
        let redirects = vec![entry(serde_json::json!("7"), "https://a")];
        assert!(build_response_uris(Some(&redirects)).is_none());
        assert!(build_response_uris(None).is_none());
        assert!(build_response_uris(Some(&[])).is_none());
    }

    #[test]
    fn test_parse_redirects_from_string() {
        let raw = serde_json::json!("[{\"type\":\"1\",\"uri\":\"https://a\"}]");
        let parsed = parse_redirects(Some(&raw), true).unwrap().unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].uri.as_deref(), Some("https://a"));
    }

    #[test]
    fn test_parse_redirects_required_but_missing() {
        let err = parse_redirects(None, true).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_parse_redirects_rejects_non_array() {
        let raw = serde_json::json!({ "type": "1" });
        assert!(parse_redirects(Some(&raw), false).is_err());
    }
}
