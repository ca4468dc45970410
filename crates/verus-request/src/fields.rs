//! Field validators for incoming request payloads.
//!
//! Payloads arrive as flat key/value maps whose values may be strings,
//! numbers, booleans, or nested JSON (sometimes as a string still to be
//! parsed). Each validator takes the raw value plus the field name and
//! either returns a typed value or fails with a
//! [`RequestError::Validation`] naming the field.

use serde_json::Value;
use verus_primitives::CompactIdentityReference;

use crate::error::RequestError;

fn validation(message: String) -> RequestError {
    RequestError::Validation(message)
}

fn is_absent(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        _ => false,
    }
}

/// Require a non-empty string, trimmed.
pub fn require_string(value: Option<&Value>, field: &str) -> Result<String, RequestError> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        _ => Err(validation(format!("{field} is required."))),
    }
}

/// An optional string; present but non-string input is rejected.
pub fn optional_string(value: Option<&Value>, field: &str) -> Result<Option<String>, RequestError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Ok(None)
            } else {
                Ok(Some(trimmed.to_string()))
            }
        }
        Some(_) => Err(validation(format!("{field} must be a string."))),
    }
}

fn positive_u64(value: &Value, field: &str) -> Result<u64, RequestError> {
    let err = || validation(format!("{field} must be a positive number."));
    match value {
        Value::Number(n) => n.as_u64().filter(|v| *v > 0).ok_or_else(err),
        Value::String(s) => s
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|v| *v > 0)
            .ok_or_else(err),
        _ => Err(err()),
    }
}

/// Require a strictly positive integer, or take the fallback when the
/// field is absent.
pub fn parse_positive_u64(
    value: Option<&Value>,
    field: &str,
    fallback: Option<u64>,
) -> Result<u64, RequestError> {
    if is_absent(value) {
        return fallback.ok_or_else(|| validation(format!("{field} is required.")));
    }
    positive_u64(value.unwrap_or(&Value::Null), field)
}

/// An optional strictly positive integer.
pub fn parse_optional_positive_u64(
    value: Option<&Value>,
    field: &str,
) -> Result<Option<u64>, RequestError> {
    if is_absent(value) {
        return Ok(None);
    }
    positive_u64(value.unwrap_or(&Value::Null), field).map(Some)
}

/// A non-negative integer defaulting to zero, for derivation indexes.
pub fn parse_non_negative_u64(value: Option<&Value>, field: &str) -> Result<u64, RequestError> {
    if is_absent(value) {
        return Ok(0);
    }
    let err = || validation(format!("{field} must be a non-negative integer."));
    match value.unwrap_or(&Value::Null) {
        Value::Number(n) => n.as_u64().ok_or_else(err),
        Value::String(s) => s.trim().parse::<u64>().map_err(|_| err()),
        _ => Err(err()),
    }
}

/// An optional identity reference: a fully qualified name ending in `@`
/// or a base58check i-address.
pub fn parse_address(
    value: Option<&Value>,
    field: &str,
) -> Result<Option<CompactIdentityReference>, RequestError> {
    match optional_string(value, field)? {
        None => Ok(None),
        Some(s) => CompactIdentityReference::from_address(&s)
            .map(Some)
            .map_err(|_| {
                validation(format!(
                    "{field} must be a valid i-address or fully qualified name."
                ))
            }),
    }
}

/// Like [`parse_address`] but the field is required.
pub fn require_address(
    value: Option<&Value>,
    field: &str,
) -> Result<CompactIdentityReference, RequestError> {
    let s = require_string(value, field)?;
    CompactIdentityReference::from_address(&s).map_err(|_| {
        validation(format!(
            "{field} must be a valid i-address or fully qualified name."
        ))
    })
}

/// An optional sapling address, validated by prefix only.
pub fn parse_z_address(value: Option<&Value>, field: &str) -> Result<Option<String>, RequestError> {
    match optional_string(value, field)? {
        None => Ok(None),
        Some(s) if s.starts_with("zs1") => Ok(Some(s)),
        Some(_) => Err(validation(format!(
            "{field} must be a valid z-address (starts with zs1)."
        ))),
    }
}

/// An optional 32-byte hash given as exactly 64 hex characters.
pub fn parse_hash32(value: Option<&Value>, field: &str) -> Result<Option<[u8; 32]>, RequestError> {
    match optional_string(value, field)? {
        None => Ok(None),
        Some(s) => {
            if s.len() != 64 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(validation(format!(
                    "{field} must be exactly 32 bytes (64 hex characters)."
                )));
            }
            let bytes = hex::decode(&s)
                .map_err(|e| validation(format!("{field} is not valid hex: {e}")))?;
            let mut hash = [0u8; 32];
            hash.copy_from_slice(&bytes);
            Ok(Some(hash))
        }
    }
}

/// A JSON-shaped field accepted either pre-parsed or as a string still
/// to be parsed. Resolved exactly once; a parse failure surfaces the
/// underlying message.
pub fn resolve_json(
    value: Option<&Value>,
    field: &str,
    required: bool,
) -> Result<Option<Value>, RequestError> {
    if is_absent(value) {
        if required {
            return Err(validation(format!("{field} is required.")));
        }
        return Ok(None);
    }
    match value.unwrap_or(&Value::Null) {
        Value::String(s) => serde_json::from_str(s)
            .map(Some)
            .map_err(|e| validation(format!("Invalid JSON for {field}: {e}"))),
        other => Ok(Some(other.clone())),
    }
}

/// A JSON array of strings, resolved through [`resolve_json`]; an empty
/// array collapses to `None`.
pub fn parse_string_array(
    value: Option<&Value>,
    field: &str,
) -> Result<Option<Vec<String>>, RequestError> {
    let Some(resolved) = resolve_json(value, field, false)? else {
        return Ok(None);
    };
    let items = resolved
        .as_array()
        .ok_or_else(|| validation(format!("{field} must be a JSON array of strings.")))?;
    let mut out = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let s = item.as_str().ok_or_else(|| {
            validation(format!("{field} item at index {index} must be a string."))
        })?;
        out.push(s.trim().to_string());
    }
    Ok(if out.is_empty() { None } else { Some(out) })
}
