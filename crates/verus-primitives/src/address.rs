//! Compact identity references.
//!
//! A wallet request refers to identities in one of two forms: an
//! i-address (Base58Check, version byte 102, 20-byte hash) or a fully
//! qualified name ending in `@`. Anything else is a hard parse failure.

use serde::{Deserialize, Serialize};

use crate::base58;
use crate::util::{ByteReader, ByteWriter};
use crate::PrimitivesError;

/// Version byte of a Verus identity address.
pub const I_ADDRESS_VERSION: u8 = 102;

/// Length of the identity hash inside an i-address.
pub const I_ADDRESS_HASH_LEN: usize = 20;

/// Default record version for compact identity references.
pub const DEFAULT_VERSION: u64 = 1;

/// Name of the root system an identity reference resolves against.
pub const ROOT_SYSTEM_NAME: &str = "VRSC";

/// The form an identity reference takes on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IdentityKind {
    /// A Base58Check i-address; the root system is implicit.
    IAddress,
    /// A fully qualified name ending in `@`.
    Fqn,
}

impl IdentityKind {
    fn ordinal(self) -> u8 {
        match self {
            IdentityKind::IAddress => 1,
            IdentityKind::Fqn => 2,
        }
    }

    fn from_ordinal(v: u8) -> Result<Self, PrimitivesError> {
        match v {
            1 => Ok(IdentityKind::IAddress),
            2 => Ok(IdentityKind::Fqn),
            other => Err(PrimitivesError::InvalidValue(format!(
                "unknown identity kind ordinal {other}"
            ))),
        }
    }
}

/// A validated reference to an identity.
///
/// Construction validates the input; an invalid string is a parse
/// failure, never a silent default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompactIdentityReference {
    /// Record version.
    pub version: u64,
    /// Whether this reference is an i-address or a fully qualified name.
    pub kind: IdentityKind,
    /// The address or name string exactly as validated.
    pub address: String,
    /// Name of the root system this reference resolves against.
    pub root_system_name: String,
}

impl CompactIdentityReference {
    /// Parse an identity reference from a string.
    ///
    /// Strings ending in `@` are fully qualified names. All other
    /// strings must Base58Check-decode to a version-102 payload with a
    /// 20-byte hash.
    pub fn from_address(value: &str) -> Result<Self, PrimitivesError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(PrimitivesError::InvalidAddress(
                "empty identity reference".to_string(),
            ));
        }

        if trimmed.ends_with('@') {
            return Ok(CompactIdentityReference {
                version: DEFAULT_VERSION,
                kind: IdentityKind::Fqn,
                address: trimmed.to_string(),
                root_system_name: ROOT_SYSTEM_NAME.to_string(),
            });
        }

        let payload = base58::check_decode(trimmed).map_err(|e| {
            PrimitivesError::InvalidAddress(format!("{trimmed} is not a valid i-address: {e}"))
        })?;
        if payload.len() != 1 + I_ADDRESS_HASH_LEN || payload[0] != I_ADDRESS_VERSION {
            return Err(PrimitivesError::InvalidAddress(format!(
                "{trimmed} is not a valid i-address"
            )));
        }

        Ok(CompactIdentityReference {
            version: DEFAULT_VERSION,
            kind: IdentityKind::IAddress,
            address: trimmed.to_string(),
            root_system_name: ROOT_SYSTEM_NAME.to_string(),
        })
    }

    /// Serialize the reference into the given writer.
    pub fn write(&self, w: &mut ByteWriter) {
        w.write_varint(self.version);
        w.write_u8(self.kind.ordinal());
        w.write_var_string(&self.address);
        w.write_var_string(&self.root_system_name);
    }

    /// Deserialize a reference from the given reader.
    pub fn read(r: &mut ByteReader<'_>) -> Result<Self, PrimitivesError> {
        let version = r.read_varint()?;
        let kind = IdentityKind::from_ordinal(r.read_u8()?)?;
        let address = r.read_var_string()?;
        let root_system_name = r.read_var_string()?;
        Ok(CompactIdentityReference {
            version,
            kind,
            address,
            root_system_name,
        })
    }

    /// JSON view of the reference.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "version": self.version,
            "type": self.kind.ordinal(),
            "address": self.address,
            "rootSystemName": self.root_system_name,
        })
    }

    /// Parse a reference from its JSON view. The address string is
    /// re-validated; `type` and `rootSystemName` are derived from it.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, PrimitivesError> {
        let address = value
            .get("address")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| {
                PrimitivesError::InvalidJson("identity reference needs an address".to_string())
            })?;
        Self::from_address(address)
    }
}

/// Build a syntactically valid i-address from a fill byte. Test helper.
#[cfg(test)]
pub(crate) fn test_i_address(fill: u8) -> String {
    let mut payload = vec![I_ADDRESS_VERSION];
    payload.extend_from_slice(&[fill; I_ADDRESS_HASH_LEN]);
    base58::check_encode(&payload)
}
