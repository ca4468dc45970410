//! Detached signature blocks embedded in envelopes and data packets.

use base64::Engine;

use crate::address::CompactIdentityReference;
use crate::util::{ByteReader, ByteWriter};
use crate::PrimitivesError;

/// A detached signature over a request, attributed to an identity.
///
/// The system reference only appears in the serialized form when
/// [`SignatureBlock::FLAG_HAS_SYSTEM`] is set; populating `system_id`
/// alone is not sufficient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureBlock {
    /// Record version.
    pub version: u64,
    /// Flags bitmask; see [`SignatureBlock::FLAG_HAS_SYSTEM`].
    pub flags: u64,
    /// The system the signature anchors to.
    pub system_id: Option<CompactIdentityReference>,
    /// The identity that produced (or will produce) the signature.
    pub identity_id: CompactIdentityReference,
    /// Chain height the signature is anchored at; 0 when unanchored.
    pub block_height: u64,
    /// Raw signature bytes; empty until signing completes.
    pub signature: Vec<u8>,
}

impl SignatureBlock {
    /// Default record version.
    pub const DEFAULT_VERSION: u64 = 1;

    /// Set when the system reference is serialized alongside the identity.
    pub const FLAG_HAS_SYSTEM: u64 = 1;

    /// Create an unsigned placeholder block for the given identities.
    pub fn placeholder(
        system_id: CompactIdentityReference,
        identity_id: CompactIdentityReference,
    ) -> Self {
        SignatureBlock {
            version: Self::DEFAULT_VERSION,
            flags: 0,
            system_id: Some(system_id),
            identity_id,
            block_height: 0,
            signature: Vec::new(),
        }
    }

    /// Build a block from a daemon-produced base64 signature.
    ///
    /// The daemon output never carries the system reference, so callers
    /// that need it serialized must still call [`set_has_system`].
    ///
    /// [`set_has_system`]: SignatureBlock::set_has_system
    pub fn from_cli_signature(
        identity_id: CompactIdentityReference,
        signature_base64: &str,
    ) -> Result<Self, PrimitivesError> {
        let signature = base64::engine::general_purpose::STANDARD
            .decode(signature_base64)
            .map_err(|e| PrimitivesError::InvalidValue(format!("invalid base64 signature: {e}")))?;
        Ok(SignatureBlock {
            version: Self::DEFAULT_VERSION,
            flags: 0,
            system_id: None,
            identity_id,
            block_height: 0,
            signature,
        })
    }

    /// Mark the system reference for inclusion in the serialized form.
    pub fn set_has_system(&mut self) {
        self.flags |= Self::FLAG_HAS_SYSTEM;
    }

    /// Whether the system reference will appear in the serialized form.
    pub fn has_system(&self) -> bool {
        self.flags & Self::FLAG_HAS_SYSTEM != 0
    }

    /// Serialize the block to bytes.
    pub fn to_buffer(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        w.write_varint(self.version);
        w.write_varint(self.flags);
        if self.has_system() {
            if let Some(system) = &self.system_id {
                system.write(&mut w);
            }
        }
        self.identity_id.write(&mut w);
        w.write_varint(self.block_height);
        w.write_var_bytes(&self.signature);
        w.into_bytes()
    }

    /// Deserialize a block from bytes.
    pub fn from_buffer(data: &[u8]) -> Result<Self, PrimitivesError> {
        let mut r = ByteReader::new(data);
        let version = r.read_varint()?;
        let flags = r.read_varint()?;
        let system_id = if flags & Self::FLAG_HAS_SYSTEM != 0 {
            Some(CompactIdentityReference::read(&mut r)?)
        } else {
            None
        };
        let identity_id = CompactIdentityReference::read(&mut r)?;
        let block_height = r.read_varint()?;
        let signature = r.read_var_bytes()?;
        Ok(SignatureBlock {
            version,
            flags,
            system_id,
            identity_id,
            block_height,
            signature,
        })
    }

    /// JSON view of the block. The signature travels as base64.
    pub fn to_json(&self) -> serde_json::Value {
        let mut obj = serde_json::json!({
            "version": self.version,
            "flags": self.flags,
            "identityId": self.identity_id.to_json(),
            "blockHeight": self.block_height,
            "signature": base64::engine::general_purpose::STANDARD.encode(&self.signature),
        });
        if self.has_system() {
            if let Some(system) = &self.system_id {
                obj["systemId"] = system.to_json();
            }
        }
        obj
    }

    /// Parse a block from its JSON view.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, PrimitivesError> {
        let identity_id = CompactIdentityReference::from_json(
            value
                .get("identityId")
                .ok_or_else(|| PrimitivesError::InvalidJson("signature needs an identityId".to_string()))?,
        )?;
        let system_id = match value.get("systemId") {
            Some(v) if !v.is_null() => Some(CompactIdentityReference::from_json(v)?),
            _ => None,
        };
        let signature = match value.get("signature").and_then(serde_json::Value::as_str) {
            Some(s) if !s.is_empty() => base64::engine::general_purpose::STANDARD
                .decode(s)
                .map_err(|e| PrimitivesError::InvalidValue(format!("invalid base64 signature: {e}")))?,
            _ => Vec::new(),
        };
        let mut flags = value.get("flags").and_then(serde_json::Value::as_u64).unwrap_or(0);
        // The has-system flag is only honored when a system is present.
        if system_id.is_none() {
            flags &= !Self::FLAG_HAS_SYSTEM;
        }
        Ok(SignatureBlock {
            version: value
                .get("version")
                .and_then(serde_json::Value::as_u64)
                .unwrap_or(Self::DEFAULT_VERSION),
            flags,
            system_id,
            identity_id,
            block_height: value
                .get("blockHeight")
                .and_then(serde_json::Value::as_u64)
                .unwrap_or(0),
            signature,
        })
    }
}
