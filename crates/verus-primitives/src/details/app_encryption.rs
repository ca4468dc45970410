//! Application encryption request details.

use crate::address::CompactIdentityReference;
use crate::util::{ByteReader, ByteWriter};
use crate::PrimitivesError;

/// Application encryption request details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppEncryptionDetails {
    /// Record version.
    pub version: u64,
    /// Flags bitmask.
    pub flags: u64,
    /// Sapling address the data should be encrypted to.
    pub encrypt_to_z_address: Option<String>,
    /// Key derivation index, 0 when unspecified.
    pub derivation_number: u64,
    /// Identity the derivation is scoped to.
    pub derivation_id: Option<CompactIdentityReference>,
    /// The request id the response must echo.
    pub request_id: Option<CompactIdentityReference>,
}

impl AppEncryptionDetails {
    /// Default record version.
    pub const DEFAULT_VERSION: u64 = 1;

    /// The responder should return the ephemeral session key.
    pub const FLAG_RETURN_ESK: u64 = 1;

    const FLAG_HAS_Z_ADDRESS: u64 = 2;
    const FLAG_HAS_DERIVATION_ID: u64 = 4;
    const FLAG_HAS_REQUEST_ID: u64 = 8;

    /// Create app encryption details. Presence flags are derived from
    /// the optional fields; `return_esk` is the caller's intent bit.
    pub fn new(
        encrypt_to_z_address: Option<String>,
        derivation_number: u64,
        derivation_id: Option<CompactIdentityReference>,
        request_id: Option<CompactIdentityReference>,
        return_esk: bool,
    ) -> Self {
        let mut flags = 0u64;
        if return_esk {
            flags |= Self::FLAG_RETURN_ESK;
        }
        if encrypt_to_z_address.is_some() {
            flags |= Self::FLAG_HAS_Z_ADDRESS;
        }
        if derivation_id.is_some() {
            flags |= Self::FLAG_HAS_DERIVATION_ID;
        }
        if request_id.is_some() {
            flags |= Self::FLAG_HAS_REQUEST_ID;
        }
        AppEncryptionDetails {
            version: Self::DEFAULT_VERSION,
            flags,
            encrypt_to_z_address,
            derivation_number,
            derivation_id,
            request_id,
        }
    }

    /// Whether the responder should return the ephemeral session key.
    pub fn returns_esk(&self) -> bool {
        self.flags & Self::FLAG_RETURN_ESK != 0
    }

    /// Serialize to bytes.
    pub fn to_buffer(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        w.write_varint(self.version);
        w.write_varint(self.flags);
        w.write_varint(self.derivation_number);
        if let Some(addr) = &self.encrypt_to_z_address {
            w.write_var_string(addr);
        }
        if let Some(id) = &self.derivation_id {
            id.write(&mut w);
        }
        if let Some(id) = &self.request_id {
            id.write(&mut w);
        }
        w.into_bytes()
    }

    /// Deserialize from bytes.
    pub fn from_buffer(data: &[u8]) -> Result<Self, PrimitivesError> {
        let mut r = ByteReader::new(data);
        let version = r.read_varint()?;
        let flags = r.read_varint()?;
        let derivation_number = r.read_varint()?;
        let encrypt_to_z_address = if flags & Self::FLAG_HAS_Z_ADDRESS != 0 {
            Some(r.read_var_string()?)
        } else {
            None
        };
        let derivation_id = if flags & Self::FLAG_HAS_DERIVATION_ID != 0 {
            Some(CompactIdentityReference::read(&mut r)?)
        } else {
            None
        };
        let request_id = if flags & Self::FLAG_HAS_REQUEST_ID != 0 {
            Some(CompactIdentityReference::read(&mut r)?)
        } else {
            None
        };
        Ok(AppEncryptionDetails {
            version,
            flags,
            encrypt_to_z_address,
            derivation_number,
            derivation_id,
            request_id,
        })
    }

    /// JSON view of the record.
    pub fn to_json(&self) -> serde_json::Value {
        let mut obj = serde_json::json!({
            "version": self.version,
            "flags": self.flags,
            "derivationNumber": self.derivation_number,
        });
        if let Some(addr) = &self.encrypt_to_z_address {
            obj["encryptToZAddress"] = addr.clone().into();
        }
        if let Some(id) = &self.derivation_id {
            obj["derivationId"] = id.to_json();
        }
        if let Some(id) = &self.request_id {
            obj["requestId"] = id.to_json();
        }
        obj
    }
}
