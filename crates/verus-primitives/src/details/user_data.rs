//! User data request details.
//!
//! Data type and request type are ordinal codes, not bit flags. The
//! presence bits for signer, request id, and requested keys are set by
//! the constructor from the populated fields.

use crate::address::CompactIdentityReference;
use crate::util::{ByteReader, ByteWriter};
use crate::PrimitivesError;

/// User data request details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDataDetails {
    /// Record version.
    pub version: u64,
    /// Flags bitmask.
    pub flags: u64,
    /// What shape of data is requested ([`UserDataDetails::FULL_DATA`],
    /// [`UserDataDetails::PARTIAL_DATA`], or
    /// [`UserDataDetails::COLLECTION`]).
    pub data_type: u64,
    /// What kind of response is requested
    /// ([`UserDataDetails::ATTESTATION`], [`UserDataDetails::CLAIM`], or
    /// [`UserDataDetails::CREDENTIAL`]).
    pub request_type: u64,
    /// Search key/value pairs narrowing which data is requested.
    pub search_data: Vec<(String, String)>,
    /// Identity whose signature must appear over the data.
    pub signer: Option<CompactIdentityReference>,
    /// The specific data keys requested, partial-data only.
    pub requested_keys: Vec<String>,
    /// The request id the response must echo.
    pub request_id: Option<CompactIdentityReference>,
}

impl UserDataDetails {
    /// Default record version.
    pub const DEFAULT_VERSION: u64 = 1;

    /// A request id is present.
    pub const FLAG_HAS_REQUEST_ID: u64 = 1;
    /// A required signer is present.
    pub const FLAG_HAS_SIGNER: u64 = 2;
    /// A requested-keys list is present.
    pub const FLAG_HAS_REQUESTED_KEYS: u64 = 4;

    /// Data type code: the full data object.
    pub const FULL_DATA: u64 = 1;
    /// Data type code: a selected subset of keys.
    pub const PARTIAL_DATA: u64 = 2;
    /// Data type code: a collection of objects.
    pub const COLLECTION: u64 = 3;

    /// Request type code: an attestation.
    pub const ATTESTATION: u64 = 1;
    /// Request type code: a claim.
    pub const CLAIM: u64 = 2;
    /// Request type code: a credential.
    pub const CREDENTIAL: u64 = 3;

    /// Create user data details. Presence bits for signer, requested
    /// keys, and request id are set from the populated fields.
    pub fn new(
        data_type: u64,
        request_type: u64,
        search_data: Vec<(String, String)>,
        signer: Option<CompactIdentityReference>,
        requested_keys: Vec<String>,
        request_id: Option<CompactIdentityReference>,
    ) -> Self {
        let mut flags = 0u64;
        if request_id.is_some() {
            flags |= Self::FLAG_HAS_REQUEST_ID;
        }
        if signer.is_some() {
            flags |= Self::FLAG_HAS_SIGNER;
        }
        if !requested_keys.is_empty() {
            flags |= Self::FLAG_HAS_REQUESTED_KEYS;
        }
        UserDataDetails {
            version: Self::DEFAULT_VERSION,
            flags,
            data_type,
            request_type,
            search_data,
            signer,
            requested_keys,
            request_id,
        }
    }

    /// Serialize to bytes.
    pub fn to_buffer(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        w.write_varint(self.version);
        w.write_varint(self.flags);
        w.write_varint(self.data_type);
        w.write_varint(self.request_type);
        w.write_varint(self.search_data.len() as u64);
        for (key, value) in &self.search_data {
            w.write_var_string(key);
            w.write_var_string(value);
        }
        if self.flags & Self::FLAG_HAS_SIGNER != 0 {
            if let Some(signer) = &self.signer {
                signer.write(&mut w);
            }
        }
        if self.flags & Self::FLAG_HAS_REQUESTED_KEYS != 0 {
            w.write_varint(self.requested_keys.len() as u64);
            for key in &self.requested_keys {
                w.write_var_string(key);
            }
        }
        if self.flags & Self::FLAG_HAS_REQUEST_ID != 0 {
            if let Some(id) = &self.request_id {
                id.write(&mut w);
            }
        }
        w.into_bytes()
    }

    /// Deserialize from bytes.
    pub fn from_buffer(data: &[u8]) -> Result<Self, PrimitivesError> {
        let mut r = ByteReader::new(data);
        let version = r.read_varint()?;
        let flags = r.read_varint()?;
        let data_type = r.read_varint()?;
        let request_type = r.read_varint()?;
        let count = r.read_count()?;
        let mut search_data = Vec::with_capacity(count);
        for _ in 0..count {
            let key = r.read_var_string()?;
            let value = r.read_var_string()?;
            search_data.push((key, value));
        }
        let signer = if flags & Self::FLAG_HAS_SIGNER != 0 {
            Some(CompactIdentityReference::read(&mut r)?)
        } else {
            None
        };
        let requested_keys = if flags & Self::FLAG_HAS_REQUESTED_KEYS != 0 {
            let count = r.read_count()?;
            let mut keys = Vec::with_capacity(count);
            for _ in 0..count {
                keys.push(r.read_var_string()?);
            }
            keys
        } else {
            Vec::new()
        };
        let request_id = if flags & Self::FLAG_HAS_REQUEST_ID != 0 {
            Some(CompactIdentityReference::read(&mut r)?)
        } else {
            None
        };
        Ok(UserDataDetails {
            version,
            flags,
            data_type,
            request_type,
            search_data,
            signer,
            requested_keys,
            request_id,
        })
    }

    /// JSON view of the record.
    pub fn to_json(&self) -> serde_json::Value {
        let mut obj = serde_json::json!({
            "version": self.version,
            "flags": self.flags,
            "dataType": self.data_type,
            "requestType": self.request_type,
            "searchDataKey": self
                .search_data
                .iter()
                .map(|(key, value)| serde_json::json!({ key.clone(): value.clone() }))
                .collect::<Vec<_>>(),
        });
        if let Some(signer) = &self.signer {
            obj["signer"] = signer.to_json();
        }
        if !self.requested_keys.is_empty() {
            obj["requestedKeys"] = self.requested_keys.clone().into();
        }
        if let Some(id) = &self.request_id {
            obj["requestId"] = id.to_json();
        }
        obj
    }
}
