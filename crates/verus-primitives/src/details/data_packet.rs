//! Data packet request details.
//!
//! The flags bitmask mixes two families of bits: presence bits that
//! [`calc_flags`] can derive from the populated fields, and requester
//! intent bits (for-user's-signature, for-transmittal-to-user,
//! has-URL-for-download) that nothing else in the record implies.
//! `calc_flags` is presence-only by design; callers that set intent
//! bits must OR them back into `flags` after construction.
//!
//! [`calc_flags`]: DataPacketDetails::calc_flags

use crate::address::CompactIdentityReference;
use crate::descriptor::DataDescriptor;
use crate::signature::SignatureBlock;
use crate::util::{ByteReader, ByteWriter};
use crate::PrimitivesError;

/// Data packet request details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPacketDetails {
    /// Record version.
    pub version: u64,
    /// Flags bitmask as stored; serialization uses this value verbatim.
    pub flags: u64,
    /// The signable objects carried by the packet, in order.
    pub signable_objects: Vec<DataDescriptor>,
    /// Statements the signer attests to.
    pub statements: Vec<String>,
    /// The request id the response must echo.
    pub request_id: Option<CompactIdentityReference>,
    /// A pre-existing signature over the signable objects.
    pub signature: Option<SignatureBlock>,
}

impl DataPacketDetails {
    /// Default record version.
    pub const DEFAULT_VERSION: u64 = 1;

    /// A request id is present.
    pub const FLAG_HAS_REQUEST_ID: u64 = 1;
    /// Statements are present.
    pub const FLAG_HAS_STATEMENTS: u64 = 2;
    /// A signature object is present.
    pub const FLAG_HAS_SIGNATURE: u64 = 4;
    /// The packet is to be signed by the receiving user. Intent bit.
    pub const FLAG_FOR_USERS_SIGNATURE: u64 = 8;
    /// The packet is to be transmitted to a user. Intent bit.
    pub const FLAG_FOR_TRANSMITTAL_TO_USER: u64 = 16;
    /// The signable object is a download URL descriptor. Intent bit.
    pub const FLAG_HAS_URL_FOR_DOWNLOAD: u64 = 32;

    /// All intent bits: never derivable from field presence.
    pub const INTENT_FLAGS: u64 = Self::FLAG_FOR_USERS_SIGNATURE
        | Self::FLAG_FOR_TRANSMITTAL_TO_USER
        | Self::FLAG_HAS_URL_FOR_DOWNLOAD;

    /// Create data packet details. The stored flags start at the
    /// presence-derived value; intent bits must be ORed in afterwards.
    pub fn new(
        signable_objects: Vec<DataDescriptor>,
        statements: Vec<String>,
        request_id: Option<CompactIdentityReference>,
        signature: Option<SignatureBlock>,
    ) -> Self {
        let mut details = DataPacketDetails {
            version: Self::DEFAULT_VERSION,
            flags: 0,
            signable_objects,
            statements,
            request_id,
            signature,
        };
        details.flags = details.calc_flags();
        details
    }

    /// Derive the presence bits from the populated fields.
    ///
    /// Intent bits are not represented in any field, so they never
    /// appear in the result.
    pub fn calc_flags(&self) -> u64 {
        let mut flags = 0u64;
        if self.request_id.is_some() {
            flags |= Self::FLAG_HAS_REQUEST_ID;
        }
        if !self.statements.is_empty() {
            flags |= Self::FLAG_HAS_STATEMENTS;
        }
        if self.signature.is_some() {
            flags |= Self::FLAG_HAS_SIGNATURE;
        }
        flags
    }

    /// Serialize to bytes using the stored flags verbatim.
    pub fn to_buffer(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        w.write_varint(self.version);
        w.write_varint(self.flags);
        w.write_varint(self.signable_objects.len() as u64);
        for descriptor in &self.signable_objects {
            w.write_var_bytes(&descriptor.to_buffer());
        }
        if self.flags & Self::FLAG_HAS_STATEMENTS != 0 {
            w.write_varint(self.statements.len() as u64);
            for statement in &self.statements {
                w.write_var_string(statement);
            }
        }
        if self.flags & Self::FLAG_HAS_REQUEST_ID != 0 {
            if let Some(id) = &self.request_id {
                id.write(&mut w);
            }
        }
        if self.flags & Self::FLAG_HAS_SIGNATURE != 0 {
            if let Some(sig) = &self.signature {
                w.write_var_bytes(&sig.to_buffer());
            }
        }
        w.into_bytes()
    }

    /// Deserialize from bytes. The stored flags are read verbatim, so a
    /// serialize / deserialize / re-serialize cycle is flag-stable.
    pub fn from_buffer(data: &[u8]) -> Result<Self, PrimitivesError> {
        let mut r = ByteReader::new(data);
        let version = r.read_varint()?;
        let flags = r.read_varint()?;
        let count = r.read_count()?;
        let mut signable_objects = Vec::with_capacity(count);
        for _ in 0..count {
            let bytes = r.read_var_bytes()?;
            signable_objects.push(DataDescriptor::from_buffer(&bytes)?);
        }
        let statements = if flags & Self::FLAG_HAS_STATEMENTS != 0 {
            let count = r.read_count()?;
            let mut statements = Vec::with_capacity(count);
            for _ in 0..count {
                statements.push(r.read_var_string()?);
            }
            statements
        } else {
            Vec::new()
        };
        let request_id = if flags & Self::FLAG_HAS_REQUEST_ID != 0 {
            Some(CompactIdentityReference::read(&mut r)?)
        } else {
            None
        };
        let signature = if flags & Self::FLAG_HAS_SIGNATURE != 0 {
            let bytes = r.read_var_bytes()?;
            Some(SignatureBlock::from_buffer(&bytes)?)
        } else {
            None
        };
        Ok(DataPacketDetails {
            version,
            flags,
            signable_objects,
            statements,
            request_id,
            signature,
        })
    }

    /// JSON view of the record.
    ///
    /// The flags field is recomputed from field presence, matching the
    /// encoder's historical display behavior; callers that care about
    /// intent bits must patch the view with the stored flags.
    pub fn to_json(&self) -> serde_json::Value {
        let mut obj = serde_json::json!({
            "version": self.version,
            "flags": self.calc_flags(),
            "signableObjects": self
                .signable_objects
                .iter()
                .map(DataDescriptor::to_json)
                .collect::<Vec<_>>(),
        });
        if !self.statements.is_empty() {
            obj["statements"] = self.statements.clone().into();
        }
        if let Some(id) = &self.request_id {
            obj["requestId"] = id.to_json();
        }
        if let Some(sig) = &self.signature {
            obj["signature"] = sig.to_json();
        }
        obj
    }
}
