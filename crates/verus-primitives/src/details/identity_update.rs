//! Identity update request details.

use crate::address::CompactIdentityReference;
use crate::util::{ByteReader, ByteWriter};
use crate::PrimitivesError;

/// Requested changes to an identity, as an opaque key/value document.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentityUpdateDetails {
    /// Record version.
    pub version: u64,
    /// The identity changes document, daemon CLI shaped.
    pub changes: serde_json::Map<String, serde_json::Value>,
    /// Optional request id override.
    pub request_id: Option<CompactIdentityReference>,
}

impl IdentityUpdateDetails {
    /// Default record version.
    pub const DEFAULT_VERSION: u64 = 1;

    /// Build from a daemon CLI shaped changes document, optionally
    /// merging in a request id.
    pub fn from_cli_json(
        changes: serde_json::Map<String, serde_json::Value>,
        request_id: Option<CompactIdentityReference>,
    ) -> Self {
        IdentityUpdateDetails {
            version: Self::DEFAULT_VERSION,
            changes,
            request_id,
        }
    }

    /// Serialize to bytes. The changes document is canonical JSON
    /// (object keys sorted), so identical documents always produce
    /// identical bytes.
    pub fn to_buffer(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        w.write_varint(self.version);
        let doc = serde_json::Value::Object(self.changes.clone());
        // serde_json maps are BTree-ordered, so this is deterministic.
        w.write_var_bytes(doc.to_string().as_bytes());
        match &self.request_id {
            Some(id) => {
                w.write_u8(1);
                id.write(&mut w);
            }
            None => w.write_u8(0),
        }
        w.into_bytes()
    }

    /// Deserialize from bytes.
    pub fn from_buffer(data: &[u8]) -> Result<Self, PrimitivesError> {
        let mut r = ByteReader::new(data);
        let version = r.read_varint()?;
        let doc_bytes = r.read_var_bytes()?;
        let doc: serde_json::Value = serde_json::from_slice(&doc_bytes)?;
        let changes = doc
            .as_object()
            .cloned()
            .ok_or_else(|| PrimitivesError::InvalidJson("changes must be an object".to_string()))?;
        let request_id = match r.read_u8()? {
            0 => None,
            _ => Some(CompactIdentityReference::read(&mut r)?),
        };
        Ok(IdentityUpdateDetails {
            version,
            changes,
            request_id,
        })
    }

    /// JSON view of the record.
    pub fn to_json(&self) -> serde_json::Value {
        let mut obj = serde_json::json!({
            "version": self.version,
            "identityChanges": serde_json::Value::Object(self.changes.clone()),
        });
        if let Some(id) = &self.request_id {
            obj["requestId"] = id.to_json();
        }
        obj
    }
}
