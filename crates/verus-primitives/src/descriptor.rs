//! Data descriptors and URL references for data packet requests.

use crate::util::{ByteReader, ByteWriter};
use crate::PrimitivesError;

/// A reference to downloadable content, optionally pinned to a hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlRef {
    /// Record version.
    pub version: u64,
    /// Flags bitmask; see [`UrlRef::FLAG_HAS_HASH`].
    pub flags: u64,
    /// The download URL.
    pub url: String,
    /// SHA-256 hash of the content, present when `FLAG_HAS_HASH` is set.
    pub data_hash: Option<[u8; 32]>,
}

impl UrlRef {
    /// Latest record version.
    pub const LAST_VERSION: u64 = 1;

    /// Set when a content hash accompanies the URL.
    pub const FLAG_HAS_HASH: u64 = 1;

    /// Create a URL reference, setting the hash flag when a hash is given.
    pub fn new(url: String, data_hash: Option<[u8; 32]>) -> Self {
        let flags = if data_hash.is_some() {
            Self::FLAG_HAS_HASH
        } else {
            0
        };
        UrlRef {
            version: Self::LAST_VERSION,
            flags,
            url,
            data_hash,
        }
    }

    /// Serialize to bytes.
    pub fn to_buffer(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        w.write_varint(self.version);
        w.write_varint(self.flags);
        w.write_var_string(&self.url);
        if self.flags & Self::FLAG_HAS_HASH != 0 {
            if let Some(hash) = &self.data_hash {
                w.write_bytes(hash);
            }
        }
        w.into_bytes()
    }

    /// Deserialize from bytes.
    pub fn from_buffer(data: &[u8]) -> Result<Self, PrimitivesError> {
        let mut r = ByteReader::new(data);
        let version = r.read_varint()?;
        let flags = r.read_varint()?;
        let url = r.read_var_string()?;
        let data_hash = if flags & Self::FLAG_HAS_HASH != 0 {
            let mut hash = [0u8; 32];
            hash.copy_from_slice(r.read_bytes(32)?);
            Some(hash)
        } else {
            None
        };
        Ok(UrlRef {
            version,
            flags,
            url,
            data_hash,
        })
    }
}

/// A descriptor for one signable object inside a data packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataDescriptor {
    /// Record version, defaults to 1 when absent in JSON.
    pub version: u64,
    /// Flags bitmask, defaults to 0 when absent in JSON.
    pub flags: u64,
    /// Opaque object payload bytes.
    pub objectdata: Vec<u8>,
}

impl DataDescriptor {
    /// Default record version.
    pub const DEFAULT_VERSION: u64 = 1;

    /// Wrap a URL reference into a descriptor whose payload is the
    /// serialized reference.
    pub fn from_url_ref(url_ref: &UrlRef) -> Self {
        DataDescriptor {
            version: Self::DEFAULT_VERSION,
            flags: 0,
            objectdata: url_ref.to_buffer(),
        }
    }

    /// Parse a descriptor from a JSON object.
    ///
    /// `version` defaults to 1 and `flags` to 0; `objectdata` is a hex
    /// string.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, PrimitivesError> {
        let obj = value.as_object().ok_or_else(|| {
            PrimitivesError::InvalidJson("data descriptor must be a JSON object".to_string())
        })?;

        let version = match obj.get("version") {
            Some(v) => v.as_u64().ok_or_else(|| {
                PrimitivesError::InvalidJson("descriptor version must be an integer".to_string())
            })?,
            None => Self::DEFAULT_VERSION,
        };
        let flags = match obj.get("flags") {
            Some(v) => v.as_u64().ok_or_else(|| {
                PrimitivesError::InvalidJson("descriptor flags must be an integer".to_string())
            })?,
            None => 0,
        };
        let objectdata = match obj.get("objectdata") {
            Some(serde_json::Value::String(s)) => hex::decode(s)?,
            Some(_) => {
                return Err(PrimitivesError::InvalidJson(
                    "descriptor objectdata must be a hex string".to_string(),
                ))
            }
            None => Vec::new(),
        };

        Ok(DataDescriptor {
            version,
            flags,
            objectdata,
        })
    }

    /// JSON view of the descriptor.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "version": self.version,
            "flags": self.flags,
            "objectdata": hex::encode(&self.objectdata),
        })
    }

    /// Serialize to bytes.
    pub fn to_buffer(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        w.write_varint(self.version);
        w.write_varint(self.flags);
        w.write_var_bytes(&self.objectdata);
        w.into_bytes()
    }

    /// Deserialize from bytes.
    pub fn from_buffer(data: &[u8]) -> Result<Self, PrimitivesError> {
        let mut r = ByteReader::new(data);
        let version = r.read_varint()?;
        let flags = r.read_varint()?;
        let objectdata = r.read_var_bytes()?;
        Ok(DataDescriptor {
            version,
            flags,
            objectdata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_ref_roundtrip_with_hash() {
        let url_ref = UrlRef::new("https://example.com/data.hex".to_string(), Some([9u8; 32]));
        assert_eq!(url_ref.flags, UrlRef::FLAG_HAS_HASH);
        let back = UrlRef::from_buffer(&url_ref.to_buffer()).unwrap();
        assert_eq!(back, url_ref);
    }

    #[test]
    fn test_url_ref_roundtrip_without_hash() {
        let url_ref = UrlRef::new("https://example.com/data.hex".to_string(), None);
        assert_eq!(url_ref.flags, 0);
        let back = UrlRef::from_buffer(&url_ref.to_buffer()).unwrap();
        assert_eq!(back, url_ref);
    }

    #[test]
    fn test_descriptor_json_defaults() {
        let d = DataDescriptor::from_json(&serde_json::json!({
            "objectdata": "deadbeef"
        }))
        .unwrap();
        assert_eq!(d.version, 1);
        assert_eq!(d.flags, 0);
        assert_eq!(d.objectdata, vec![0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn test_descriptor_json_explicit_fields() {
        let d = DataDescriptor::from_json(&serde_json::json!({
            "version": 2,
            "flags": 5,
            "objectdata": "00"
        }))
        .unwrap();
        assert_eq!(d.version, 2);
        assert_eq!(d.flags, 5);
    }

    #[test]
    fn test_descriptor_json_rejects_non_object() {
        assert!(DataDescriptor::from_json(&serde_json::json!([1, 2])).is_err());
        assert!(DataDescriptor::from_json(&serde_json::json!({"objectdata": "zz"})).is_err());
    }

    #[test]
    fn test_descriptor_wraps_url_ref() {
        let url_ref = UrlRef::new("https://a.example".to_string(), None);
        let d = DataDescriptor::from_url_ref(&url_ref);
        let unwrapped = UrlRef::from_buffer(&d.objectdata).unwrap();
        assert_eq!(unwrapped, url_ref);
    }
}
