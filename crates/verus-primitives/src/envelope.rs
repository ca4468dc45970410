//! The request envelope and the wallet deeplink URI codec.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use crate::base58::sha256;
use crate::details::{
    AppEncryptionDetails, AuthenticationDetails, DataPacketDetails, IdentityUpdateDetails,
    InvoiceDetails, UserDataDetails,
};
use crate::response_uri::ResponseUri;
use crate::signature::SignatureBlock;
use crate::util::{ByteReader, ByteWriter};
use crate::PrimitivesError;

/// Scheme and path prefix of a wallet deeplink URI.
pub const DEEPLINK_PREFIX: &str = "verus://x-callback-url/generic-request/?request=";

/// One entry in an envelope's ordered detail sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailEntry {
    /// An identity update request.
    IdentityUpdate(IdentityUpdateDetails),
    /// An authentication request or recipient constraint preamble.
    Authentication(AuthenticationDetails),
    /// A payment invoice.
    Invoice(InvoiceDetails),
    /// A data packet to be signed or delivered.
    DataPacket(DataPacketDetails),
    /// An application encryption request.
    AppEncryption(AppEncryptionDetails),
    /// A user data request.
    UserData(UserDataDetails),
}

impl DetailEntry {
    /// Wire ordinal identifying the entry kind.
    pub fn ordinal(&self) -> u64 {
        match self {
            DetailEntry::IdentityUpdate(_) => 1,
            DetailEntry::Authentication(_) => 2,
            DetailEntry::Invoice(_) => 3,
            DetailEntry::DataPacket(_) => 4,
            DetailEntry::AppEncryption(_) => 5,
            DetailEntry::UserData(_) => 6,
        }
    }

    /// Serialized payload of the entry, without the ordinal tag.
    pub fn payload(&self) -> Vec<u8> {
        match self {
            DetailEntry::IdentityUpdate(d) => d.to_buffer(),
            DetailEntry::Authentication(d) => d.to_buffer(),
            DetailEntry::Invoice(d) => d.to_buffer(),
            DetailEntry::DataPacket(d) => d.to_buffer(),
            DetailEntry::AppEncryption(d) => d.to_buffer(),
            DetailEntry::UserData(d) => d.to_buffer(),
        }
    }

    /// Parse an entry from its ordinal tag and payload bytes.
    pub fn from_payload(ordinal: u64, payload: &[u8]) -> Result<Self, PrimitivesError> {
        match ordinal {
            1 => Ok(DetailEntry::IdentityUpdate(IdentityUpdateDetails::from_buffer(payload)?)),
            2 => Ok(DetailEntry::Authentication(AuthenticationDetails::from_buffer(payload)?)),
            3 => Ok(DetailEntry::Invoice(InvoiceDetails::from_buffer(payload)?)),
            4 => Ok(DetailEntry::DataPacket(DataPacketDetails::from_buffer(payload)?)),
            5 => Ok(DetailEntry::AppEncryption(AppEncryptionDetails::from_buffer(payload)?)),
            6 => Ok(DetailEntry::UserData(UserDataDetails::from_buffer(payload)?)),
            other => Err(PrimitivesError::UnknownDetailKind(other)),
        }
    }

    /// JSON view of the entry, tagged with its kind ordinal.
    pub fn to_json(&self) -> serde_json::Value {
        let data = match self {
            DetailEntry::IdentityUpdate(d) => d.to_json(),
            DetailEntry::Authentication(d) => d.to_json(),
            DetailEntry::Invoice(d) => d.to_json(),
            DetailEntry::DataPacket(d) => d.to_json(),
            DetailEntry::AppEncryption(d) => d.to_json(),
            DetailEntry::UserData(d) => d.to_json(),
        };
        serde_json::json!({
            "type": self.ordinal(),
            "data": data,
        })
    }
}

/// The outer request envelope carried inside a wallet deeplink.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestEnvelope {
    /// Record version.
    pub version: u64,
    /// Flags bitmask; signed and testnet bits.
    pub flags: u64,
    /// Creation time, seconds since the Unix epoch.
    pub created_at: u64,
    /// Ordered detail sequence. Order is significant: a recipient
    /// constraint preamble must precede the entry it constrains.
    pub details: Vec<DetailEntry>,
    /// Where the wallet should deliver the response.
    pub response_uris: Option<Vec<ResponseUri>>,
    /// The requester's signature over the envelope.
    pub signature: Option<SignatureBlock>,
}

impl RequestEnvelope {
    /// Default record version.
    pub const DEFAULT_VERSION: u64 = 1;

    /// The envelope carries a signature block.
    pub const FLAG_SIGNED: u64 = 1;
    /// The envelope targets the test network.
    pub const FLAG_TESTNET: u64 = 2;

    /// Create an unsigned mainnet envelope.
    pub fn new(created_at: u64, details: Vec<DetailEntry>) -> Self {
        RequestEnvelope {
            version: Self::DEFAULT_VERSION,
            flags: 0,
            created_at,
            details,
            response_uris: None,
            signature: None,
        }
    }

    /// Whether the signed bit is set.
    pub fn is_signed(&self) -> bool {
        self.flags & Self::FLAG_SIGNED != 0
    }

    /// Whether the testnet bit is set.
    pub fn is_testnet(&self) -> bool {
        self.flags & Self::FLAG_TESTNET != 0
    }

    /// Set or clear the testnet bit.
    pub fn set_testnet(&mut self, testnet: bool) {
        if testnet {
            self.flags |= Self::FLAG_TESTNET;
        } else {
            self.flags &= !Self::FLAG_TESTNET;
        }
    }

    /// Attach a signature block and set the signed bit.
    pub fn set_signature(&mut self, signature: SignatureBlock) {
        self.signature = Some(signature);
        self.flags |= Self::FLAG_SIGNED;
    }

    /// Serialize to bytes.
    ///
    /// With `include_signature` false the signature block is left out
    /// entirely while the signed bit stays as stored; this is the form
    /// the pre-signature hash is computed over.
    pub fn to_buffer(&self, include_signature: bool) -> Vec<u8> {
        let mut w = ByteWriter::new();
        w.write_varint(self.version);
        w.write_varint(self.flags);
        w.write_varint(self.created_at);
        w.write_varint(self.details.len() as u64);
        for entry in &self.details {
            w.write_varint(entry.ordinal());
            w.write_var_bytes(&entry.payload());
        }
        match &self.response_uris {
            Some(uris) => {
                w.write_u8(1);
                w.write_varint(uris.len() as u64);
                for uri in uris {
                    uri.write(&mut w);
                }
            }
            None => w.write_u8(0),
        }
        if include_signature {
            if let Some(sig) = &self.signature {
                w.write_u8(1);
                w.write_var_bytes(&sig.to_buffer());
            } else {
                w.write_u8(0);
            }
        } else {
            w.write_u8(0);
        }
        w.into_bytes()
    }

    /// Deserialize from bytes.
    pub fn from_buffer(data: &[u8]) -> Result<Self, PrimitivesError> {
        let mut r = ByteReader::new(data);
        let version = r.read_varint()?;
        let flags = r.read_varint()?;
        let created_at = r.read_varint()?;
        let count = r.read_count()?;
        let mut details = Vec::with_capacity(count);
        for _ in 0..count {
            let ordinal = r.read_varint()?;
            let payload = r.read_var_bytes()?;
            details.push(DetailEntry::from_payload(ordinal, &payload)?);
        }
        let response_uris = match r.read_u8()? {
            0 => None,
            _ => {
                let count = r.read_count()?;
                let mut uris = Vec::with_capacity(count);
                for _ in 0..count {
                    uris.push(ResponseUri::read(&mut r)?);
                }
                Some(uris)
            }
        };
        let signature = match r.read_u8()? {
            0 => None,
            _ => {
                let bytes = r.read_var_bytes()?;
                Some(SignatureBlock::from_buffer(&bytes)?)
            }
        };
        Ok(RequestEnvelope {
            version,
            flags,
            created_at,
            details,
            response_uris,
            signature,
        })
    }

    /// SHA-256 of the serialized envelope. The pre-signature hash uses
    /// `include_signature = false`, so signature bytes never affect it.
    pub fn raw_data_sha256(&self, include_signature: bool) -> [u8; 32] {
        sha256(&self.to_buffer(include_signature))
    }

    /// Encode the envelope as a wallet deeplink URI.
    ///
    /// An envelope with the signed bit set must carry populated
    /// signature bytes; a placeholder block is not enough.
    pub fn to_wallet_deeplink_uri(&self) -> Result<String, PrimitivesError> {
        if self.is_signed()
            && self
                .signature
                .as_ref()
                .map_or(true, |sig| sig.signature.is_empty())
        {
            return Err(PrimitivesError::MissingSignature);
        }
        let encoded = URL_SAFE_NO_PAD.encode(self.to_buffer(true));
        Ok(format!("{DEEPLINK_PREFIX}{encoded}"))
    }

    /// Decode an envelope from a wallet deeplink URI.
    pub fn from_wallet_deeplink_uri(uri: &str) -> Result<Self, PrimitivesError> {
        let encoded = uri.strip_prefix(DEEPLINK_PREFIX).ok_or_else(|| {
            PrimitivesError::InvalidDeeplink("unrecognized deeplink prefix".to_string())
        })?;
        let data = URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|e| PrimitivesError::InvalidDeeplink(e.to_string()))?;
        Self::from_buffer(&data)
    }

    /// JSON view of the envelope.
    pub fn to_json(&self) -> serde_json::Value {
        let mut obj = serde_json::json!({
            "version": self.version,
            "flags": self.flags,
            "createdAt": self.created_at,
            "details": self.details.iter().map(DetailEntry::to_json).collect::<Vec<_>>(),
        });
        if let Some(uris) = &self.response_uris {
            obj["responseUris"] = uris.iter().map(ResponseUri::to_json).collect::<Vec<_>>().into();
        }
        if let Some(sig) = &self.signature {
            obj["signature"] = sig.to_json();
        }
        obj
    }
}
