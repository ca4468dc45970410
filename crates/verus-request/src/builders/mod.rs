//! Detail builders, one per request kind.
//!
//! Each builder validates its payload's cross-field rules, constructs
//! the ordered detail records, and hands the result to the envelope
//! assembler. The payload structs mirror the flat key/value maps
//! callers submit; dual-shaped fields (raw JSON text or pre-parsed
//! structures) stay as [`serde_json::Value`] until a validator types
//! them.

pub(crate) mod app_encryption;
pub(crate) mod authentication;
pub(crate) mod data_packet;
pub(crate) mod identity_update;
pub(crate) mod invoice;
pub(crate) mod user_data;

pub use app_encryption::AppEncryptionPayload;
pub use authentication::AuthenticationPayload;
pub use data_packet::DataPacketPayload;
pub use identity_update::IdentityUpdatePayload;
pub use invoice::InvoicePayload;
pub use user_data::UserDataPayload;

use verus_primitives::DetailEntry;

use crate::redirects::RedirectInput;

/// A builder's output: everything the envelope assembler needs.
#[derive(Debug, Clone)]
pub struct BuiltRequest {
    /// Ordered detail records; order is preserved through assembly.
    pub details: Vec<DetailEntry>,
    /// Whether the envelope must carry a signature.
    pub signed: bool,
    /// Identity that signs, required when `signed`.
    pub signing_id: Option<String>,
    /// Caller-supplied redirects, not yet projected.
    pub redirects: Option<Vec<RedirectInput>>,
    /// Stored flags of the data packet record, kept so callers can
    /// patch the record's lossy JSON view. Data packet builds only.
    pub data_packet_flags: Option<u64>,
}
