//! Flag calculator for the data packet request kind.
//!
//! Three of the six data packet flag bits are pure requester intent:
//! nothing in the record's fields implies them, so the record's own
//! presence-based flag derivation loses them. The calculator keeps the
//! two families separate and re-ORs the intent bits into the record
//! after construction.

use verus_primitives::details::DataPacketDetails;

/// The caller's boolean flag options for a data packet request.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataPacketFlagOptions {
    /// A request id will be supplied.
    pub has_request_id: bool,
    /// Statements will be supplied.
    pub has_statements: bool,
    /// A pre-existing signature object will be supplied.
    pub has_signature: bool,
    /// The receiving user is asked to sign the packet.
    pub for_users_signature: bool,
    /// The packet is to be transmitted to a user.
    pub for_transmittal_to_user: bool,
    /// The signable object is a download URL descriptor.
    pub has_url_for_download: bool,
}

impl DataPacketFlagOptions {
    /// OR-combine every enabled option into one bitmask.
    pub fn to_mask(self) -> u64 {
        let mut flags = 0u64;
        if self.has_request_id {
            flags |= DataPacketDetails::FLAG_HAS_REQUEST_ID;
        }
        if self.has_statements {
            flags |= DataPacketDetails::FLAG_HAS_STATEMENTS;
        }
        if self.has_signature {
            flags |= DataPacketDetails::FLAG_HAS_SIGNATURE;
        }
        if self.for_users_signature {
            flags |= DataPacketDetails::FLAG_FOR_USERS_SIGNATURE;
        }
        if self.for_transmittal_to_user {
            flags |= DataPacketDetails::FLAG_FOR_TRANSMITTAL_TO_USER;
        }
        if self.has_url_for_download {
            flags |= DataPacketDetails::FLAG_HAS_URL_FOR_DOWNLOAD;
        }
        flags
    }
}

/// Re-OR the intent bits of `requested` into a freshly constructed
/// record, whose own flag derivation only covers presence bits.
pub fn apply_intent_bits(details: &mut DataPacketDetails, requested: u64) {
    details.flags |= requested & DataPacketDetails::INTENT_FLAGS;
}
