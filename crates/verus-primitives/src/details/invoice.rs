//! Payment invoice request details.

use crate::util::{ByteReader, ByteWriter};
use crate::PrimitivesError;

/// Destination type code: pay-to-public-key-hash.
pub const DEST_PKH: u8 = 2;
/// Destination type code: pay-to-identity.
pub const DEST_ID: u8 = 4;

/// A typed payment destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferDestination {
    /// Destination type code ([`DEST_PKH`] or [`DEST_ID`]).
    pub kind: u8,
    /// The destination hash bytes (base58check payload, version stripped).
    pub destination_bytes: Vec<u8>,
}

/// Options folded into the invoice flags via a dedicated setter.
#[derive(Debug, Clone, Copy, Default)]
pub struct InvoiceFlagOptions {
    /// The payer may choose any amount.
    pub accepts_any_amount: bool,
    /// The payer may choose any destination.
    pub accepts_any_destination: bool,
    /// Payment via currency conversion is acceptable.
    pub accepts_conversion: bool,
    /// The invoice expires at `expiry_height`.
    pub expires: bool,
    /// Payment from non-Verus systems is acceptable.
    pub accepts_non_verus_systems: bool,
    /// The invoice targets the test network.
    pub is_testnet: bool,
    /// Payment must be a pre-launch conversion.
    pub is_preconvert: bool,
    /// The payment output carries an identity tag.
    pub is_tagged: bool,
}

/// Payment invoice details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceDetails {
    /// Record version.
    pub version: u64,
    /// Flags bitmask; set via [`InvoiceDetails::set_flags`].
    pub flags: u64,
    /// Invoiced amount in currency satoshis; absent when any amount is
    /// accepted.
    pub amount: Option<u64>,
    /// Payment destination; absent when any destination is accepted.
    pub destination: Option<TransferDestination>,
    /// The currency the invoice is denominated in.
    pub requested_currency_id: String,
    /// Block height after which the invoice is void.
    pub expiry_height: Option<u64>,
    /// Maximum acceptable conversion slippage, in satoshis of rate.
    pub max_estimated_slippage: Option<u64>,
    /// Systems payment is accepted from, when non-Verus systems are on.
    pub accepted_systems: Vec<String>,
}

impl InvoiceDetails {
    /// Default record version.
    pub const DEFAULT_VERSION: u64 = 1;

    /// The payer may choose any amount.
    pub const FLAG_ACCEPTS_ANY_AMOUNT: u64 = 1;
    /// The payer may choose any destination.
    pub const FLAG_ACCEPTS_ANY_DESTINATION: u64 = 2;
    /// Payment via conversion is acceptable.
    pub const FLAG_ACCEPTS_CONVERSION: u64 = 4;
    /// The invoice expires.
    pub const FLAG_EXPIRES: u64 = 8;
    /// Payment from non-Verus systems is acceptable.
    pub const FLAG_ACCEPTS_NON_VERUS_SYSTEMS: u64 = 16;
    /// The invoice targets the test network.
    pub const FLAG_IS_TESTNET: u64 = 32;
    /// Payment must be a pre-launch conversion.
    pub const FLAG_IS_PRECONVERT: u64 = 64;
    /// The payment output carries an identity tag.
    pub const FLAG_IS_TAGGED: u64 = 128;

    /// Create invoice details with zeroed flags.
    pub fn new(
        requested_currency_id: String,
        amount: Option<u64>,
        destination: Option<TransferDestination>,
        expiry_height: Option<u64>,
        max_estimated_slippage: Option<u64>,
        accepted_systems: Vec<String>,
    ) -> Self {
        InvoiceDetails {
            version: Self::DEFAULT_VERSION,
            flags: 0,
            amount,
            destination,
            requested_currency_id,
            expiry_height,
            max_estimated_slippage,
            accepted_systems,
        }
    }

    /// Fold the semantic options into the flags bitmask, replacing any
    /// previously set flags.
    pub fn set_flags(&mut self, opts: InvoiceFlagOptions) {
        let mut flags = 0u64;
        if opts.accepts_any_amount {
            flags |= Self::FLAG_ACCEPTS_ANY_AMOUNT;
        }
        if opts.accepts_any_destination {
            flags |= Self::FLAG_ACCEPTS_ANY_DESTINATION;
        }
        if opts.accepts_conversion {
            flags |= Self::FLAG_ACCEPTS_CONVERSION;
        }
        if opts.expires {
            flags |= Self::FLAG_EXPIRES;
        }
        if opts.accepts_non_verus_systems {
            flags |= Self::FLAG_ACCEPTS_NON_VERUS_SYSTEMS;
        }
        if opts.is_testnet {
            flags |= Self::FLAG_IS_TESTNET;
        }
        if opts.is_preconvert {
            flags |= Self::FLAG_IS_PRECONVERT;
        }
        if opts.is_tagged {
            flags |= Self::FLAG_IS_TAGGED;
        }
        self.flags = flags;
    }

    /// Serialize to bytes. Optional sections are flag-driven.
    pub fn to_buffer(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        w.write_varint(self.version);
        w.write_varint(self.flags);
        w.write_var_string(&self.requested_currency_id);
        if self.flags & Self::FLAG_ACCEPTS_ANY_AMOUNT == 0 {
            w.write_varint(self.amount.unwrap_or(0));
        }
        if self.flags & Self::FLAG_ACCEPTS_ANY_DESTINATION == 0 {
            match &self.destination {
                Some(dest) => {
                    w.write_u8(dest.kind);
                    w.write_var_bytes(&dest.destination_bytes);
                }
                None => {
                    w.write_u8(0);
                    w.write_var_bytes(&[]);
                }
            }
        }
        if self.flags & Self::FLAG_EXPIRES != 0 {
            w.write_varint(self.expiry_height.unwrap_or(0));
        }
        if self.flags & Self::FLAG_ACCEPTS_CONVERSION != 0 {
            w.write_varint(self.max_estimated_slippage.unwrap_or(0));
        }
        if self.flags & Self::FLAG_ACCEPTS_NON_VERUS_SYSTEMS != 0 {
            w.write_varint(self.accepted_systems.len() as u64);
            for system in &self.accepted_systems {
                w.write_var_string(system);
            }
        }
        w.into_bytes()
    }

    /// Deserialize from bytes.
    pub fn from_buffer(data: &[u8]) -> Result<Self, PrimitivesError> {
        let mut r = ByteReader::new(data);
        let version = r.read_varint()?;
        let flags = r.read_varint()?;
        let requested_currency_id = r.read_var_string()?;
        let amount = if flags & Self::FLAG_ACCEPTS_ANY_AMOUNT == 0 {
            Some(r.read_varint()?)
        } else {
            None
        };
        let destination = if flags & Self::FLAG_ACCEPTS_ANY_DESTINATION == 0 {
            let kind = r.read_u8()?;
            let destination_bytes = r.read_var_bytes()?;
            if kind == 0 && destination_bytes.is_empty() {
                None
            } else {
                Some(TransferDestination {
                    kind,
                    destination_bytes,
                })
            }
        } else {
            None
        };
        let expiry_height = if flags & Self::FLAG_EXPIRES != 0 {
            Some(r.read_varint()?)
        } else {
            None
        };
        let max_estimated_slippage = if flags & Self::FLAG_ACCEPTS_CONVERSION != 0 {
            Some(r.read_varint()?)
        } else {
            None
        };
        let accepted_systems = if flags & Self::FLAG_ACCEPTS_NON_VERUS_SYSTEMS != 0 {
            let count = r.read_count()?;
            let mut systems = Vec::with_capacity(count);
            for _ in 0..count {
                systems.push(r.read_var_string()?);
            }
            systems
        } else {
            Vec::new()
        };
        Ok(InvoiceDetails {
            version,
            flags,
            amount,
            destination,
            requested_currency_id,
            expiry_height,
            max_estimated_slippage,
            accepted_systems,
        })
    }

    /// JSON view of the record.
    pub fn to_json(&self) -> serde_json::Value {
        let mut obj = serde_json::json!({
            "version": self.version,
            "flags": self.flags,
            "requestedCurrencyId": self.requested_currency_id,
        });
        if let Some(amount) = self.amount {
            obj["amount"] = amount.into();
        }
        if let Some(dest) = &self.destination {
            obj["destination"] = serde_json::json!({
                "type": dest.kind,
                "destinationBytes": hex::encode(&dest.destination_bytes),
            });
        }
        if let Some(height) = self.expiry_height {
            obj["expiryHeight"] = height.into();
        }
        if let Some(slippage) = self.max_estimated_slippage {
            obj["maxEstimatedSlippage"] = slippage.into();
        }
        if !self.accepted_systems.is_empty() {
            obj["acceptedSystems"] = self.accepted_systems.clone().into();
        }
        obj
    }
}
