//! Payment invoice request builder.

use serde::Deserialize;
use serde_json::Value;
use verus_primitives::base58::check_decode;
use verus_primitives::details::invoice::{DEST_ID, DEST_PKH};
use verus_primitives::details::{InvoiceDetails, InvoiceFlagOptions, TransferDestination};
use verus_primitives::DetailEntry;

use crate::builders::BuiltRequest;
use crate::error::RequestError;
use crate::fields::{
    optional_string, parse_optional_positive_u64, parse_positive_u64, require_string,
};
use crate::redirects::parse_redirects;

/// Payload for a payment invoice request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoicePayload {
    /// Whether the envelope must carry a signature.
    #[serde(default)]
    pub signed: bool,
    /// Identity that signs; required when `signed`.
    #[serde(default)]
    pub signing_id: Option<Value>,
    /// Currency the invoice is denominated in.
    #[serde(default)]
    pub requested_currency_id: Option<Value>,
    /// Invoiced amount in satoshis; required unless any amount is accepted.
    #[serde(default)]
    pub amount: Option<Value>,
    /// `"id"` for an identity destination, anything else pay-to-key-hash.
    #[serde(default)]
    pub destination_type: Option<Value>,
    /// Base58check destination; required unless any destination is accepted.
    #[serde(default)]
    pub destination_address: Option<Value>,
    /// The payer may choose any amount.
    #[serde(default)]
    pub accepts_any_amount: bool,
    /// The payer may choose any destination.
    #[serde(default)]
    pub accepts_any_destination: bool,
    /// Payment via conversion is acceptable.
    #[serde(default)]
    pub accepts_conversion: bool,
    /// Maximum conversion slippage; only honored with conversion on.
    #[serde(default)]
    pub max_estimated_slippage: Option<Value>,
    /// The invoice expires at `expiry_height`.
    #[serde(default)]
    pub expires: bool,
    /// Block height the invoice expires at.
    #[serde(default)]
    pub expiry_height: Option<Value>,
    /// Payment from non-Verus systems is acceptable.
    #[serde(default)]
    pub accepts_non_verus_systems: bool,
    /// Comma-separated accepted system i-addresses.
    #[serde(default)]
    pub accepted_systems: Option<Value>,
    /// Overrides the pipeline's network when present.
    #[serde(default)]
    pub is_testnet: Option<bool>,
    /// Payment must be a pre-launch conversion.
    #[serde(default)]
    pub is_preconvert: bool,
    /// The payment output carries an identity tag.
    #[serde(default)]
    pub is_tagged: bool,
    /// Optional response redirects.
    #[serde(default)]
    pub redirects: Option<Value>,
}

fn parse_destination(payload: &InvoicePayload) -> Result<Option<TransferDestination>, RequestError> {
    if payload.accepts_any_destination {
        return Ok(None);
    }
    let Some(address) = optional_string(payload.destination_address.as_ref(), "destinationAddress")?
    else {
        return Err(RequestError::Validation(
            "destinationAddress is required when acceptsAnyDestination is off.".to_string(),
        ));
    };
    let decoded = check_decode(&address).map_err(|_| {
        RequestError::Validation("destinationAddress must be a valid base58check address.".to_string())
    })?;
    if decoded.len() < 2 {
        return Err(RequestError::Validation(
            "destinationAddress must be a valid base58check address.".to_string(),
        ));
    }
    let kind = match optional_string(payload.destination_type.as_ref(), "destinationType")? {
        Some(ref t) if t == "id" => DEST_ID,
        _ => DEST_PKH,
    };
    Ok(Some(TransferDestination {
        kind,
        // The leading version byte is not part of the destination hash.
        destination_bytes: decoded[1..].to_vec(),
    }))
}

fn parse_accepted_systems(payload: &InvoicePayload) -> Result<Vec<String>, RequestError> {
    if !payload.accepts_non_verus_systems {
        return Ok(Vec::new());
    }
    let Some(raw) = optional_string(payload.accepted_systems.as_ref(), "acceptedSystems")? else {
        return Ok(Vec::new());
    };
    let systems: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if systems.is_empty() {
        return Err(RequestError::Validation(
            "At least one accepted system i-address is required.".to_string(),
        ));
    }
    Ok(systems)
}

/// Validate the payload and build the detail sequence.
///
/// `default_testnet` supplies the invoice's network flag when the
/// payload does not state one.
pub fn build(payload: &InvoicePayload, default_testnet: bool) -> Result<BuiltRequest, RequestError> {
    let signing_id = if payload.signed {
        Some(require_string(payload.signing_id.as_ref(), "signingId")?)
    } else {
        None
    };
    let requested_currency_id =
        require_string(payload.requested_currency_id.as_ref(), "requestedCurrencyId")?;

    let amount = if payload.accepts_any_amount {
        None
    } else {
        match payload.amount {
            Some(ref value) if !value.is_null() => {
                Some(parse_positive_u64(Some(value), "amount", None)?)
            }
            _ => {
                return Err(RequestError::Validation(
                    "amount is required when acceptsAnyAmount is off.".to_string(),
                ))
            }
        }
    };

    let destination = parse_destination(payload)?;

    let expiry_height = if payload.expires {
        parse_optional_positive_u64(payload.expiry_height.as_ref(), "expiryHeight")?
    } else {
        None
    };
    let max_estimated_slippage = if payload.accepts_conversion {
        parse_optional_positive_u64(payload.max_estimated_slippage.as_ref(), "maxEstimatedSlippage")?
    } else {
        None
    };
    let accepted_systems = parse_accepted_systems(payload)?;
    let redirects = parse_redirects(payload.redirects.as_ref(), false)?;

    let mut details = InvoiceDetails::new(
        requested_currency_id,
        amount,
        destination,
        expiry_height,
        max_estimated_slippage,
        accepted_systems,
    );
    details.set_flags(InvoiceFlagOptions {
        accepts_any_amount: payload.accepts_any_amount,
        accepts_any_destination: payload.accepts_any_destination,
        accepts_conversion: payload.accepts_conversion,
        expires: payload.expires,
        accepts_non_verus_systems: payload.accepts_non_verus_systems,
        is_testnet: payload.is_testnet.unwrap_or(default_testnet),
        is_preconvert: payload.is_preconvert,
        is_tagged: payload.is_tagged,
    });

    Ok(BuiltRequest {
        details: vec![DetailEntry::Invoice(details)],
        signed: payload.signed,
        signing_id,
        redirects,
        data_packet_flags: None,
    })
}
