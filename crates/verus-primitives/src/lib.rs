#![deny(missing_docs)]

//! Verus request primitives - wire encoding for wallet requests.
//!
//! This crate provides the building blocks consumed by the request
//! builder pipeline:
//! - Compact identity references (i-addresses and fully qualified names)
//! - VarInt encoding and cursor-based binary readers/writers
//! - Base58Check encoding/decoding
//! - The six request detail record types
//! - Data descriptors and URL references for data packets
//! - The request envelope, its pre-signature hash, and the wallet
//!   deeplink URI codec

pub mod util;
pub mod base58;
pub mod address;
pub mod descriptor;
pub mod response_uri;
pub mod signature;
pub mod details;
pub mod envelope;

mod error;
pub use error::PrimitivesError;

pub use address::{CompactIdentityReference, IdentityKind};
pub use descriptor::{DataDescriptor, UrlRef};
pub use envelope::{DetailEntry, RequestEnvelope};
pub use response_uri::{ResponseUri, ResponseUriKind};
pub use signature::SignatureBlock;
