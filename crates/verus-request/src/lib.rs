#![deny(missing_docs)]

//! # verus-request
//!
//! Builds, signs, and verifies Verus wallet deeplink requests.
//!
//! The pipeline turns a flat key/value payload into a signed request
//! envelope, delivered as a `verus://` deeplink plus a QR code:
//!
//! 1. Field validators check and type the payload.
//! 2. The redirect assembler projects `{type, uri}` pairs into typed
//!    response URIs, dropping malformed entries.
//! 3. Detail builders (one per request kind) construct the ordered
//!    detail records, enforcing kind-specific cross-field rules.
//! 4. The envelope assembler wraps the details, timestamp, response
//!    URIs, and signature placeholder into one envelope.
//! 5. The remote signer hashes the envelope, asks the daemon to sign,
//!    and embeds the returned signature.
//! 6. The deeplink codec serializes the envelope; for the data packet
//!    flow the deeplink is decoded back and its signature re-verified
//!    before it is released to the caller.
//!
//! # Example
//!
//! ```no_run
//! use verus_request::{PipelineOptions, RequestPipeline};
//! use verus_rpc::RpcConfig;
//!
//! # async fn example() -> Result<(), verus_request::RequestError> {
//! let pipeline = RequestPipeline::from_rpc_config(
//!     RpcConfig {
//!         host: "127.0.0.1".to_string(),
//!         port: 27486,
//!         user: "rpcuser".to_string(),
//!         password: "rpcpass".to_string(),
//!     },
//!     PipelineOptions::testnet(),
//! );
//!
//! let payload = serde_json::json!({
//!     "signingId": "alice@",
//!     "requestId": "iJhCezBExJHvtyH3fGhNnt2NhU4Ztkf2yq",
//! });
//! let output = pipeline.build_authentication(serde_json::from_value(payload)?).await?;
//! println!("{}", output.deeplink);
//! # Ok(())
//! # }
//! ```

pub mod builders;
pub mod deeplink;
pub mod envelope;
pub mod error;
pub mod fields;
pub mod flags;
pub mod pipeline;
pub mod qr;
pub mod redirects;
pub mod signer;

pub use builders::{
    AppEncryptionPayload, AuthenticationPayload, DataPacketPayload, IdentityUpdatePayload,
    InvoicePayload, UserDataPayload,
};
pub use deeplink::SignatureVerifier;
pub use error::RequestError;
pub use pipeline::{BuildOutput, DetailSignatureOutput, PipelineOptions, RequestPipeline};
pub use redirects::RedirectInput;
pub use signer::{IdentityOracle, SigningOracle};

/// System identity of the Verus test network.
pub const SYSTEM_ID_TESTNET: &str = "iJhCezBExJHvtyH3fGhNnt2NhU4Ztkf2yq";
