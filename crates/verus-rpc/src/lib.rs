#![deny(missing_docs)]

//! # verus-rpc
//!
//! JSON-RPC client for the Verus daemon, covering the calls the request
//! signing pipeline needs: `signdata`, `getidentity`, `getinfo`,
//! `listidentities`, and signature verification.
//!
//! # Example
//!
//! ```no_run
//! use verus_rpc::{RpcConfig, VerusRpcClient};
//!
//! # async fn example() -> Result<(), verus_rpc::RpcError> {
//! let client = VerusRpcClient::new(RpcConfig {
//!     host: "127.0.0.1".to_string(),
//!     port: 27486,
//!     user: "rpcuser".to_string(),
//!     password: "rpcpass".to_string(),
//! });
//!
//! let info = client.get_info().await?;
//! println!("chain height: {}", info.blocks);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod types;

#[cfg(test)]
mod tests;

pub use client::VerusRpcClient;
pub use error::RpcError;
pub use types::{ChainInfo, IdentityInfo, IdentityRecord, RpcConfig, SignDataResult};
