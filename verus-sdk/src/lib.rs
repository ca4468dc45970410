#![deny(missing_docs)]

//! Verus wallet request SDK.
//!
//! Re-exports all components for convenient single-crate usage.

pub use verus_primitives as primitives;
pub use verus_request as request;
pub use verus_rpc as rpc;
