//! Daemon RPC data types: configuration and response models.

use serde::{Deserialize, Serialize};

/// Configuration for a [`VerusRpcClient`](crate::VerusRpcClient).
#[derive(Debug, Clone)]
pub struct RpcConfig {
    /// Daemon host name or IP.
    pub host: String,
    /// Daemon RPC port.
    pub port: u16,
    /// RPC basic-auth user.
    pub user: String,
    /// RPC basic-auth password.
    pub password: String,
}

impl RpcConfig {
    /// The daemon endpoint URL.
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// Result of a `signdata` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignDataResult {
    /// Detached signature, base64 encoded.
    #[serde(default)]
    pub signature: Option<String>,
    /// Hash that was signed, hex encoded.
    #[serde(default)]
    pub hash: Option<String>,
    /// System the signature is valid on.
    #[serde(default)]
    pub system: Option<String>,
}

/// The identity document inside a `getidentity` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityRecord {
    /// Friendly identity name.
    #[serde(default)]
    pub name: String,
    /// The identity's i-address.
    #[serde(default)]
    pub identityaddress: String,
    /// Parent identity i-address.
    #[serde(default)]
    pub parent: String,
    /// Transparent addresses authorized to sign for the identity.
    #[serde(default)]
    pub primaryaddresses: Vec<String>,
    /// How many primary addresses must co-sign.
    #[serde(default)]
    pub minimumsignatures: u32,
}

/// A `getidentity` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityInfo {
    /// The identity document.
    pub identity: IdentityRecord,
    /// Lifecycle status (`active`, `revoked`, ...).
    #[serde(default)]
    pub status: String,
    /// Height the identity document was last updated at.
    #[serde(default)]
    pub blockheight: u64,
}

/// A `getinfo` response, trimmed to the fields the pipeline reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainInfo {
    /// Current chain height.
    #[serde(default)]
    pub blocks: u64,
    /// Chain name (`VRSC`, `VRSCTEST`, ...).
    #[serde(default)]
    pub name: String,
    /// Daemon protocol version.
    #[serde(default)]
    pub protocolversion: u64,
}
