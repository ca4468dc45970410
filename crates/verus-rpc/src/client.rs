//! JSON-RPC client for the Verus daemon.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::RpcError;
use crate::types::{ChainInfo, IdentityInfo, IdentityRecord, RpcConfig, SignDataResult};

#[derive(Debug, Deserialize)]
struct RpcEnvelope<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

/// JSON-RPC client for the Verus daemon.
#[derive(Debug, Clone)]
pub struct VerusRpcClient {
    /// Client configuration.
    config: RpcConfig,
    /// Underlying HTTP client.
    client: reqwest::Client,
}

impl VerusRpcClient {
    /// Create a new daemon client with the given configuration.
    pub fn new(config: RpcConfig) -> Self {
        let client = reqwest::Client::new();
        Self { config, client }
    }

    /// Sign a 32-byte hash with an identity's signing key.
    ///
    /// `datahash` is the hex-encoded hash; the daemon returns the
    /// detached signature base64 encoded.
    pub async fn sign_data(
        &self,
        address: &str,
        datahash: &str,
    ) -> Result<SignDataResult, RpcError> {
        self.call(
            "signdata",
            serde_json::json!([{ "address": address, "datahash": datahash }]),
        )
        .await
    }

    /// Sign a hex-encoded message with an identity's signing key.
    pub async fn sign_message(
        &self,
        address: &str,
        messagehex: &str,
    ) -> Result<SignDataResult, RpcError> {
        self.call(
            "signdata",
            serde_json::json!([{ "address": address, "messagehex": messagehex }]),
        )
        .await
    }

    /// Look up an identity by name or i-address.
    pub async fn get_identity(&self, identity: &str) -> Result<IdentityInfo, RpcError> {
        self.call("getidentity", serde_json::json!([identity])).await
    }

    /// Fetch daemon and chain state.
    pub async fn get_info(&self) -> Result<ChainInfo, RpcError> {
        self.call("getinfo", serde_json::json!([])).await
    }

    /// List identities the daemon wallet can sign for.
    pub async fn list_identities(&self) -> Result<Vec<IdentityInfo>, RpcError> {
        self.call("listidentities", serde_json::json!([])).await
    }

    /// Verify a detached signature over a hash against an identity.
    pub async fn verify_hash(
        &self,
        address: &str,
        signature_b64: &str,
        hash_hex: &str,
    ) -> Result<bool, RpcError> {
        self.call(
            "verifyhash",
            serde_json::json!([address, signature_b64, hash_hex]),
        )
        .await
    }

    /// Resolve an identity's primary addresses, convenience wrapper.
    pub async fn primary_addresses(&self, identity: &str) -> Result<Vec<String>, RpcError> {
        let info = self.get_identity(identity).await?;
        let IdentityRecord {
            primaryaddresses, ..
        } = info.identity;
        Ok(primaryaddresses)
    }

    /// Download a URL and return the SHA-256 digest of its body.
    ///
    /// Fills a data descriptor's content hash when a request carries a
    /// download URL without a caller-supplied hash. Daemon credentials
    /// are not sent; the URL is an arbitrary third-party resource.
    pub async fn fetch_url_digest(&self, url: &str) -> Result<[u8; 32], RpcError> {
        debug!(url, "fetching url for content hash");
        let resp = self.client.get(url).send().await?.error_for_status()?;
        let body = resp.bytes().await?;
        let mut hasher = Sha256::new();
        hasher.update(&body);
        Ok(hasher.finalize().into())
    }

    /// Perform a JSON-RPC call against the daemon.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T, RpcError> {
        let body = serde_json::json!({
            "jsonrpc": "1.0",
            "id": "verus-request",
            "method": method,
            "params": params,
        });

        debug!(method, "daemon rpc call");

        let resp = self
            .client
            .post(self.config.url())
            .basic_auth(&self.config.user, Some(&self.config.password))
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        // The daemon reports RPC-level failures with a non-2xx status
        // and a JSON-RPC error body; prefer the structured error.
        let envelope: RpcEnvelope<T> = match serde_json::from_str(&text) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(RpcError::ServerError {
                    status_code: status.as_u16(),
                    message: text,
                });
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(err) = envelope.error {
            return Err(RpcError::DaemonError {
                code: err.code,
                message: err.message,
            });
        }
        envelope
            .result
            .ok_or_else(|| RpcError::EmptyResponse(method.to_string()))
    }
}
