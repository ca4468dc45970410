//! Remote signer: hashes the envelope, asks the oracle to sign, and
//! embeds the returned signature bytes.

use std::future::Future;

use tracing::debug;
use verus_primitives::details::DataPacketDetails;
use verus_primitives::{CompactIdentityReference, RequestEnvelope, SignatureBlock};
use verus_rpc::{ChainInfo, IdentityInfo, RpcError, VerusRpcClient};

use crate::error::RequestError;

/// The remote signing oracle.
pub trait SigningOracle {
    /// Sign a hex-encoded 32-byte hash with the identity's signing key,
    /// returning the detached signature base64 encoded.
    fn sign_hash(
        &self,
        identity: &str,
        hash_hex: &str,
    ) -> impl Future<Output = Result<String, RequestError>> + Send;

    /// Sign a hex-encoded message with the identity's signing key.
    fn sign_message(
        &self,
        identity: &str,
        message_hex: &str,
    ) -> impl Future<Output = Result<String, RequestError>> + Send;
}

/// Read-only identity and chain state, used by the checked signing
/// variant.
pub trait IdentityOracle {
    /// Look up an identity's status, signing policy, and addresses.
    fn identity_info(
        &self,
        identity: &str,
    ) -> impl Future<Output = Result<IdentityInfo, RpcError>> + Send;

    /// Fetch chain state.
    fn chain_info(&self) -> impl Future<Output = Result<ChainInfo, RpcError>> + Send;
}

fn extract_signature(result: verus_rpc::SignDataResult) -> Result<String, RequestError> {
    match result.signature {
        Some(signature) if !signature.is_empty() => Ok(signature),
        _ => Err(RequestError::Signing(
            "signing oracle returned no signature".to_string(),
        )),
    }
}

impl SigningOracle for VerusRpcClient {
    async fn sign_hash(&self, identity: &str, hash_hex: &str) -> Result<String, RequestError> {
        let result = self.sign_data(identity, hash_hex).await?;
        extract_signature(result)
    }

    async fn sign_message(&self, identity: &str, message_hex: &str) -> Result<String, RequestError> {
        let result = VerusRpcClient::sign_message(self, identity, message_hex).await?;
        extract_signature(result)
    }
}

impl IdentityOracle for VerusRpcClient {
    async fn identity_info(&self, identity: &str) -> Result<IdentityInfo, RpcError> {
        self.get_identity(identity).await
    }

    async fn chain_info(&self) -> Result<ChainInfo, RpcError> {
        self.get_info().await
    }
}

/// Sign the envelope in place.
///
/// The hash covers the envelope's canonical bytes without the signature
/// bytes, so signing never changes what was hashed.
pub async fn sign_envelope<O: SigningOracle>(
    oracle: &O,
    envelope: &mut RequestEnvelope,
    signing_id: &str,
) -> Result<(), RequestError> {
    let hash_hex = hex::encode(envelope.raw_data_sha256(false));
    debug!(signing_id, hash = %hash_hex, "requesting envelope signature");
    let signature_b64 = oracle.sign_hash(signing_id, &hash_hex).await?;

    let block = envelope
        .signature
        .as_mut()
        .ok_or_else(|| RequestError::Signing("envelope has no signature block".to_string()))?;
    block.signature = base64::Engine::decode(
        &base64::engine::general_purpose::STANDARD,
        signature_b64.as_bytes(),
    )
    .map_err(|e| RequestError::Signing(format!("oracle returned invalid base64: {e}")))?;
    Ok(())
}

/// Sign the envelope in place, first checking the signer qualifies.
///
/// The identity must be active with a single-signature policy, and
/// `expected_address` must be among its on-chain primary addresses. The
/// two oracle reads are independent and issued concurrently; the chain
/// height is recorded into the signature block.
pub async fn sign_envelope_checked<O: SigningOracle + IdentityOracle>(
    oracle: &O,
    envelope: &mut RequestEnvelope,
    signing_id: &str,
    expected_address: &str,
) -> Result<(), RequestError> {
    let (identity, chain) =
        tokio::try_join!(oracle.identity_info(signing_id), oracle.chain_info())?;

    if identity.status != "active" {
        return Err(RequestError::Signing(format!(
            "identity {signing_id} is not active (status: {})",
            identity.status
        )));
    }
    if identity.identity.minimumsignatures != 1 {
        return Err(RequestError::Signing(format!(
            "identity {signing_id} requires {} signatures; only single-signature identities can sign",
            identity.identity.minimumsignatures
        )));
    }
    if !identity
        .identity
        .primaryaddresses
        .iter()
        .any(|a| a == expected_address)
    {
        return Err(RequestError::Signing(format!(
            "address {expected_address} is not a primary address of {signing_id}"
        )));
    }

    if let Some(block) = envelope.signature.as_mut() {
        block.block_height = chain.blocks;
    }
    sign_envelope(oracle, envelope, signing_id).await
}

/// Sign a single data packet record rather than a whole envelope.
///
/// The record's serialized bytes are signed as a message; the daemon
/// hashes them itself. The returned block carries the system reference
/// with its inclusion flag already set, so the signature verifies on
/// that system once embedded.
pub async fn sign_detail_record<O: SigningOracle>(
    oracle: &O,
    details: &DataPacketDetails,
    signing_id: &str,
    system_id: &str,
) -> Result<(SignatureBlock, String), RequestError> {
    let message_hex = hex::encode(details.to_buffer());
    debug!(signing_id, "requesting detail record signature");
    let signature_b64 = oracle.sign_message(signing_id, &message_hex).await?;

    let identity = CompactIdentityReference::from_address(signing_id).map_err(|_| {
        RequestError::Validation(
            "signingId must be a valid i-address or fully qualified name.".to_string(),
        )
    })?;
    let mut block = SignatureBlock::from_cli_signature(identity, &signature_b64)?;
    block.system_id = Some(CompactIdentityReference::from_address(system_id)?);
    block.set_has_system();
    Ok((block, message_hex))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use verus_primitives::details::AuthenticationDetails;
    use verus_primitives::DetailEntry;
    use verus_rpc::IdentityRecord;

    const SYSTEM: &str = "iJhCezBExJHvtyH3fGhNnt2NhU4Ztkf2yq";

    struct FakeOracle {
        signature: String,
        status: String,
        minimum_signatures: u32,
        primary_addresses: Vec<String>,
        height: u64,
        signed_hashes: Mutex<Vec<String>>,
    }

    impl FakeOracle {
        fn new() -> Self {
            FakeOracle {
                signature: base64::Engine::encode(
                    &base64::engine::general_purpose::STANDARD,
                    [0xAB; 65],
                ),
                status: "active".to_string(),
                minimum_signatures: 1,
                primary_addresses: vec!["RPrimary".to_string()],
                height: 123_456,
                signed_hashes: Mutex::new(Vec::new()),
            }
        }
    }

    impl SigningOracle for FakeOracle {
        async fn sign_hash(&self, _identity: &str, hash_hex: &str) -> Result<String, RequestError> {
            self.signed_hashes.lock().unwrap().push(hash_hex.to_string());
            Ok(self.signature.clone())
        }

        async fn sign_message(
            &self,
            _identity: &str,
            _message_hex: &str,
        ) -> Result<String, RequestError> {
            Ok(self.signature.clone())
        }
    }

    impl IdentityOracle for FakeOracle {
        async fn identity_info(&self, _identity: &str) -> Result<IdentityInfo, RpcError> {
            Ok(IdentityInfo {
                identity: IdentityRecord {
                    name: "alice".to_string(),
                    identityaddress: String::new(),
                    parent: String::new(),
                    primaryaddresses: self.primary_addresses.clone(),
                    minimumsignatures: self.minimum_signatures,
                },
                status: self.status.clone(),
                blockheight: 1,
            })
        }

        async fn chain_info(&self) -> Result<ChainInfo, RpcError> {
            Ok(ChainInfo {
                blocks: self.height,
                name: "VRSCTEST".to_string(),
                protocolversion: 1,
            })
        }
    }

    fn signed_envelope() -> RequestEnvelope {
        let mut envelope = RequestEnvelope::new(
            1_700_000_000,
            vec![DetailEntry::Authentication(AuthenticationDetails::new(
                None,
                None,
                Vec::new(),
            ))],
        );
        let system = CompactIdentityReference::from_address(SYSTEM).unwrap();
        let identity = CompactIdentityReference::from_address("alice@").unwrap();
        envelope.set_signature(SignatureBlock::placeholder(system, identity));
        envelope
    }

    #[tokio::test]
    async fn test_sign_embeds_bytes_and_hash_is_presignature() {
        let oracle = FakeOracle::new();
        let mut envelope = signed_envelope();
        let expected_hash = hex::encode(envelope.raw_data_sha256(false));

        sign_envelope(&oracle, &mut envelope, "alice@").await.unwrap();

        assert_eq!(envelope.signature.as_ref().unwrap().signature, vec![0xAB; 65]);
        assert_eq!(*oracle.signed_hashes.lock().unwrap(), vec![expected_hash]);
    }

    #[tokio::test]
    async fn test_checked_signing_records_height() {
        let oracle = FakeOracle::new();
        let mut envelope = signed_envelope();
        sign_envelope_checked(&oracle, &mut envelope, "alice@", "RPrimary")
            .await
            .unwrap();
        assert_eq!(envelope.signature.as_ref().unwrap().block_height, 123_456);
    }

    #[tokio::test]
    async fn test_checked_signing_rejects_inactive() {
        let mut oracle = FakeOracle::new();
        oracle.status = "revoked".to_string();
        let mut envelope = signed_envelope();
        let err = sign_envelope_checked(&oracle, &mut envelope, "alice@", "RPrimary")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not active"));
    }

    #[tokio::test]
    async fn test_checked_signing_rejects_multisig() {
        let mut oracle = FakeOracle::new();
        oracle.minimum_signatures = 2;
        let mut envelope = signed_envelope();
        let err = sign_envelope_checked(&oracle, &mut envelope, "alice@", "RPrimary")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("single-signature"));
    }

    #[tokio::test]
    async fn test_checked_signing_rejects_foreign_address() {
        let oracle = FakeOracle::new();
        let mut envelope = signed_envelope();
        let err = sign_envelope_checked(&oracle, &mut envelope, "alice@", "ROther")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not a primary address"));
    }

    #[tokio::test]
    async fn test_detail_record_signature_carries_system() {
        let oracle = FakeOracle::new();
        let details = DataPacketDetails::new(Vec::new(), Vec::new(), None, None);
        let (block, message_hex) = sign_detail_record(&oracle, &details, "alice@", SYSTEM)
            .await
            .unwrap();
        assert!(block.has_system());
        assert_eq!(block.system_id.as_ref().unwrap().address, SYSTEM);
        assert_eq!(message_hex, hex::encode(details.to_buffer()));
    }
}
