//! The request pipeline: payload in, signed deeplink and QR code out.

use serde::Serialize;
use serde_json::Value;
use tracing::info;
use verus_primitives::{DetailEntry, RequestEnvelope};
use verus_rpc::{RpcConfig, VerusRpcClient};

use crate::builders::{
    app_encryption, authentication, data_packet, identity_update, invoice, user_data,
    AppEncryptionPayload, AuthenticationPayload, BuiltRequest, DataPacketPayload,
    IdentityUpdatePayload, InvoicePayload, UserDataPayload,
};
use crate::deeplink::{release_verified, SignatureVerifier};
use crate::envelope::assemble;
use crate::error::RequestError;
use crate::qr::qr_data_url;
use crate::signer::{
    sign_detail_record, sign_envelope, sign_envelope_checked, IdentityOracle, SigningOracle,
};
use crate::SYSTEM_ID_TESTNET;

/// Network and signer settings shared by every build.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// System the requests are signed on.
    pub system_id: String,
    /// Mark built envelopes as targeting the test network.
    pub testnet: bool,
    /// When set, signing first checks the signing identity is active,
    /// single-signature, and lists this address as primary.
    pub signer_address: Option<String>,
}

impl PipelineOptions {
    /// Options for the named system.
    pub fn new(system_id: impl Into<String>, testnet: bool) -> Self {
        PipelineOptions {
            system_id: system_id.into(),
            testnet,
            signer_address: None,
        }
    }

    /// Options for the Verus test network.
    pub fn testnet() -> Self {
        PipelineOptions::new(SYSTEM_ID_TESTNET, true)
    }

    /// Require the pre-signing identity check against this address.
    pub fn with_signer_address(mut self, address: impl Into<String>) -> Self {
        self.signer_address = Some(address.into());
        self
    }
}

/// A finished request, ready to hand to a wallet.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildOutput {
    /// The `verus://` deeplink.
    pub deeplink: String,
    /// The deeplink rendered as an SVG QR code data URL.
    pub qr_data_url: String,
    /// JSON view of the request as a wallet will decode it; only
    /// produced by flows that round-trip the deeplink.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parsed_request: Option<Value>,
}

/// A signature over a single data packet record.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailSignatureOutput {
    /// The signature block, JSON encoded.
    pub signature_data: Value,
    /// The hex-encoded bytes that were signed.
    pub message_hex: String,
}

/// Builds and signs wallet deeplink requests against a signing oracle.
#[derive(Debug, Clone)]
pub struct RequestPipeline<O> {
    oracle: O,
    options: PipelineOptions,
}

impl RequestPipeline<VerusRpcClient> {
    /// A pipeline backed by a Verus daemon.
    pub fn from_rpc_config(config: RpcConfig, options: PipelineOptions) -> Self {
        RequestPipeline::with_oracle(VerusRpcClient::new(config), options)
    }
}

impl<O> RequestPipeline<O> {
    /// A pipeline backed by any signing oracle, used mostly in tests.
    pub fn with_oracle(oracle: O, options: PipelineOptions) -> Self {
        RequestPipeline { oracle, options }
    }

    /// The configured options.
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }
}

impl<O: SigningOracle + IdentityOracle> RequestPipeline<O> {
    /// Build, sign, and encode an identity update request.
    pub async fn build_identity_update(
        &self,
        payload: IdentityUpdatePayload,
    ) -> Result<BuildOutput, RequestError> {
        self.finish(identity_update::build(&payload)?).await
    }

    /// Build, sign, and encode a login request.
    pub async fn build_authentication(
        &self,
        payload: AuthenticationPayload,
    ) -> Result<BuildOutput, RequestError> {
        self.finish(authentication::build(&payload)?).await
    }

    /// Build an invoice request; signed only when the payload asks.
    pub async fn build_invoice(&self, payload: InvoicePayload) -> Result<BuildOutput, RequestError> {
        self.finish(invoice::build(&payload, self.options.testnet)?)
            .await
    }

    /// Build, sign, and encode an application encryption request.
    pub async fn build_app_encryption(
        &self,
        payload: AppEncryptionPayload,
    ) -> Result<BuildOutput, RequestError> {
        self.finish(app_encryption::build(&payload)?).await
    }

    /// Build, sign, and encode a user data request.
    pub async fn build_user_data(
        &self,
        payload: UserDataPayload,
    ) -> Result<BuildOutput, RequestError> {
        self.finish(user_data::build(&payload)?).await
    }

    /// Sign a standalone data packet record, without an envelope.
    ///
    /// The record's serialized bytes are signed as a message and the
    /// returned block carries the pipeline's system reference.
    pub async fn sign_data_packet(
        &self,
        payload: DataPacketPayload,
    ) -> Result<DetailSignatureOutput, RequestError> {
        let built = data_packet::build(&payload)?;
        let signing_id = built.signing_id.as_deref().ok_or_else(|| {
            RequestError::Validation("signingId is required.".to_string())
        })?;
        let details = built
            .details
            .iter()
            .find_map(|entry| match entry {
                DetailEntry::DataPacket(details) => Some(details),
                _ => None,
            })
            .ok_or_else(|| {
                RequestError::Validation("payload did not produce a data packet.".to_string())
            })?;

        let (block, message_hex) =
            sign_detail_record(&self.oracle, details, signing_id, &self.options.system_id).await?;
        Ok(DetailSignatureOutput {
            signature_data: block.to_json(),
            message_hex,
        })
    }

    async fn sign(
        &self,
        envelope: &mut RequestEnvelope,
        signing_id: &str,
    ) -> Result<(), RequestError> {
        match self.options.signer_address.as_deref() {
            Some(address) => {
                sign_envelope_checked(&self.oracle, envelope, signing_id, address).await
            }
            None => sign_envelope(&self.oracle, envelope, signing_id).await,
        }
    }

    async fn finish(&self, built: BuiltRequest) -> Result<BuildOutput, RequestError> {
        let mut envelope = assemble(&built, &self.options.system_id, self.options.testnet)?;
        if let Some(signing_id) = built.signing_id.as_deref().filter(|_| built.signed) {
            self.sign(&mut envelope, signing_id).await?;
        }
        let deeplink = envelope.to_wallet_deeplink_uri()?;
        info!(signed = built.signed, "built request deeplink");
        Ok(BuildOutput {
            qr_data_url: qr_data_url(&deeplink)?,
            deeplink,
            parsed_request: None,
        })
    }
}

impl<O: SigningOracle + IdentityOracle + SignatureVerifier> RequestPipeline<O> {
    /// Build, sign, and encode a data packet request.
    ///
    /// The finished deeplink is decoded back and its signature
    /// re-verified before release; a verification failure fails the
    /// whole build. The returned parsed view has the packet's stored
    /// flags patched in, since the plain JSON view only shows presence
    /// bits.
    pub async fn build_data_packet(
        &self,
        payload: DataPacketPayload,
    ) -> Result<BuildOutput, RequestError> {
        let built = data_packet::build(&payload)?;
        let mut output = self.finish(built.clone()).await?;

        let decoded = release_verified(&self.oracle, &output.deeplink).await?;
        let mut parsed = decoded.to_json();
        if let Some(flags) = built.data_packet_flags {
            patch_packet_flags(&decoded, &mut parsed, flags);
        }
        output.parsed_request = Some(parsed);
        Ok(output)
    }
}

/// Restore the stored flags on every data packet entry of the JSON
/// view. The entries are walked alongside the typed details so the
/// patch lands wherever the packet sits, preamble or not.
fn patch_packet_flags(decoded: &RequestEnvelope, parsed: &mut Value, flags: u64) {
    let Some(entries) = parsed.get_mut("details").and_then(Value::as_array_mut) else {
        return;
    };
    for (detail, entry) in decoded.details.iter().zip(entries.iter_mut()) {
        if matches!(detail, DetailEntry::DataPacket(_)) {
            entry["data"]["flags"] = flags.into();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use verus_primitives::details::DataPacketDetails;
    use verus_rpc::{ChainInfo, IdentityInfo, IdentityRecord, RpcError};

    struct FakeOracle {
        verify_result: bool,
        signed_hashes: Mutex<Vec<String>>,
    }

    impl FakeOracle {
        fn new() -> Self {
            FakeOracle {
                verify_result: true,
                signed_hashes: Mutex::new(Vec::new()),
            }
        }

        fn signature_b64() -> String {
            base64::Engine::encode(&base64::engine::general_purpose::STANDARD, [0xAB; 65])
        }
    }

    impl SigningOracle for FakeOracle {
        async fn sign_hash(&self, _identity: &str, hash_hex: &str) -> Result<String, RequestError> {
            self.signed_hashes.lock().unwrap().push(hash_hex.to_string());
            Ok(FakeOracle::signature_b64())
        }

        async fn sign_message(
            &self,
            _identity: &str,
            _message_hex: &str,
        ) -> Result<String, RequestError> {
            Ok(FakeOracle::signature_b64())
        }
    }

    impl IdentityOracle for FakeOracle {
        async fn identity_info(&self, identity: &str) -> Result<IdentityInfo, RpcError> {
            Ok(IdentityInfo {
                identity: IdentityRecord {
                    name: "alice".to_string(),
                    identityaddress: identity.to_string(),
                    parent: String::new(),
                    primaryaddresses: vec!["RPrimary".to_string()],
                    minimumsignatures: 1,
                },
                status: "active".to_string(),
                blockheight: 1,
            })
        }

        async fn chain_info(&self) -> Result<ChainInfo, RpcError> {
            Ok(ChainInfo {
                blocks: 222_333,
                name: "VRSCTEST".to_string(),
                protocolversion: 1,
            })
        }
    }

    impl SignatureVerifier for FakeOracle {
        async fn verify_signature(
            &self,
            _identity: &str,
            _signature_b64: &str,
            _hash_hex: &str,
        ) -> Result<bool, RequestError> {
            Ok(self.verify_result)
        }
    }

    fn pipeline(oracle: FakeOracle) -> RequestPipeline<FakeOracle> {
        RequestPipeline::with_oracle(oracle, PipelineOptions::testnet())
    }

    #[tokio::test]
    async fn test_authentication_build_produces_signed_deeplink() {
        let output = pipeline(FakeOracle::new())
            .build_authentication(
                serde_json::from_value(serde_json::json!({
                    "signingId": "service@",
                    "requestId": crate::SYSTEM_ID_TESTNET,
                }))
                .unwrap(),
            )
            .await
            .unwrap();

        let decoded = RequestEnvelope::from_wallet_deeplink_uri(&output.deeplink).unwrap();
        assert!(decoded.is_signed());
        assert!(decoded.is_testnet());
        assert_eq!(decoded.signature.as_ref().unwrap().signature, vec![0xAB; 65]);
        assert!(output.qr_data_url.starts_with("data:image/svg+xml;base64,"));
        assert!(output.parsed_request.is_none());
    }

    #[tokio::test]
    async fn test_unsigned_invoice_skips_the_oracle() {
        let oracle = FakeOracle::new();
        let output = pipeline(oracle)
            .build_invoice(
                serde_json::from_value(serde_json::json!({
                    "acceptsAnyAmount": true,
                    "acceptsAnyDestination": true,
                    "requestedCurrencyId": crate::SYSTEM_ID_TESTNET,
                }))
                .unwrap(),
            )
            .await
            .unwrap();

        let decoded = RequestEnvelope::from_wallet_deeplink_uri(&output.deeplink).unwrap();
        assert!(!decoded.is_signed());
        assert!(decoded.signature.is_none());
    }

    #[tokio::test]
    async fn test_data_packet_round_trip_patches_flags() {
        let output = pipeline(FakeOracle::new())
            .build_data_packet(
                serde_json::from_value(serde_json::json!({
                    "signingId": "service@",
                    "flagForUsersSignature": true,
                    "flagForTransmittalToUser": true,
                    "recipientIdentity": "alice@",
                    "signableObjects": [{ "version": 1, "objectdata": "0011" }],
                }))
                .unwrap(),
            )
            .await
            .unwrap();

        let parsed = output.parsed_request.unwrap();
        let entries = parsed["details"].as_array().unwrap();
        // Preamble first, then the packet with its intent bits restored.
        assert_eq!(entries[0]["type"].as_u64(), Some(2));
        assert_eq!(entries[1]["type"].as_u64(), Some(4));
        assert_eq!(
            entries[1]["data"]["flags"].as_u64(),
            Some(
                DataPacketDetails::FLAG_FOR_USERS_SIGNATURE
                    | DataPacketDetails::FLAG_FOR_TRANSMITTAL_TO_USER
            )
        );
    }

    #[tokio::test]
    async fn test_data_packet_verification_failure_is_fatal() {
        let mut oracle = FakeOracle::new();
        oracle.verify_result = false;
        let err = pipeline(oracle)
            .build_data_packet(
                serde_json::from_value(serde_json::json!({
                    "signingId": "service@",
                    "signableObjects": [{ "version": 1, "objectdata": "0011" }],
                }))
                .unwrap(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RequestError::Verification(_)));
    }

    #[tokio::test]
    async fn test_signer_address_enables_checked_signing() {
        let oracle = FakeOracle::new();
        let pipeline = RequestPipeline::with_oracle(
            oracle,
            PipelineOptions::testnet().with_signer_address("RPrimary"),
        );
        let output = pipeline
            .build_user_data(
                serde_json::from_value(serde_json::json!({ "signingId": "service@" })).unwrap(),
            )
            .await
            .unwrap();

        let decoded = RequestEnvelope::from_wallet_deeplink_uri(&output.deeplink).unwrap();
        assert_eq!(decoded.signature.as_ref().unwrap().block_height, 222_333);
    }

    #[tokio::test]
    async fn test_sign_data_packet_returns_detached_signature() {
        let output = pipeline(FakeOracle::new())
            .sign_data_packet(
                serde_json::from_value(serde_json::json!({
                    "signingId": "service@",
                    "signableObjects": [{ "version": 1, "objectdata": "0011" }],
                }))
                .unwrap(),
            )
            .await
            .unwrap();

        assert!(!output.message_hex.is_empty());
        assert_eq!(
            output.signature_data["systemId"]["address"].as_str(),
            Some(crate::SYSTEM_ID_TESTNET)
        );
    }
}
