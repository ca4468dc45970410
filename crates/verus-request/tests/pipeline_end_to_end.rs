//! End-to-end pipeline tests against a mocked Verus daemon.

use base64::Engine;
use verus_primitives::details::DataPacketDetails;
use verus_primitives::RequestEnvelope;
use verus_request::{PipelineOptions, RequestError, RequestPipeline};
use verus_rpc::RpcConfig;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn signature_b64() -> String {
    base64::engine::general_purpose::STANDARD.encode([0xAB; 65])
}

fn config_for(server: &MockServer) -> RpcConfig {
    let address = server.address();
    RpcConfig {
        host: address.ip().to_string(),
        port: address.port(),
        user: "rpcuser".to_string(),
        password: "rpcpass".to_string(),
    }
}

async fn mount_signdata(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(serde_json::json!({ "method": "signdata" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "result": { "signature": signature_b64() },
            "error": null,
            "id": "verus-request",
        })))
        .mount(server)
        .await;
}

async fn mount_verifyhash(server: &MockServer, outcome: bool) {
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(serde_json::json!({ "method": "verifyhash" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "result": outcome,
            "error": null,
            "id": "verus-request",
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_data_packet_end_to_end() {
    let server = MockServer::start().await;
    mount_signdata(&server).await;
    mount_verifyhash(&server, true).await;

    let pipeline = RequestPipeline::from_rpc_config(config_for(&server), PipelineOptions::testnet());
    let output = pipeline
        .build_data_packet(
            serde_json::from_value(serde_json::json!({
                "signingId": "service@",
                "flagForUsersSignature": true,
                "flagHasStatements": true,
                "statements": ["I have read the document"],
                "signableObjects": [{ "version": 1, "objectdata": "00ff" }],
                "redirects": [{ "type": "1", "uri": "https://callback.example/done" }],
            }))
            .unwrap(),
        )
        .await
        .unwrap();

    assert!(output
        .deeplink
        .starts_with("verus://x-callback-url/generic-request/?request="));
    assert!(output.qr_data_url.starts_with("data:image/svg+xml;base64,"));

    let decoded = RequestEnvelope::from_wallet_deeplink_uri(&output.deeplink).unwrap();
    assert!(decoded.is_signed());
    assert!(decoded.is_testnet());
    assert_eq!(decoded.signature.as_ref().unwrap().signature, vec![0xAB; 65]);
    assert_eq!(decoded.response_uris.as_ref().unwrap().len(), 1);

    // The parsed view carries the stored flags, intent bits included.
    let parsed = output.parsed_request.unwrap();
    let packet = &parsed["details"][0];
    assert_eq!(packet["type"].as_u64(), Some(4));
    assert_eq!(
        packet["data"]["flags"].as_u64(),
        Some(DataPacketDetails::FLAG_HAS_STATEMENTS | DataPacketDetails::FLAG_FOR_USERS_SIGNATURE)
    );
}

#[tokio::test]
async fn test_failed_verification_fails_the_build() {
    let server = MockServer::start().await;
    mount_signdata(&server).await;
    mount_verifyhash(&server, false).await;

    let pipeline = RequestPipeline::from_rpc_config(config_for(&server), PipelineOptions::testnet());
    let err = pipeline
        .build_data_packet(
            serde_json::from_value(serde_json::json!({
                "signingId": "service@",
                "signableObjects": [{ "version": 1, "objectdata": "00ff" }],
            }))
            .unwrap(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RequestError::Verification(_)));
}

#[tokio::test]
async fn test_checked_signing_consults_the_identity() {
    let server = MockServer::start().await;
    mount_signdata(&server).await;
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(serde_json::json!({ "method": "getidentity" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "result": {
                "identity": {
                    "name": "service",
                    "identityaddress": "iJhCezBExJHvtyH3fGhNnt2NhU4Ztkf2yq",
                    "parent": "",
                    "primaryaddresses": ["RPrimaryAddress"],
                    "minimumsignatures": 1,
                },
                "status": "active",
                "blockheight": 400_000,
            },
            "error": null,
            "id": "verus-request",
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(serde_json::json!({ "method": "getinfo" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "result": { "blocks": 400_123, "name": "VRSCTEST", "protocolversion": 1 },
            "error": null,
            "id": "verus-request",
        })))
        .mount(&server)
        .await;

    let pipeline = RequestPipeline::from_rpc_config(
        config_for(&server),
        PipelineOptions::testnet().with_signer_address("RPrimaryAddress"),
    );
    let output = pipeline
        .build_authentication(
            serde_json::from_value(serde_json::json!({
                "signingId": "service@",
                "requestId": "iJhCezBExJHvtyH3fGhNnt2NhU4Ztkf2yq",
            }))
            .unwrap(),
        )
        .await
        .unwrap();

    let decoded = RequestEnvelope::from_wallet_deeplink_uri(&output.deeplink).unwrap();
    assert_eq!(decoded.signature.as_ref().unwrap().block_height, 400_123);
}

#[tokio::test]
async fn test_daemon_error_surfaces() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
            "result": null,
            "error": { "code": -5, "message": "Invalid address" },
            "id": "verus-request",
        })))
        .mount(&server)
        .await;

    let pipeline = RequestPipeline::from_rpc_config(config_for(&server), PipelineOptions::testnet());
    let err = pipeline
        .build_authentication(
            serde_json::from_value(serde_json::json!({
                "signingId": "service@",
                "requestId": "iJhCezBExJHvtyH3fGhNnt2NhU4Ztkf2yq",
            }))
            .unwrap(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RequestError::Rpc(_)));
}

#[tokio::test]
async fn test_validation_failure_never_reaches_the_daemon() {
    let server = MockServer::start().await;

    let pipeline = RequestPipeline::from_rpc_config(config_for(&server), PipelineOptions::testnet());
    let err = pipeline
        .build_authentication(serde_json::from_value(serde_json::json!({})).unwrap())
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(server.received_requests().await.unwrap().len(), 0);
}
