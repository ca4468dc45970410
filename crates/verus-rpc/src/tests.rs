//! Tests for the daemon RPC client.

use wiremock::matchers::{body_partial_json, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::client::VerusRpcClient;
use crate::error::RpcError;
use crate::types::RpcConfig;

fn test_config(server_uri: &str) -> RpcConfig {
    let uri = server_uri.strip_prefix("http://").unwrap();
    let (host, port) = uri.split_once(':').unwrap();
    RpcConfig {
        host: host.to_string(),
        port: port.parse().unwrap(),
        user: "rpcuser".to_string(),
        password: "rpcpass".to_string(),
    }
}

#[tokio::test]
async fn test_sign_data_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(header_exists("authorization"))
        .and(body_partial_json(serde_json::json!({ "method": "signdata" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "result": {
                "signature": "AgXOHQEBQSBhYmNkZWY=",
                "hash": "00ff",
                "system": "VRSCTEST"
            },
            "error": null,
            "id": "verus-request"
        })))
        .mount(&server)
        .await;

    let client = VerusRpcClient::new(test_config(&server.uri()));
    let result = client.sign_data("alice@", "00ff").await.unwrap();

    assert_eq!(result.signature.as_deref(), Some("AgXOHQEBQSBhYmNkZWY="));
    assert_eq!(result.system.as_deref(), Some("VRSCTEST"));
}

#[tokio::test]
async fn test_daemon_error_is_surfaced() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
            "result": null,
            "error": { "code": -5, "message": "Identity not found" },
            "id": "verus-request"
        })))
        .mount(&server)
        .await;

    let client = VerusRpcClient::new(test_config(&server.uri()));
    let result = client.get_identity("nobody@").await;

    match result {
        Err(RpcError::DaemonError { code, message }) => {
            assert_eq!(code, -5);
            assert_eq!(message, "Identity not found");
        }
        other => panic!("expected daemon error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_non_json_failure_is_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
        .mount(&server)
        .await;

    let client = VerusRpcClient::new(test_config(&server.uri()));
    let result = client.get_info().await;

    assert!(matches!(
        result,
        Err(RpcError::ServerError {
            status_code: 401,
            ..
        })
    ));
}

#[tokio::test]
async fn test_get_identity_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(serde_json::json!({
            "method": "getidentity",
            "params": ["alice@"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "result": {
                "identity": {
                    "name": "alice",
                    "identityaddress": "iJhCezBExJHvtyH3fGhNnt2NhU4Ztkf2yq",
                    "parent": "",
                    "primaryaddresses": ["RTest1PrimaryAddress"],
                    "minimumsignatures": 1
                },
                "status": "active",
                "blockheight": 123456
            },
            "error": null,
            "id": "verus-request"
        })))
        .mount(&server)
        .await;

    let client = VerusRpcClient::new(test_config(&server.uri()));
    let info = client.get_identity("alice@").await.unwrap();

    assert_eq!(info.status, "active");
    assert_eq!(info.identity.minimumsignatures, 1);
    assert_eq!(info.identity.primaryaddresses, vec!["RTest1PrimaryAddress"]);
}

#[tokio::test]
async fn test_fetch_url_digest_hashes_the_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/doc.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"hello".as_slice()))
        .mount(&server)
        .await;

    let client = VerusRpcClient::new(test_config(&server.uri()));
    let digest = client
        .fetch_url_digest(&format!("{}/doc.txt", server.uri()))
        .await
        .unwrap();

    assert_eq!(
        hex::encode(digest),
        "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
    );
}

#[tokio::test]
async fn test_fetch_url_digest_rejects_http_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = VerusRpcClient::new(test_config(&server.uri()));
    let result = client
        .fetch_url_digest(&format!("{}/missing", server.uri()))
        .await;

    assert!(matches!(result, Err(RpcError::HttpError(_))));
}

#[tokio::test]
async fn test_empty_result_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "result": null,
            "error": null,
            "id": "verus-request"
        })))
        .mount(&server)
        .await;

    let client = VerusRpcClient::new(test_config(&server.uri()));
    let result = client.get_info().await;

    assert!(matches!(result, Err(RpcError::EmptyResponse(method)) if method == "getinfo"));
}
