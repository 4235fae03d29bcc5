//! Integration tests for the HTTP transport.
//!
//! Each test starts an in-process axum server on an ephemeral port and talks
//! to it through `kont_core::Client`, exercising the same code path as the CLI.

use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use kont_core::{Bindings, Callback, Client, ClientConfig, ClientError, FaultSide, TransportError};

const API_KEY: &str = "test-key";

async fn echo(Json(body): Json<Value>) -> Json<Value> {
    Json(json!({ "echo": body }))
}

async fn guarded(
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, (StatusCode, String)> {
    match headers.get("x-api-key").and_then(|v| v.to_str().ok()) {
        Some(API_KEY) => Ok(Json(body)),
        _ => Err((StatusCode::UNAUTHORIZED, "missing api key".into())),
    }
}

async fn broken() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "boom")
}

async fn not_json() -> &'static str {
    "plain text"
}

/// Opens a game: asks the client for a hand, passing back the player name
/// found in the `values` binding.
async fn play(Json(body): Json<Value>) -> Json<Value> {
    let params = body.as_array().cloned().unwrap_or_default();
    let values = params.len().checked_sub(2).map(|i| params[i].clone());
    let methods = params.last().cloned().unwrap_or(Value::Null);
    let player = values
        .as_ref()
        .and_then(|v| v.get("player"))
        .cloned()
        .unwrap_or(Value::Null);

    if methods.get("getHand") == Some(&json!(true)) {
        Json(json!({ "t": "Kont", "m": "getHand", "kid": "k1", "args": [player] }))
    } else {
        Json(json!({ "t": "Done", "ans": "no hand" }))
    }
}

async fn kont(Json(body): Json<Value>) -> Json<Value> {
    Json(json!({ "t": "Done", "ans": { "kid": body[0], "hand": body[1] } }))
}

async fn spawn_server() -> String {
    let app = Router::new()
        .route("/echo", post(echo))
        .route("/guarded", post(guarded))
        .route("/broken", post(broken))
        .route("/not-json", post(not_json))
        .route("/play", post(play))
        .route("/kont", post(kont));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("No local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Test server crashed");
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_simple_call_round_trip() {
    let base = spawn_server().await;
    let client = Client::connect(ClientConfig::new(base)).unwrap();

    let result = client.call("echo", json!([1, "two"])).await.unwrap();
    assert_eq!(result, json!({ "echo": [1, "two"] }));
}

#[tokio::test]
async fn test_api_key_header_is_sent() {
    let base = spawn_server().await;

    let anonymous = Client::connect(ClientConfig::new(base.clone())).unwrap();
    let err = anonymous.call("/guarded", json!([])).await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::Transport(TransportError::Status { status: 401, .. })
    ));

    let keyed = Client::connect(ClientConfig::new(base).with_api_key(API_KEY)).unwrap();
    let result = keyed.call("/guarded", json!(["ok"])).await.unwrap();
    assert_eq!(result, json!(["ok"]));
}

#[tokio::test]
async fn test_http_error_status_carries_body() {
    let base = spawn_server().await;
    let client = Client::connect(ClientConfig::new(base)).unwrap();

    let err = client.call("/broken", json!([])).await.unwrap_err();
    match err {
        ClientError::Transport(TransportError::Status { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_non_json_response_is_decode_error() {
    let base = spawn_server().await;
    let client = Client::connect(ClientConfig::new(base)).unwrap();

    let err = client.call("/not-json", json!([])).await.unwrap_err();
    assert!(matches!(err, ClientError::Transport(TransportError::Decode(_))));
    assert_eq!(err.side(), FaultSide::Server);
}

#[tokio::test]
async fn test_unreachable_server_is_request_error() {
    // Bind then drop to get a port nothing listens on.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = Client::connect(ClientConfig::new(format!("http://{}", addr))).unwrap();
    let err = client.call("/echo", json!([])).await.unwrap_err();
    assert!(matches!(err, ClientError::Transport(TransportError::Request(_))));
}

#[tokio::test]
async fn test_interactive_call_over_http() {
    let base = spawn_server().await;
    let client = Client::connect(ClientConfig::new(base)).unwrap();

    let bindings = Bindings::new()
        .value("player", json!("alice"))
        .callback(
            "getHand",
            Callback::new(|args| async move {
                let player = args.first().and_then(Value::as_str).unwrap_or("nobody");
                Ok::<_, String>(json!(format!("{}:rock", player)))
            }),
        );

    let answer = client
        .invoke_interactive("play", vec![json!(1)], bindings)
        .await
        .unwrap();
    assert_eq!(answer, json!({ "kid": "k1", "hand": "alice:rock" }));
}

#[tokio::test]
async fn test_interactive_call_without_callbacks_gets_done() {
    let base = spawn_server().await;
    let client = Client::connect(ClientConfig::new(base)).unwrap();

    let answer = client
        .invoke_interactive("/play", vec![], Bindings::new())
        .await
        .unwrap();
    assert_eq!(answer, json!("no hand"));
}

#[tokio::test]
async fn test_concurrent_interactive_calls_share_client() {
    let base = spawn_server().await;
    let client = Client::connect(ClientConfig::new(base)).unwrap();

    let mut handles = Vec::new();
    for player in ["p1", "p2", "p3"] {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            let bindings = Bindings::new()
                .value("player", json!(player))
                .callback("getHand", Callback::sync(|args| Ok(args[0].clone())));
            client.invoke_interactive("/play", vec![], bindings).await
        }));
    }

    for (handle, player) in handles.into_iter().zip(["p1", "p2", "p3"]) {
        let answer = handle.await.unwrap().unwrap();
        assert_eq!(answer["hand"], json!(player));
    }
}

#[tokio::test]
async fn test_unreadable_error_body_is_reported_in_status() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    // Promise 100 bytes of body, send 5, then hang up.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 4096];
        let _ = socket.read(&mut buf).await;
        let _ = socket
            .write_all(b"HTTP/1.1 500 Internal Server Error\r\nContent-Length: 100\r\n\r\nshort")
            .await;
        let _ = socket.shutdown().await;
    });

    let client = Client::connect(ClientConfig::new(format!("http://{}", addr))).unwrap();
    let err = client.call("/echo", json!([])).await.unwrap_err();
    match err {
        ClientError::Transport(TransportError::Status { status, body }) => {
            assert_eq!(status, 500);
            assert!(
                body.starts_with("<failed to read response body:"),
                "unexpected body: {}",
                body
            );
        }
        other => panic!("expected status error, got {:?}", other),
    }
}
