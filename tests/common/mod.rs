//! Shared utilities for integration tests.
//!
//! Provides an in-process WebSocket server speaking the single-key
//! request/response protocol, plus helpers for the failure-path tests
//! (silent listeners, unused addresses).

#![allow(dead_code)]

// ============================================================================
// Imports
// ============================================================================

use std::sync::Once;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;
use tracing_subscriber::EnvFilter;

// ============================================================================
// Logging
// ============================================================================

static INIT: Once = Once::new();

/// Initialize tracing for tests. Controlled via `RUST_LOG`.
pub fn init_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_target(false)
            .try_init();
    });
}

// ============================================================================
// Mock Server
// ============================================================================

/// What the mock server does with a received request.
pub enum ServerReply {
    /// Send this JSON value as a text frame.
    Json(Value),
    /// Swallow the request, send nothing.
    Silent,
    /// Close the socket.
    Hangup,
}

/// A one-connection mock server.
pub struct MockServer {
    /// `ws://` URL to connect to.
    pub url: String,
    /// The accept/serve task.
    pub task: JoinHandle<()>,
}

/// Spawns a server that accepts one connection and answers each text
/// frame through `handler`.
pub async fn spawn_server<F>(mut handler: F) -> MockServer
where
    F: FnMut(Value) -> ServerReply + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let url = format!("ws://{}", listener.local_addr().expect("local addr"));

    let task = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept");
        let mut ws = accept_async(stream).await.expect("ws handshake");

        while let Some(Ok(message)) = ws.next().await {
            match message {
                Message::Text(text) => {
                    let request: Value =
                        serde_json::from_str(text.as_str()).expect("request is json");
                    match handler(request) {
                        ServerReply::Json(rsp) => {
                            let frame = Message::Text(rsp.to_string().into());
                            if ws.send(frame).await.is_err() {
                                break;
                            }
                        }
                        ServerReply::Silent => {}
                        ServerReply::Hangup => {
                            let _ = ws.close(None).await;
                            break;
                        }
                    }
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    MockServer { url, task }
}

/// Spawns a listener that accepts TCP but never speaks, so the
/// WebSocket handshake hangs until the client gives up.
pub async fn spawn_silent_tcp() -> MockServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let url = format!("ws://{}", listener.local_addr().expect("local addr"));

    let task = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept");
        // hold the socket open without answering
        tokio::time::sleep(Duration::from_secs(60)).await;
        drop(stream);
    });

    MockServer { url, task }
}

/// Returns a `ws://` URL on which nothing is listening.
pub async fn unused_address() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("ws://{addr}")
}

// ============================================================================
// Assertions
// ============================================================================

/// Polls `predicate` until it holds, failing after a few seconds.
pub async fn wait_for(mut predicate: impl FnMut() -> bool, what: &str) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(3);
    while !predicate() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for {what}"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Splits a `{"NAME": body}` request envelope into its single entry.
pub fn single_entry(request: &Value) -> (String, Value) {
    let object = request.as_object().expect("request is an object");
    assert_eq!(object.len(), 1, "request must have one top-level key");
    let (name, body) = object.iter().next().expect("one entry");
    (name.clone(), body.clone())
}
