//! Typed command clients.
//!
//! This module wraps the connection with one function per database
//! command:
//!
//! - [`Client`] - shared plumbing: open/close, raw command send,
//!   server information
//! - [`KvClient`] - key/value commands for a server with sessions
//!   disabled
//! - [`SessionClient`] - session commands plus token-scoped key/value
//!   commands
//!
//! # Example
//!
//! ```no_run
//! use ndb_client::KvClient;
//! use serde_json::json;
//!
//! # async fn example() -> ndb_client::Result<()> {
//! let client = KvClient::new();
//! client.open("ws://127.0.0.1:1987").await?;
//!
//! client.set(json!({"user": "alice", "age": 30})).await?;
//! let values = client.get(&["user"]).await?;
//!
//! client.close().await;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

mod kv;
mod session;

// ============================================================================
// Re-exports
// ============================================================================

pub use kv::KvClient;
pub use session::{Session, SessionClient};

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use serde_json::{Map, Value, json};
use tracing::debug;

use crate::error::{Error, Result};
use crate::protocol::{Response, fields, request_frame, status, sv};
use crate::transport::Connection;

// ============================================================================
// Client
// ============================================================================

/// Shared command plumbing used by [`KvClient`] and [`SessionClient`].
///
/// Owns the connection and implements the request/response envelope
/// handling; the typed clients add one function per command on top.
/// Usable directly for commands the typed clients do not wrap.
pub struct Client {
    connection: Connection,
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl Client {
    /// Creates a client with a fresh, unconnected [`Connection`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            connection: Connection::new(),
        }
    }

    /// Connects to the server with the default connect timeout.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if `uri` is empty
    /// - connection errors from [`Connection::start`]
    pub async fn open(&self, uri: &str) -> Result<()> {
        if uri.is_empty() {
            return Err(Error::invalid_argument("URI is empty"));
        }
        self.connection.start(uri).await
    }

    /// Connects to the server with an explicit connect timeout.
    pub async fn open_with_timeout(&self, uri: &str, connect_timeout: Duration) -> Result<()> {
        if uri.is_empty() {
            return Err(Error::invalid_argument("URI is empty"));
        }
        self.connection
            .start_with_timeout(uri, connect_timeout)
            .await
    }

    /// Closes the connection. Idempotent.
    pub async fn close(&self) {
        self.connection.close().await;
    }

    /// Returns the underlying connection.
    #[inline]
    #[must_use]
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Sends a command and unwraps the response body, expecting
    /// [`status::SUCCESS`].
    pub async fn send_cmd(
        &self,
        req_name: &str,
        rsp_name: &str,
        body: Value,
    ) -> Result<Map<String, Value>> {
        self.send_cmd_expect(req_name, rsp_name, body, status::SUCCESS)
            .await
    }

    /// Sends a command and unwraps the response body, expecting the
    /// given status.
    ///
    /// # Errors
    ///
    /// - query errors from [`Connection::query`]
    /// - [`Error::ResponseStatus`] if the reply's `st` differs from
    ///   `expected`
    /// - [`Error::Protocol`] if the reply does not carry the expected
    ///   response body
    pub async fn send_cmd_expect(
        &self,
        req_name: &str,
        rsp_name: &str,
        body: Value,
        expected: i64,
    ) -> Result<Map<String, Value>> {
        debug!(command = req_name, "sending command");

        let frame = request_frame(req_name, body)?;
        let reply = self.connection.query(frame).await?;

        Response::parse(reply)?.into_body(rsp_name, expected)
    }

    /// Fetches server information (`SV_INFO`).
    ///
    /// Returns the response body with the status field removed.
    pub async fn server_info(&self) -> Result<Map<String, Value>> {
        let mut info = self.send_cmd(sv::INFO_REQ, sv::INFO_RSP, json!({})).await?;
        info.remove(fields::STATUS);
        Ok(info)
    }
}

// ============================================================================
// Body Extraction
// ============================================================================

/// Removes an object field from a response body.
pub(crate) fn take_object(
    body: &mut Map<String, Value>,
    key: &str,
    rsp_name: &str,
) -> Result<Map<String, Value>> {
    match body.remove(key) {
        Some(Value::Object(object)) => Ok(object),
        _ => Err(Error::protocol(format!("{rsp_name} missing {key}"))),
    }
}

/// Reads an unsigned integer field from a response body.
pub(crate) fn get_u64(body: &Map<String, Value>, key: &str, rsp_name: &str) -> Result<u64> {
    body.get(key)
        .and_then(Value::as_u64)
        .ok_or_else(|| Error::protocol(format!("{rsp_name} missing {key}")))
}

/// Removes a string array field from a response body.
pub(crate) fn take_string_array(
    body: &mut Map<String, Value>,
    key: &str,
    rsp_name: &str,
) -> Result<Vec<String>> {
    let values = match body.remove(key) {
        Some(Value::Array(values)) => values,
        _ => return Err(Error::protocol(format!("{rsp_name} missing {key}"))),
    };

    values
        .into_iter()
        .map(|value| match value {
            Value::String(s) => Ok(s),
            other => Err(Error::protocol(format!(
                "{rsp_name} {key} contains non-string {other}"
            ))),
        })
        .collect()
}

/// Removes an unsigned integer array field from a response body.
pub(crate) fn take_u64_array(
    body: &mut Map<String, Value>,
    key: &str,
    rsp_name: &str,
) -> Result<Vec<u64>> {
    let values = match body.remove(key) {
        Some(Value::Array(values)) => values,
        _ => return Err(Error::protocol(format!("{rsp_name} missing {key}"))),
    };

    values
        .into_iter()
        .map(|value| {
            value
                .as_u64()
                .ok_or_else(|| Error::protocol(format!("{rsp_name} {key} contains non-integer")))
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn body(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[tokio::test]
    async fn test_open_rejects_empty_uri() {
        let client = Client::new();
        let result = client.open("").await;
        assert!(matches!(result, Err(Error::InvalidArgument { .. })));
    }

    #[test]
    fn test_take_object() {
        let mut rsp = body(json!({"st": 1, "keys": {"a": 1}}));
        let keys = take_object(&mut rsp, "keys", "KV_GET_RSP").expect("object");
        assert_eq!(keys.get("a"), Some(&json!(1)));

        assert!(take_object(&mut rsp, "keys", "KV_GET_RSP").is_err());
    }

    #[test]
    fn test_get_u64() {
        let rsp = body(json!({"st": 1, "cnt": 3}));
        assert_eq!(get_u64(&rsp, "cnt", "KV_COUNT_RSP").expect("cnt"), 3);
        assert!(get_u64(&rsp, "missing", "KV_COUNT_RSP").is_err());
    }

    #[test]
    fn test_take_string_array() {
        let mut rsp = body(json!({"st": 1, "keys": ["a", "b"]}));
        let keys = take_string_array(&mut rsp, "keys", "KV_KEYS_RSP").expect("keys");
        assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);

        let mut rsp = body(json!({"keys": ["a", 5]}));
        assert!(take_string_array(&mut rsp, "keys", "KV_KEYS_RSP").is_err());
    }

    #[test]
    fn test_take_u64_array() {
        let mut rsp = body(json!({"exist": [10, 20]}));
        let tkns = take_u64_array(&mut rsp, "exist", "SH_EXISTS_RSP").expect("exist");
        assert_eq!(tkns, vec![10, 20]);

        let mut rsp = body(json!({"exist": "nope"}));
        assert!(take_u64_array(&mut rsp, "exist", "SH_EXISTS_RSP").is_err());
    }
}
