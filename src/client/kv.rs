//! Key/value client for a server with sessions disabled.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use serde_json::{Map, Value, json};

use crate::error::{Error, Result};
use crate::protocol::{kv, status};
use crate::transport::Connection;

use super::{Client, get_u64, take_object, take_string_array};

// ============================================================================
// KvClient
// ============================================================================

/// Client for the `KV_` command family.
///
/// Use this when the server runs with sessions disabled; with sessions
/// enabled, use [`SessionClient`](super::SessionClient) instead.
///
/// # Example
///
/// ```no_run
/// use ndb_client::KvClient;
/// use serde_json::json;
///
/// # async fn example() -> ndb_client::Result<()> {
/// let client = KvClient::new();
/// client.open("ws://127.0.0.1:1987").await?;
///
/// client.set(json!({"user": "alice"})).await?;
/// let values = client.get(&["user"]).await?;
/// assert_eq!(values.get("user"), Some(&json!("alice")));
/// # Ok(())
/// # }
/// ```
pub struct KvClient {
    client: Client,
}

impl Default for KvClient {
    fn default() -> Self {
        Self::new()
    }
}

impl KvClient {
    /// Creates an unconnected client.
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Connects to the server with the default connect timeout.
    pub async fn open(&self, uri: &str) -> Result<()> {
        self.client.open(uri).await
    }

    /// Connects to the server with an explicit connect timeout.
    pub async fn open_with_timeout(&self, uri: &str, connect_timeout: Duration) -> Result<()> {
        self.client.open_with_timeout(uri, connect_timeout).await
    }

    /// Closes the connection. Idempotent.
    pub async fn close(&self) {
        self.client.close().await;
    }

    /// Returns the underlying connection.
    #[inline]
    #[must_use]
    pub fn connection(&self) -> &Connection {
        self.client.connection()
    }

    /// Fetches server information (`SV_INFO`).
    pub async fn server_info(&self) -> Result<Map<String, Value>> {
        self.client.server_info().await
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Stores keys, overwriting existing values (`KV_SET`).
    ///
    /// `keys` is an object of key/value pairs.
    pub async fn set(&self, keys: Value) -> Result<()> {
        self.client
            .send_cmd(kv::SET_REQ, kv::SET_RSP, json!({ "keys": keys }))
            .await?;
        Ok(())
    }

    /// Stores keys, leaving existing values untouched (`KV_ADD`).
    pub async fn add(&self, keys: Value) -> Result<()> {
        self.client
            .send_cmd(kv::ADD_REQ, kv::ADD_RSP, json!({ "keys": keys }))
            .await?;
        Ok(())
    }

    /// Retrieves values for the given keys (`KV_GET`).
    ///
    /// Keys that do not exist are absent from the result.
    pub async fn get(&self, keys: &[&str]) -> Result<Map<String, Value>> {
        let mut body = self
            .client
            .send_cmd(kv::GET_REQ, kv::GET_RSP, json!({ "keys": keys }))
            .await?;
        take_object(&mut body, "keys", kv::GET_RSP)
    }

    /// Removes the given keys (`KV_RMV`).
    pub async fn rmv(&self, keys: &[&str]) -> Result<()> {
        self.client
            .send_cmd(kv::RMV_REQ, kv::RMV_RSP, json!({ "keys": keys }))
            .await?;
        Ok(())
    }

    /// Returns the number of stored keys (`KV_COUNT`).
    pub async fn count(&self) -> Result<u64> {
        let body = self
            .client
            .send_cmd(kv::COUNT_REQ, kv::COUNT_RSP, json!({}))
            .await?;
        get_u64(&body, "cnt", kv::COUNT_RSP)
    }

    /// Returns which of the given keys exist (`KV_CONTAINS`).
    pub async fn contains(&self, keys: &[&str]) -> Result<Vec<String>> {
        let mut body = self
            .client
            .send_cmd(kv::CONTAINS_REQ, kv::CONTAINS_RSP, json!({ "keys": keys }))
            .await?;
        take_string_array(&mut body, "contains", kv::CONTAINS_RSP)
    }

    /// Returns all stored key names (`KV_KEYS`).
    pub async fn keys(&self) -> Result<Vec<String>> {
        let mut body = self
            .client
            .send_cmd(kv::KEYS_REQ, kv::KEYS_RSP, json!({}))
            .await?;
        take_string_array(&mut body, "keys", kv::KEYS_RSP)
    }

    /// Deletes all keys (`KV_CLEAR`), returning how many were deleted.
    pub async fn clear(&self) -> Result<u64> {
        let body = self
            .client
            .send_cmd(kv::CLEAR_REQ, kv::CLEAR_RSP, json!({}))
            .await?;
        get_u64(&body, "cnt", kv::CLEAR_RSP)
    }

    /// Deletes all keys then stores `keys` (`KV_CLEAR_SET`), returning
    /// how many were deleted.
    pub async fn clear_set(&self, keys: Value) -> Result<u64> {
        let body = self
            .client
            .send_cmd(kv::CLEAR_SET_REQ, kv::CLEAR_SET_RSP, json!({ "keys": keys }))
            .await?;
        get_u64(&body, "cnt", kv::CLEAR_SET_RSP)
    }

    /// Persists all keys under a dataset name (`KV_SAVE`).
    ///
    /// Completion is reported with [`status::SAVE_COMPLETE`] rather
    /// than plain success.
    pub async fn save(&self, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(Error::invalid_argument("name is empty"));
        }
        self.client
            .send_cmd_expect(
                kv::SAVE_REQ,
                kv::SAVE_RSP,
                json!({ "name": name }),
                status::SAVE_COMPLETE,
            )
            .await?;
        Ok(())
    }

    /// Loads a previously saved dataset (`KV_LOAD`), returning the
    /// number of keys loaded.
    pub async fn load(&self, name: &str) -> Result<u64> {
        if name.is_empty() {
            return Err(Error::invalid_argument("name is empty"));
        }
        let body = self
            .client
            .send_cmd_expect(
                kv::LOAD_REQ,
                kv::LOAD_RSP,
                json!({ "name": name }),
                status::LOAD_COMPLETE,
            )
            .await?;
        get_u64(&body, "keys", kv::LOAD_RSP)
    }
}
