//! Session client for a server with sessions enabled.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::error::{Error, Result};
use crate::protocol::{fields, sh, status};
use crate::transport::Connection;

use super::{Client, get_u64, take_object, take_string_array, take_u64_array};

// ============================================================================
// Session
// ============================================================================

/// A session token returned by [`SessionClient::create_session`].
///
/// Token value 0 means "no session".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    tkn: u64,
}

impl Session {
    /// Wraps an existing token value.
    #[inline]
    #[must_use]
    pub fn new(tkn: u64) -> Self {
        Self { tkn }
    }

    /// Returns the token value.
    #[inline]
    #[must_use]
    pub fn token(&self) -> u64 {
        self.tkn
    }

    /// Returns `true` if the token refers to a session.
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.tkn != 0
    }
}

// ============================================================================
// SessionExpiry
// ============================================================================

/// Expiry settings in the `SH_NEW` request body.
#[derive(Debug, Clone, Copy, Serialize)]
struct SessionExpiry {
    /// Seconds until the session expires.
    duration: u64,
    /// Whether the session itself is deleted on expiry. The session's
    /// keys are always deleted.
    #[serde(rename = "deleteSession")]
    delete_session: bool,
}

// ============================================================================
// SessionClient
// ============================================================================

/// Client for the `SH_` command family.
///
/// Similar to [`KvClient`](super::KvClient) but the key/value commands
/// are scoped to a session token, and session management commands are
/// provided.
///
/// # Example
///
/// ```no_run
/// use ndb_client::SessionClient;
/// use serde_json::json;
///
/// # async fn example() -> ndb_client::Result<()> {
/// let client = SessionClient::new();
/// client.open("ws://127.0.0.1:1987").await?;
///
/// let session = client.create_session(0, false).await?;
/// client.set(json!({"user": "alice"}), session.token()).await?;
/// client.end_session(session.token()).await?;
/// # Ok(())
/// # }
/// ```
pub struct SessionClient {
    client: Client,
}

impl Default for SessionClient {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionClient {
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
    // Session Management
    // ========================================================================

    /// Creates a session (`SH_NEW`), optionally expiring.
    ///
    /// `duration_seconds` of 0 means the session never expires. On
    /// expiry the session's keys are always deleted;
    /// `delete_session_on_expire` controls whether the session itself
    /// is deleted too.
    pub async fn create_session(
        &self,
        duration_seconds: u64,
        delete_session_on_expire: bool,
    ) -> Result<Session> {
        let body = if duration_seconds > 0 {
            json!({
                "expiry": SessionExpiry {
                    duration: duration_seconds,
                    delete_session: delete_session_on_expire,
                }
            })
        } else {
            json!({})
        };

        let rsp = self.client.send_cmd(sh::NEW_REQ, sh::NEW_RSP, body).await?;
        let tkn = get_u64(&rsp, fields::TOKEN, sh::NEW_RSP)?;

        debug!(tkn, "created session");
        Ok(Session::new(tkn))
    }

    /// Ends a session (`SH_END`), deleting its keys.
    pub async fn end_session(&self, tkn: u64) -> Result<()> {
        self.send_tkn_cmd(sh::END_REQ, sh::END_RSP, json!({}), tkn)
            .await?;
        Ok(())
    }

    /// Ends every session (`SH_END_ALL`), returning how many were
    /// ended.
    pub async fn end_all_sessions(&self) -> Result<u64> {
        let body = self
            .client
            .send_cmd(sh::END_ALL_REQ, sh::END_ALL_RSP, json!({}))
            .await?;
        get_u64(&body, "cnt", sh::END_ALL_RSP)
    }

    /// Returns which of the given tokens refer to live sessions
    /// (`SH_EXISTS`).
    pub async fn session_exists(&self, tkns: &[u64]) -> Result<Vec<u64>> {
        let mut body = self
            .client
            .send_cmd(sh::EXISTS_REQ, sh::EXISTS_RSP, json!({ "tkns": tkns }))
            .await?;
        take_u64_array(&mut body, "exist", sh::EXISTS_RSP)
    }

    /// Returns information for one session (`SH_INFO`).
    ///
    /// The status field is removed from the returned body.
    pub async fn session_info(&self, tkn: u64) -> Result<Map<String, Value>> {
        let mut info = self
            .send_tkn_cmd(sh::INFO_REQ, sh::INFO_RSP, json!({}), tkn)
            .await?;
        info.remove(fields::STATUS);
        Ok(info)
    }

    /// Returns information over all sessions (`SH_INFO_ALL`).
    pub async fn session_info_all(&self) -> Result<Map<String, Value>> {
        let mut info = self
            .client
            .send_cmd(sh::INFO_ALL_REQ, sh::INFO_ALL_RSP, json!({}))
            .await?;
        info.remove(fields::STATUS);
        Ok(info)
    }

    /// Persists sessions under a dataset name (`SH_SAVE`).
    ///
    /// An empty `tkns` saves every session, otherwise only the named
    /// ones. Completion is reported with [`status::SAVE_COMPLETE`].
    pub async fn session_save(&self, name: &str, tkns: &[u64]) -> Result<()> {
        if name.is_empty() {
            return Err(Error::invalid_argument("name is empty"));
        }

        let body = if tkns.is_empty() {
            json!({ "name": name })
        } else {
            json!({ "name": name, "tkns": tkns })
        };

        self.client
            .send_cmd_expect(sh::SAVE_REQ, sh::SAVE_RSP, body, status::SAVE_COMPLETE)
            .await?;
        Ok(())
    }

    /// Loads previously saved sessions (`SH_LOAD`).
    ///
    /// Returns the response body (session and key counts) with the
    /// status field removed.
    pub async fn session_load(&self, name: &str) -> Result<Map<String, Value>> {
        if name.is_empty() {
            return Err(Error::invalid_argument("name is empty"));
        }

        let mut info = self
            .client
            .send_cmd_expect(
                sh::LOAD_REQ,
                sh::LOAD_RSP,
                json!({ "name": name }),
                status::LOAD_COMPLETE,
            )
            .await?;
        info.remove(fields::STATUS);
        Ok(info)
    }

    // ========================================================================
    // Token-Scoped Key/Value Commands
    // ========================================================================

    /// Stores keys in a session, overwriting existing values
    /// (`SH_SET`).
    pub async fn set(&self, keys: Value, tkn: u64) -> Result<()> {
        self.send_tkn_cmd(sh::SET_REQ, sh::SET_RSP, json!({ "keys": keys }), tkn)
            .await?;
        Ok(())
    }

    /// Stores keys in a session, leaving existing values untouched
    /// (`SH_ADD`).
    pub async fn add(&self, keys: Value, tkn: u64) -> Result<()> {
        self.send_tkn_cmd(sh::ADD_REQ, sh::ADD_RSP, json!({ "keys": keys }), tkn)
            .await?;
        Ok(())
    }

    /// Retrieves values from a session (`SH_GET`).
    pub async fn get(&self, keys: &[&str], tkn: u64) -> Result<Map<String, Value>> {
        let mut body = self
            .send_tkn_cmd(sh::GET_REQ, sh::GET_RSP, json!({ "keys": keys }), tkn)
            .await?;
        take_object(&mut body, "keys", sh::GET_RSP)
    }

    /// Removes keys from a session (`SH_RMV`).
    pub async fn rmv(&self, keys: &[&str], tkn: u64) -> Result<()> {
        self.send_tkn_cmd(sh::RMV_REQ, sh::RMV_RSP, json!({ "keys": keys }), tkn)
            .await?;
        Ok(())
    }

    /// Returns the number of keys in a session (`SH_COUNT`).
    pub async fn count(&self, tkn: u64) -> Result<u64> {
        let body = self
            .send_tkn_cmd(sh::COUNT_REQ, sh::COUNT_RSP, json!({}), tkn)
            .await?;
        get_u64(&body, "cnt", sh::COUNT_RSP)
    }

    /// Returns which of the given keys exist in a session
    /// (`SH_CONTAINS`).
    pub async fn contains(&self, keys: &[&str], tkn: u64) -> Result<Vec<String>> {
        let mut body = self
            .send_tkn_cmd(
                sh::CONTAINS_REQ,
                sh::CONTAINS_RSP,
                json!({ "keys": keys }),
                tkn,
            )
            .await?;
        take_string_array(&mut body, "contains", sh::CONTAINS_RSP)
    }

    /// Returns all key names in a session (`SH_KEYS`).
    pub async fn keys(&self, tkn: u64) -> Result<Vec<String>> {
        let mut body = self
            .send_tkn_cmd(sh::KEYS_REQ, sh::KEYS_RSP, json!({}), tkn)
            .await?;
        take_string_array(&mut body, "keys", sh::KEYS_RSP)
    }

    /// Deletes all keys in a session (`SH_CLEAR`), returning how many
    /// were deleted.
    pub async fn clear(&self, tkn: u64) -> Result<u64> {
        let body = self
            .send_tkn_cmd(sh::CLEAR_REQ, sh::CLEAR_RSP, json!({}), tkn)
            .await?;
        get_u64(&body, "cnt", sh::CLEAR_RSP)
    }

    /// Deletes all keys in a session then stores `keys`
    /// (`SH_CLEAR_SET`), returning how many were deleted.
    pub async fn clear_set(&self, keys: Value, tkn: u64) -> Result<u64> {
        let body = self
            .send_tkn_cmd(
                sh::CLEAR_SET_REQ,
                sh::CLEAR_SET_RSP,
                json!({ "keys": keys }),
                tkn,
            )
            .await?;
        get_u64(&body, "cnt", sh::CLEAR_SET_RSP)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Injects the session token into the body, then sends.
    async fn send_tkn_cmd(
        &self,
        req_name: &str,
        rsp_name: &str,
        mut body: Value,
        tkn: u64,
    ) -> Result<Map<String, Value>> {
        match body.as_object_mut() {
            Some(map) => {
                map.insert(fields::TOKEN.to_owned(), json!(tkn));
            }
            None => return Err(Error::invalid_argument("command body must be an object")),
        }
        self.client.send_cmd(req_name, rsp_name, body).await
    }
}

// ============================================================================
// Tests
// ============================================================================
