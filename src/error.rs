//! Error types for the NemesisDB client.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use ndb_client::{KvClient, Result};
//!
//! async fn example(client: &KvClient) -> Result<()> {
//!     client.set(serde_json::json!({"user": "alice"})).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Connection | [`Error::Connection`], [`Error::ConnectionTimeout`], [`Error::AlreadyStarted`] |
//! | Query | [`Error::AlreadyInFlight`], [`Error::Canceled`], [`Error::Disconnected`] |
//! | Command | [`Error::ResponseStatus`], [`Error::Protocol`] |
//! | Input | [`Error::InvalidArgument`] |
//! | External | [`Error::Json`] |

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use thiserror::Error;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Input Errors
    // ========================================================================
    /// Invalid argument supplied by the caller.
    ///
    /// Returned for an empty URI, a malformed address, or an empty
    /// dataset name, before any wire traffic is generated.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument.
        message: String,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// WebSocket connection failed.
    ///
    /// Returned when the socket cannot be established (refusal, DNS,
    /// handshake failure).
    #[error("Connection failed: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// Connection attempt did not complete within the connect window.
    #[error("Connection timeout after {timeout_ms}ms")]
    ConnectionTimeout {
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    /// `start` was called on a connection that is not fresh.
    ///
    /// A connection instance can be started once; reconnecting requires
    /// a new instance.
    #[error("Connection already started")]
    AlreadyStarted,

    // ========================================================================
    // Query Errors
    // ========================================================================
    /// A query was issued while another query was still awaiting its
    /// response.
    ///
    /// The connection allows exactly one request in flight. Surfaced
    /// immediately; nothing is sent.
    #[error("Query already in flight")]
    AlreadyInFlight,

    /// The connection was closed by the user while the query was
    /// outstanding.
    ///
    /// Distinct from [`Error::Disconnected`]: the caller asked for the
    /// close, the query did not fail on its own.
    #[error("Query canceled by close")]
    Canceled,

    /// The connection was lost while a query was outstanding, or a
    /// query was issued on a connection that is not open.
    #[error("Connection lost")]
    Disconnected,

    // ========================================================================
    // Command Errors
    // ========================================================================
    /// The server answered with an unexpected `st` status value.
    #[error("{command} failed with status {status}")]
    ResponseStatus {
        /// The response name, e.g. `KV_SET_RSP`.
        command: String,
        /// The `st` value the server returned.
        status: i64,
    },

    /// Response shape violation.
    ///
    /// Returned when a reply is not JSON, is missing the expected
    /// response key, or arrives as a binary frame where text was
    /// expected.
    #[error("Protocol error: {message}")]
    Protocol {
        /// Description of the protocol violation.
        message: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates an invalid argument error.
    #[inline]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a connection timeout error.
    #[inline]
    pub fn connection_timeout(timeout_ms: u64) -> Self {
        Self::ConnectionTimeout { timeout_ms }
    }

    /// Creates a response status error.
    #[inline]
    pub fn response_status(command: impl Into<String>, status: i64) -> Self {
        Self::ResponseStatus {
            command: command.into(),
            status,
        }
    }

    /// Creates a protocol error.
    #[inline]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a timeout error.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::ConnectionTimeout { .. })
    }

    /// Returns `true` if this is a connection error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. } | Self::ConnectionTimeout { .. } | Self::Disconnected
        )
    }

    /// Returns `true` if the query was canceled by a user close.
    #[inline]
    #[must_use]
    pub fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled)
    }

    /// Returns `true` if the server rejected the command with a status
    /// value.
    #[inline]
    #[must_use]
    pub fn is_response_error(&self) -> bool {
        matches!(self, Self::ResponseStatus { .. })
    }
}

// ============================================================================
// Tests
// ============================================================================
