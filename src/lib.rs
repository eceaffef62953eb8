//! NemesisDB client - asynchronous WebSocket client library.
//!
//! This library talks to a NemesisDB server over a single persistent
//! WebSocket, pairing each command with its one response.
//!
//! # Architecture
//!
//! The client is layered:
//!
//! - **Connection core**: owns the socket and a background receive
//!   loop; guarantees at most one request is in flight, so responses
//!   can never be attributed to the wrong request.
//! - **Protocol**: the JSON envelope - requests are single-key objects
//!   (`{"KV_SET": {...}}`), responses carry an `st` status.
//! - **Command clients**: [`KvClient`] for sessionless key/value
//!   commands, [`SessionClient`] for session-scoped commands.
//!
//! Key design principles:
//!
//! - Strict request/response pairing (no pipelining); a second query
//!   while one is in flight is rejected, not queued
//! - Closing with a query outstanding cancels it with a distinct
//!   outcome, it never hangs
//! - A connection is used once; reconnecting means a new instance
//!
//! # Quick Start
//!
//! ```no_run
//! use ndb_client::{KvClient, Result};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = KvClient::new();
//!     client.open("ws://127.0.0.1:1987").await?;
//!
//!     client.set(json!({"user": "alice", "age": 30})).await?;
//!     let values = client.get(&["user", "age"]).await?;
//!     println!("{values:?}");
//!
//!     client.close().await;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | Typed command clients: [`KvClient`], [`SessionClient`] |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`protocol`] | JSON command protocol (names, statuses, envelope) |
//! | [`transport`] | Connection lifecycle and receive loop |

// ============================================================================
// Modules
// ============================================================================

/// Typed command clients.
///
/// One function per database command, layered over the connection.
pub mod client;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// JSON command protocol.
///
/// Command names, status values and the request/response envelope.
pub mod protocol;

/// WebSocket transport layer.
///
/// The connection, its lifecycle states and the opaque [`Frame`] type.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Client types
pub use client::{Client, KvClient, Session, SessionClient};

// Error types
pub use error::{Error, Result};

// Transport types
pub use transport::{Connection, ConnectionState, DEFAULT_CONNECT_TIMEOUT, Frame};
