//! WebSocket transport layer.
//!
//! This module owns the socket to the NemesisDB server and the
//! background task that reads from it.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐                          ┌─────────────────┐
//! │  Client (Rust)   │         WebSocket        │  NemesisDB      │
//! │                  │◄────────────────────────►│                 │
//! │  Connection      │      ws://host:port      │  Server         │
//! │  + receive loop  │                          │                 │
//! └──────────────────┘                          └─────────────────┘
//! ```
//!
//! # Connection Lifecycle
//!
//! 1. [`Connection::new`] - fresh instance, `Disconnected`
//! 2. [`Connection::start`] - connect with timeout, spawn receive loop
//! 3. [`Connection::query`] - send one frame, await the one response
//! 4. [`Connection::close`] - cancel pending work, close the socket
//!
//! `Closed` is terminal; reconnecting requires a new instance.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `connection` | Connection lifecycle, query pairing, receive loop |

// ============================================================================
// Submodules
// ============================================================================

/// WebSocket connection and receive loop.
pub mod connection;

// ============================================================================
// Re-exports
// ============================================================================

pub use connection::{Connection, ConnectionState, DEFAULT_CONNECT_TIMEOUT, Frame};
