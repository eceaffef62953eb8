//! JSON command protocol.
//!
//! This module defines the message format spoken with the NemesisDB
//! server over the text path.
//!
//! # Protocol Overview
//!
//! | Message | Direction | Shape |
//! |---------|-----------|-------|
//! | Request | Client → Server | `{"KV_SET": { ... }}` |
//! | Response | Server → Client | `{"KV_SET_RSP": {"st": 1, ... }}` |
//!
//! Each request is answered by exactly one response, named after the
//! request with a `_RSP` suffix. The `st` field in the response body
//! carries the command status; values the client checks for live in
//! [`commands::status`].
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `commands` | Command names, field names, status values |
//! | `envelope` | Request building and response unwrapping |

// ============================================================================
// Submodules
// ============================================================================

/// Command names, field names and status values.
pub mod commands;

/// Request envelope building and response unwrapping.
pub mod envelope;

// ============================================================================
// Re-exports
// ============================================================================

pub use commands::{fields, kv, sh, status, sv};
pub use envelope::{Response, request, request_frame};
