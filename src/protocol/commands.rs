//! Command names, field names and status values.
//!
//! Every request is a JSON object with a single top-level key naming
//! the command; the response carries the corresponding `_RSP` name.
//! These constants mirror the server's command vocabulary.

// ============================================================================
// Fields
// ============================================================================

/// Field names common to all responses.
pub mod fields {
    /// Status field present in every response body.
    pub const STATUS: &str = "st";
    /// Session token field.
    pub const TOKEN: &str = "tkn";
}

// ============================================================================
// Status Values
// ============================================================================

/// `st` values the client checks for.
///
/// The server defines more, but only these drive client behavior:
/// save/load commands report completion with their own codes rather
/// than plain success.
pub mod status {
    /// Command success.
    pub const SUCCESS: i64 = 1;
    /// `KV_SAVE` or `SH_SAVE` success, data persisted.
    pub const SAVE_COMPLETE: i64 = 121;
    /// `KV_SAVE` or `SH_SAVE` failure.
    pub const SAVE_ERROR: i64 = 123;
    /// `KV_LOAD` or `SH_LOAD` success, data available.
    pub const LOAD_COMPLETE: i64 = 141;
}

// ============================================================================
// Server Commands
// ============================================================================

/// Server information commands.
pub mod sv {
    pub const INFO_REQ: &str = "SV_INFO";
    pub const INFO_RSP: &str = "SV_INFO_RSP";
}

// ============================================================================
// Key/Value Commands
// ============================================================================

/// Key/value commands, used when the server has sessions disabled.
pub mod kv {
    pub const SET_REQ: &str = "KV_SET";
    pub const SET_RSP: &str = "KV_SET_RSP";
    pub const ADD_REQ: &str = "KV_ADD";
    pub const ADD_RSP: &str = "KV_ADD_RSP";
    pub const GET_REQ: &str = "KV_GET";
    pub const GET_RSP: &str = "KV_GET_RSP";
    pub const RMV_REQ: &str = "KV_RMV";
    pub const RMV_RSP: &str = "KV_RMV_RSP";
    pub const COUNT_REQ: &str = "KV_COUNT";
    pub const COUNT_RSP: &str = "KV_COUNT_RSP";
    pub const CONTAINS_REQ: &str = "KV_CONTAINS";
    pub const CONTAINS_RSP: &str = "KV_CONTAINS_RSP";
    pub const CLEAR_REQ: &str = "KV_CLEAR";
    pub const CLEAR_RSP: &str = "KV_CLEAR_RSP";
    pub const CLEAR_SET_REQ: &str = "KV_CLEAR_SET";
    pub const CLEAR_SET_RSP: &str = "KV_CLEAR_SET_RSP";
    pub const KEYS_REQ: &str = "KV_KEYS";
    pub const KEYS_RSP: &str = "KV_KEYS_RSP";
    pub const SAVE_REQ: &str = "KV_SAVE";
    pub const SAVE_RSP: &str = "KV_SAVE_RSP";
    pub const LOAD_REQ: &str = "KV_LOAD";
    pub const LOAD_RSP: &str = "KV_LOAD_RSP";
}

// ============================================================================
// Session Commands
// ============================================================================

/// Session commands, used when the server has sessions enabled.
///
/// The key/value variants mirror the `KV_` commands but require a
/// session token in the body.
pub mod sh {
    pub const NEW_REQ: &str = "SH_NEW";
    pub const NEW_RSP: &str = "SH_NEW_RSP";
    pub const END_REQ: &str = "SH_END";
    pub const END_RSP: &str = "SH_END_RSP";
    pub const END_ALL_REQ: &str = "SH_END_ALL";
    pub const END_ALL_RSP: &str = "SH_END_ALL_RSP";
    pub const EXISTS_REQ: &str = "SH_EXISTS";
    pub const EXISTS_RSP: &str = "SH_EXISTS_RSP";
    pub const INFO_REQ: &str = "SH_INFO";
    pub const INFO_RSP: &str = "SH_INFO_RSP";
    pub const INFO_ALL_REQ: &str = "SH_INFO_ALL";
    pub const INFO_ALL_RSP: &str = "SH_INFO_ALL_RSP";
    pub const SAVE_REQ: &str = "SH_SAVE";
    pub const SAVE_RSP: &str = "SH_SAVE_RSP";
    pub const LOAD_REQ: &str = "SH_LOAD";
    pub const LOAD_RSP: &str = "SH_LOAD_RSP";
    //
    pub const SET_REQ: &str = "SH_SET";
    pub const SET_RSP: &str = "SH_SET_RSP";
    pub const ADD_REQ: &str = "SH_ADD";
    pub const ADD_RSP: &str = "SH_ADD_RSP";
    pub const GET_REQ: &str = "SH_GET";
    pub const GET_RSP: &str = "SH_GET_RSP";
    pub const RMV_REQ: &str = "SH_RMV";
    pub const RMV_RSP: &str = "SH_RMV_RSP";
    pub const COUNT_REQ: &str = "SH_COUNT";
    pub const COUNT_RSP: &str = "SH_COUNT_RSP";
    pub const CONTAINS_REQ: &str = "SH_CONTAINS";
    pub const CONTAINS_RSP: &str = "SH_CONTAINS_RSP";
    pub const CLEAR_REQ: &str = "SH_CLEAR";
    pub const CLEAR_RSP: &str = "SH_CLEAR_RSP";
    pub const CLEAR_SET_REQ: &str = "SH_CLEAR_SET";
    pub const CLEAR_SET_RSP: &str = "SH_CLEAR_SET_RSP";
    pub const KEYS_REQ: &str = "SH_KEYS";
    pub const KEYS_RSP: &str = "SH_KEYS_RSP";
}
