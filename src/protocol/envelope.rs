//! Request envelope building and response unwrapping.
//!
//! Requests are single-key JSON objects, `{"KV_SET": { ... }}`;
//! responses mirror them with the `_RSP` name and an `st` status in the
//! body, `{"KV_SET_RSP": {"st": 1}}`.

// ============================================================================
// Imports
// ============================================================================

use serde_json::{Map, Value, json};

use crate::error::{Error, Result};
use crate::transport::Frame;

use super::commands::fields;

// ============================================================================
// Request
// ============================================================================

/// Wraps a command body in the single-key request envelope.
#[must_use]
pub fn request(name: &str, body: Value) -> Value {
    json!({ name: body })
}

/// Serializes a request envelope into a text frame.
///
/// # Errors
///
/// Returns [`Error::Json`] if the body cannot be serialized.
pub fn request_frame(name: &str, body: Value) -> Result<Frame> {
    Ok(Frame::Text(serde_json::to_string(&request(name, body))?))
}

// ============================================================================
// Response
// ============================================================================

/// A parsed response envelope.
///
/// Wraps the raw JSON and knows how to unwrap the named response body
/// and its `st` status.
#[derive(Debug, Clone)]
pub struct Response {
    raw: Value,
}

impl Response {
    /// Parses a response from an inbound frame.
    ///
    /// # Errors
    ///
    /// - [`Error::Protocol`] if the frame is binary (the JSON command
    ///   protocol is text-only)
    /// - [`Error::Json`] if the text is not valid JSON
    pub fn parse(frame: Frame) -> Result<Self> {
        match frame {
            Frame::Text(text) => Ok(Self {
                raw: serde_json::from_str(&text)?,
            }),
            Frame::Binary(_) => Err(Error::protocol("expected a text frame")),
        }
    }

    /// Wraps an already-parsed value.
    #[must_use]
    pub fn from_value(raw: Value) -> Self {
        Self { raw }
    }

    /// Returns the response body under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] if the key is missing or not an
    /// object.
    pub fn body(&self, name: &str) -> Result<&Map<String, Value>> {
        self.raw
            .get(name)
            .and_then(Value::as_object)
            .ok_or_else(|| Error::protocol(format!("response missing {name} body")))
    }

    /// Returns the `st` value of the named body, or 0 when absent.
    #[must_use]
    pub fn status(&self, name: &str) -> i64 {
        self.raw
            .get(name)
            .and_then(|body| body.get(fields::STATUS))
            .and_then(Value::as_i64)
            .unwrap_or(0)
    }

    /// Unwraps the named body, requiring the expected status.
    ///
    /// # Errors
    ///
    /// - [`Error::ResponseStatus`] if `st` differs from `expected`
    /// - [`Error::Protocol`] if the body is missing
    pub fn into_body(self, name: &str, expected: i64) -> Result<Map<String, Value>> {
        let status = self.status(name);
        if status != expected {
            return Err(Error::response_status(name, status));
        }

        match self.raw {
            Value::Object(mut top) => match top.remove(name) {
                Some(Value::Object(body)) => Ok(body),
                _ => Err(Error::protocol(format!("response missing {name} body"))),
            },
            _ => Err(Error::protocol("response is not an object")),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::protocol::commands::{kv, status};

    #[test]
    fn test_request_envelope() {
        let req = request(kv::GET_REQ, json!({"keys": ["a", "b"]}));
        assert_eq!(req, json!({"KV_GET": {"keys": ["a", "b"]}}));
    }

    #[test]
    fn test_request_frame_is_text() {
        let frame = request_frame(kv::COUNT_REQ, json!({})).expect("serialize");
        let text = frame.as_text().expect("text frame");
        assert_eq!(text, r#"{"KV_COUNT":{}}"#);
    }

    #[test]
    fn test_parse_and_unwrap() {
        let frame = Frame::text(r#"{"KV_SET_RSP":{"st":1}}"#);
        let rsp = Response::parse(frame).expect("parse");

        assert_eq!(rsp.status(kv::SET_RSP), 1);
        let body = rsp.into_body(kv::SET_RSP, status::SUCCESS).expect("body");
        assert_eq!(body.get("st"), Some(&json!(1)));
    }

    #[test]
    fn test_unexpected_status() {
        let rsp = Response::from_value(json!({"KV_SAVE_RSP": {"st": 123}}));
        let err = rsp
            .into_body(kv::SAVE_RSP, status::SAVE_COMPLETE)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::ResponseStatus { status: 123, .. }
        ));
    }

    #[test]
    fn test_missing_body_is_protocol_error() {
        let rsp = Response::from_value(json!({"KV_GET_RSP": {"st": 1}}));
        assert!(rsp.body(kv::SET_RSP).is_err());

        let rsp = Response::from_value(json!({"KV_SET_RSP": 5}));
        let err = rsp.into_body(kv::SET_RSP, status::SUCCESS).unwrap_err();
        assert!(matches!(err, Error::ResponseStatus { status: 0, .. }));
    }

    #[test]
    fn test_binary_frame_rejected() {
        let err = Response::parse(Frame::binary(vec![1u8, 2])).unwrap_err();
        assert!(matches!(err, Error::Protocol { .. }));
    }

    #[test]
    fn test_malformed_json_rejected() {
        let err = Response::parse(Frame::text("{not json")).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }
}
