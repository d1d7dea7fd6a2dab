//! JSON codec for the trackpad wire protocol.
//!
//! Decoding is two-phase: the frame is first parsed into a generic JSON value
//! so the `type` discriminator can be checked on its own, and only then into
//! the typed enum.  This lets callers tell three failures apart:
//!
//! | Failure                       | Error                         | Router reaction        |
//! |-------------------------------|-------------------------------|------------------------|
//! | not JSON / known type, bad body | [`ProtocolError::Malformed`] | reply `error`          |
//! | no string `type` field        | [`ProtocolError::MissingType`] | warn and drop        |
//! | `type` not in the vocabulary  | [`ProtocolError::UnknownType`] | warn and drop        |

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::protocol::messages::{ClientMessage, ServerMessage};

const SERVER_TYPE_NAMES: &[&str] = &["connected", "appList", "presentationInfo", "error"];

/// Errors that can occur while encoding or decoding a frame.
#[derive(Debug, Error, PartialEq)]
pub enum ProtocolError {
    /// The frame is valid JSON but carries no string `type` field.
    #[error("message has no type discriminator")]
    MissingType,

    /// The `type` field names a message this side does not understand.
    #[error("unknown message type: {0}")]
    UnknownType(String),

    /// The frame is not JSON, or a known type has an invalid body.
    #[error("malformed message: {0}")]
    Malformed(String),

    /// Serialization failed.
    #[error("failed to encode message: {0}")]
    Encode(String),
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Serializes any protocol message into a JSON text frame.
///
/// # Errors
///
/// Returns [`ProtocolError::Encode`] if serialization fails.
///
/// # Examples
///
/// ```rust
/// use pad_core::protocol::{encode_message, decode_client_message};
/// use pad_core::protocol::messages::ClientMessage;
///
/// let text = encode_message(&ClientMessage::Click).unwrap();
/// assert_eq!(decode_client_message(&text).unwrap(), ClientMessage::Click);
/// ```
pub fn encode_message<T: Serialize>(msg: &T) -> Result<String, ProtocolError> {
    serde_json::to_string(msg).map_err(|e| ProtocolError::Encode(e.to_string()))
}

/// Parses a text frame into its `type` discriminator and raw JSON body.
///
/// # Errors
///
/// Returns [`ProtocolError::Malformed`] when the text is not JSON and
/// [`ProtocolError::MissingType`] when there is no string `type` field.
pub fn decode_envelope(text: &str) -> Result<(String, Value), ProtocolError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| ProtocolError::Malformed(e.to_string()))?;
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or(ProtocolError::MissingType)?
        .to_string();
    Ok((kind, value))
}

/// Decodes a frame sent by the touch client.
///
/// # Errors
///
/// See the table in the module documentation.
pub fn decode_client_message(text: &str) -> Result<ClientMessage, ProtocolError> {
    decode_typed(text, ClientMessage::TYPE_NAMES)
}

/// Decodes a frame sent by the server.
///
/// # Errors
///
/// See the table in the module documentation.
pub fn decode_server_message(text: &str) -> Result<ServerMessage, ProtocolError> {
    decode_typed(text, SERVER_TYPE_NAMES)
}

fn decode_typed<T>(text: &str, known: &[&str]) -> Result<T, ProtocolError>
where
    T: serde::de::DeserializeOwned,
{
    let (kind, value) = decode_envelope(text)?;
    if !known.contains(&kind.as_str()) {
        return Err(ProtocolError::UnknownType(kind));
    }
    serde_json::from_value(value).map_err(|e| ProtocolError::Malformed(e.to_string()))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_valid_move() {
        // Arrange
        let text = r#"{"type":"move","dx":2.5,"dy":-1}"#;

        // Act
        let msg = decode_client_message(text).unwrap();

        // Assert
        assert_eq!(msg, ClientMessage::Move { dx: 2.5, dy: -1.0 });
    }

    #[test]
    fn test_decode_not_json_is_malformed() {
        let result = decode_client_message("{not json");
        assert!(matches!(result, Err(ProtocolError::Malformed(_))));
    }

    #[test]
    fn test_decode_without_type_is_missing_type() {
        assert_eq!(
            decode_client_message(r#"{"dx":1}"#),
            Err(ProtocolError::MissingType)
        );
    }

    #[test]
    fn test_decode_numeric_type_is_missing_type() {
        assert_eq!(
            decode_client_message(r#"{"type":7}"#),
            Err(ProtocolError::MissingType)
        );
    }

    #[test]
    fn test_decode_unknown_type_reports_the_name() {
        assert_eq!(
            decode_client_message(r#"{"type":"teleport"}"#),
            Err(ProtocolError::UnknownType("teleport".to_string()))
        );
    }

    #[test]
    fn test_decode_known_type_with_bad_body_is_malformed() {
        // `text` must be a string.
        let result = decode_client_message(r#"{"type":"typeText","text":42}"#);
        assert!(matches!(result, Err(ProtocolError::Malformed(_))));
    }

    #[test]
    fn test_server_message_type_is_unknown_to_client_decoder() {
        let result = decode_client_message(r#"{"type":"appList","apps":[]}"#);
        assert_eq!(result, Err(ProtocolError::UnknownType("appList".to_string())));
    }

    #[test]
    fn test_decode_server_error_reply() {
        let msg = decode_server_message(r#"{"type":"error","message":"nope"}"#).unwrap();
        assert_eq!(
            msg,
            ServerMessage::Error {
                message: "nope".to_string()
            }
        );
    }

    #[test]
    fn test_envelope_returns_type_and_body() {
        let (kind, body) = decode_envelope(r#"{"type":"custom","n":1}"#).unwrap();
        assert_eq!(kind, "custom");
        assert_eq!(body["n"], 1);
    }

    #[test]
    fn test_encode_nan_delta_becomes_null() {
        let text = encode_message(&ClientMessage::Zoom { delta: f64::NAN }).unwrap();
        assert_eq!(text, r#"{"type":"zoom","delta":null}"#);
    }
}
