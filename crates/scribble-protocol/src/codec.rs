//! Codec trait and implementations for serializing/deserializing messages.
//!
//! The room layer serializes each outbound message exactly once and hands
//! the resulting text to every recipient, so the codec works on `String`
//! rather than on per-connection frames.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode Rust types to text and decode text back.
///
/// `Send + Sync + 'static` because a codec lives inside long-running room
/// actors and connection tasks that Tokio may move between threads.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into a text payload.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError>;

    /// Deserializes a text payload back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the payload is malformed or
    /// doesn't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &str) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// ## Example
///
/// ```rust
/// use scribble_protocol::{Codec, JsonCodec, ServerMessage};
///
/// let codec = JsonCodec;
/// let text = codec.encode(&ServerMessage::Timer { time: 42 }).unwrap();
/// assert_eq!(text, r#"{"type":"timer","time":42}"#);
///
/// let decoded: ServerMessage = codec.decode(&text).unwrap();
/// assert_eq!(decoded, ServerMessage::Timer { time: 42 });
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError> {
        serde_json::to_string(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &str) -> Result<T, ProtocolError> {
        serde_json::from_str(data).map_err(ProtocolError::Decode)
    }
}
