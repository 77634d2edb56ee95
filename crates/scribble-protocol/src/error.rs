//! Error types for the protocol layer.
//!
//! Each crate in Scribble defines its own error enum, so a
//! `ProtocolError` always means the problem is in turning messages into
//! text or back, never in networking or room management.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into text).
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// Deserialization failed (turning text into a Rust type).
    ///
    /// Common causes: malformed JSON, an unknown `type` tag, missing
    /// required fields, or wrong field types.
    #[error("decode failed: {0}")]
    Decode(#[source] serde_json::Error),

    /// The message parsed but is not valid at this point of the protocol,
    /// e.g. anything other than `join` as the first frame.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
