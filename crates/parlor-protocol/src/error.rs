//! Error types for the protocol layer.

/// Errors that can occur while encoding or decoding wire events.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, missing fields, or a
    /// shape that doesn't match any known event.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The event parsed but is invalid at the protocol level
    /// (e.g. an empty session id).
    #[error("invalid event: {0}")]
    InvalidEvent(String),
}
