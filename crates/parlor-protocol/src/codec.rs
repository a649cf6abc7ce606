//! Codec trait and implementations for serializing wire events.
//!
//! A codec converts between Rust types and raw bytes. The rest of the
//! stack doesn't care how events are serialized — it only needs
//! something that implements [`Codec`]. Browser clients speak JSON, so
//! [`JsonCodec`] is the default; a compact binary codec could be swapped
//! in later without touching any other layer.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// Encodes Rust types to bytes and decodes bytes back.
///
/// `Send + Sync + 'static` because the codec is shared across the
/// per-connection handler tasks Tokio spawns.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Encode`] if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Decode`] if the bytes are malformed or
    /// don't match the expected shape.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// A [`Codec`] backed by `serde_json`.
///
/// JSON keeps the wire human-readable: events can be inspected in the
/// browser's DevTools network tab, which is where most debugging of a
/// web game happens.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ClientEvent, SessionId};

    #[test]
    fn test_json_codec_round_trips_client_event() {
        let codec = JsonCodec;
        let event = ClientEvent::Join {
            session_id: SessionId::from("r1"),
            display_name: "alice".into(),
            ai_opponent: false,
            ai_difficulty: Default::default(),
        };
        let bytes = codec.encode(&event).unwrap();
        let decoded: ClientEvent = codec.decode(&bytes).unwrap();
        assert_eq!(event, decoded);
    }

    #[test]
    fn test_json_codec_decode_garbage_returns_error() {
        let codec = JsonCodec;
        let result: Result<ClientEvent, _> = codec.decode(b"not json at all");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }
}
