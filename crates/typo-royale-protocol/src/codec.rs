//! Codec trait and implementations for serializing/deserializing events.
//!
//! A "codec" (coder/decoder) converts between Rust types and raw bytes.
//! The server doesn't care HOW events are serialized; it just needs
//! something that implements the [`Codec`] trait.
//!
//! Currently we provide [`JsonCodec`], which matches what browser
//! clients send over a WebSocket text frame.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` because one codec instance is shared by every
/// connection task for the lifetime of the server.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or
    /// don't match the expected type, and
    /// `ProtocolError::InvalidMessage` for an empty frame.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// This is behind the `json` feature flag (enabled by default).
///
/// ## Example
///
/// ```rust
/// use typo_royale_protocol::{ClientAction, Codec, JsonCodec, RoomId};
///
/// let codec = JsonCodec;
/// let action: ClientAction = codec
///     .decode(br#"{"event":"endGame","roomId":"R1"}"#)
///     .unwrap();
/// assert_eq!(action, ClientAction::EndGame { room_id: RoomId::from("R1") });
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        if data.iter().all(u8::is_ascii_whitespace) {
            return Err(ProtocolError::InvalidMessage("empty frame".into()));
        }
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{ClientAction, RoomId, ScoreEntry, ServerEvent, PlayerId};

    #[test]
    fn test_decode_empty_frame_is_invalid() {
        let result: Result<ClientAction, _> = JsonCodec.decode(b"  \n");
        assert!(matches!(result, Err(ProtocolError::InvalidMessage(_))));
    }

    #[test]
    fn test_decode_garbage_is_decode_error() {
        let result: Result<ClientAction, _> = JsonCodec.decode(b"not json");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_encode_server_event_is_valid_json() {
        let event = ServerEvent::GameOver(vec![ScoreEntry {
            id: PlayerId(1),
            name: "Alice".into(),
            score: 10.0,
        }]);
        let bytes = JsonCodec.encode(&event).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["event"], "gameOver");
        assert_eq!(value["data"][0]["name"], "Alice");
    }

    #[test]
    fn test_decode_client_action() {
        let action: ClientAction = JsonCodec
            .decode(br#"{"event":"createRoom","roomId":"lobby"}"#)
            .unwrap();
        assert_eq!(
            action,
            ClientAction::CreateRoom {
                room_id: RoomId::from("lobby")
            }
        );
    }
}
