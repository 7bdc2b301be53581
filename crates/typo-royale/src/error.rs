//! Unified error type for the Typo Royale server.

use typo_royale_protocol::ProtocolError;
use typo_royale_room::RoomError;
use typo_royale_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant generates the `From` impls,
/// so `?` converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum TypoRoyaleError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level rejection.
    #[error(transparent)]
    Room(#[from] RoomError),

    /// Invalid server configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use typo_royale_protocol::RoomId;

    #[test]
    fn test_from_transport_error() {
        let top: TypoRoyaleError = TransportError::Stopped.into();
        assert!(matches!(top, TypoRoyaleError::Transport(_)));
        assert_eq!(top.to_string(), "transport stopped");
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidMessage("bad".into());
        let top: TypoRoyaleError = err.into();
        assert!(matches!(top, TypoRoyaleError::Protocol(_)));
    }

    #[test]
    fn test_from_room_error() {
        let err = RoomError::NotFound(RoomId::from("R1"));
        let top: TypoRoyaleError = err.into();
        assert!(matches!(top, TypoRoyaleError::Room(_)));
        assert_eq!(top.to_string(), "room R1 not found");
    }
}
