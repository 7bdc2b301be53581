//! Error types for the protocol layer.
//!
//! Each crate in Typo Royale defines its own error enum. When you see a
//! `ProtocolError`, you know the problem is in turning events into bytes
//! (or back), not in networking or room bookkeeping.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning an event into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into an event).
    ///
    /// Common causes: malformed JSON, an unknown `"event"` name, or a
    /// payload field with the wrong shape (e.g. `roomId` given as an
    /// object).
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The frame parsed but is not acceptable at the protocol level,
    /// e.g. it is empty.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
