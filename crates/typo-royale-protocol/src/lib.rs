//! Wire protocol for Typo Royale.
//!
//! This crate defines the "language" that typing clients and the server
//! speak:
//!
//! - **Identities** ([`PlayerId`], [`RoomId`]): who is talking and where.
//! - **Events** ([`ClientAction`], [`ServerEvent`]): the named, structured
//!   messages that travel on the wire in each direction.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those events are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]): what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw bytes) and the room
//! core (game rules). It doesn't know about sockets or rooms; it only
//! knows how to serialize and deserialize events.
//!
//! ```text
//! Transport (bytes) → Protocol (ClientAction) → Room core (Coordinator)
//! Room core (ServerEvent) → Protocol (bytes) → Transport
//! ```

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

mod codec;
mod error;
mod number;
mod types;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use number::LooseNumber;
pub use types::{
    ClientAction, PlayerId, RoomId, RoundInfo, ScoreEntry, ServerEvent,
};
