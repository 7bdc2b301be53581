//! Error types for the room layer.
//!
//! None of these ever reach a client. The coordinator uses them to say
//! *why* an action was a no-op, logs that reason, and drops the action.

use typo_royale_protocol::{PlayerId, RoomId};

/// Reasons a room action had no effect.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    /// The action carried no room id.
    #[error("missing room id")]
    MissingRoomId,

    /// `joinRoom` carried no display name.
    #[error("missing player name")]
    MissingName,

    /// The room does not exist (never created, or already deleted).
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// The sender is not a player in this room.
    #[error("player {0} not in room {1}")]
    NotInRoom(PlayerId, RoomId),

    /// Someone other than the host tried to start the game.
    #[error("player {player} is not the host of room {room}")]
    NotHost { player: PlayerId, room: RoomId },

    /// A delayed round-advance fired for a round the room has already
    /// left (restarted, advanced by readiness, or force-ended).
    #[error("stale round-advance for room {room} round {round}")]
    StaleAdvance { room: RoomId, round: u32 },
}
