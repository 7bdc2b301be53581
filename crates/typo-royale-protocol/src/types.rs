//! Core protocol types for Typo Royale's wire format.
//!
//! Every type here travels "on the wire": browser clients send a
//! [`ClientAction`], the server answers with [`ServerEvent`] broadcasts.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::LooseNumber;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// The identity of one connection.
///
/// A player *is* a connection: the id is assigned by the transport when
/// the socket is accepted and stays stable until it closes. There is no
/// login, so a reconnecting browser gets a fresh `PlayerId`.
///
/// `#[serde(transparent)]` serializes `PlayerId(42)` as just `42`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A room identifier, chosen by whoever creates or joins the room first.
///
/// Opaque to the server: any string is accepted, but the empty string
/// means "not provided" and every action carrying it is ignored.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl RoomId {
    /// Returns the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the client sent no usable id.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for RoomId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RoomId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Payload building blocks
// ---------------------------------------------------------------------------

/// One line of a roster or scoreboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub id: PlayerId,
    pub name: String,
    pub score: f64,
}

/// The prompt and position of a round, sent when a round begins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundInfo {
    /// The sentence every player must type this round.
    pub sentence: String,
    /// 1-based round number.
    pub round: u32,
    /// Total rounds in this game.
    pub total: u32,
}

// ---------------------------------------------------------------------------
// ClientAction (inbound)
// ---------------------------------------------------------------------------

/// An action sent by a client.
///
/// Internally tagged by `"event"`, with camelCase names and fields:
///
/// ```json
/// { "event": "joinRoom", "roomId": "R1", "name": "Alice" }
/// { "event": "submitScore", "roomId": "R1", "score": 42 }
/// ```
///
/// String fields default to empty when missing so a sloppy frame still
/// decodes; the coordinator then ignores it. Numeric fields are
/// [`LooseNumber`]s for the same reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ClientAction {
    /// Create a room (or take over as host of an existing one).
    CreateRoom {
        #[serde(default)]
        room_id: RoomId,
    },

    /// Join a room under a display name, creating it if unseen.
    JoinRoom {
        #[serde(default)]
        room_id: RoomId,
        #[serde(default)]
        name: String,
    },

    /// Start (or restart) the game. Host only, when a host is set.
    StartGame {
        #[serde(default)]
        room_id: RoomId,
        #[serde(default)]
        total_rounds: LooseNumber,
    },

    /// Report the score earned for the current round.
    SubmitScore {
        #[serde(default)]
        room_id: RoomId,
        #[serde(default)]
        score: LooseNumber,
    },

    /// Signal readiness to move on to the next round.
    ReadyForNextRound {
        #[serde(default)]
        room_id: RoomId,
    },

    /// Force the game to end and publish the current scoreboard.
    EndGame {
        #[serde(default)]
        room_id: RoomId,
    },

    /// Leave the room without closing the connection.
    LeaveRoom {
        #[serde(default)]
        room_id: RoomId,
    },
}

impl ClientAction {
    /// The wire name of this action, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateRoom { .. } => "createRoom",
            Self::JoinRoom { .. } => "joinRoom",
            Self::StartGame { .. } => "startGame",
            Self::SubmitScore { .. } => "submitScore",
            Self::ReadyForNextRound { .. } => "readyForNextRound",
            Self::EndGame { .. } => "endGame",
            Self::LeaveRoom { .. } => "leaveRoom",
        }
    }

    /// The room this action targets.
    pub fn room_id(&self) -> &RoomId {
        match self {
            Self::CreateRoom { room_id }
            | Self::JoinRoom { room_id, .. }
            | Self::StartGame { room_id, .. }
            | Self::SubmitScore { room_id, .. }
            | Self::ReadyForNextRound { room_id }
            | Self::EndGame { room_id }
            | Self::LeaveRoom { room_id } => room_id,
        }
    }
}

// ---------------------------------------------------------------------------
// ServerEvent (outbound)
// ---------------------------------------------------------------------------

/// An event broadcast by the server to every member of a room.
///
/// Adjacently tagged so every frame has the same two keys:
///
/// ```json
/// { "event": "roomUpdate", "data": [{ "id": 1, "name": "Alice", "score": 0.0 }] }
/// { "event": "gameStarted", "data": { "sentence": "...", "round": 1, "total": 3 } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    /// The roster changed (join, leave, or a readiness tick).
    RoomUpdate(Vec<ScoreEntry>),
    /// A game began; carries the first prompt.
    GameStarted(RoundInfo),
    /// Scores changed.
    ScoreUpdate(Vec<ScoreEntry>),
    /// The next round began; carries its prompt.
    NextRound(RoundInfo),
    /// The game ended; carries the final scoreboard.
    GameOver(Vec<ScoreEntry>),
}

impl ServerEvent {
    /// The wire name of this event, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RoomUpdate(_) => "roomUpdate",
            Self::GameStarted(_) => "gameStarted",
            Self::ScoreUpdate(_) => "scoreUpdate",
            Self::NextRound(_) => "nextRound",
            Self::GameOver(_) => "gameOver",
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
