//! Coordinator configuration and the round state machine.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CoordinatorConfig
// ---------------------------------------------------------------------------

/// Tunables for the session coordinator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// How long a settled scoreboard stays on screen before the round
    /// advances automatically after the last submission.
    pub round_advance_delay: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            round_advance_delay: Duration::from_secs(3),
        }
    }
}

// ---------------------------------------------------------------------------
// RoundPhase
// ---------------------------------------------------------------------------

/// Where a room is in its game.
///
/// ```text
///            start_game            advance (round < total)
///   Lobby ──────────────→ InRound ──────────────────────→ InRound
///                           │  ↑
///                           │  └──────── start_game (restart) ───┐
///                           │ advance (round == total)           │
///                           ▼                                    │
///                        Finished ───────────────────────────────┘
/// ```
///
/// - **Lobby**: no game has started; `round` reads as 0.
/// - **InRound**: a game is running at `round` of `total_rounds`.
/// - **Finished**: the last round completed; `round` reads as
///   `total_rounds`. Advancing again re-announces game over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    #[default]
    Lobby,
    InRound { round: u32, total_rounds: u32 },
    Finished { total_rounds: u32 },
}

/// The outcome of [`RoundPhase::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// A new round began.
    NextRound { round: u32, total_rounds: u32 },
    /// The game is over, or never started.
    GameOver,
}

impl RoundPhase {
    /// The phase right after a game starts.
    ///
    /// `total_rounds` is clamped to at least 1.
    pub fn started(total_rounds: u32) -> Self {
        Self::InRound {
            round: 1,
            total_rounds: total_rounds.max(1),
        }
    }

    /// Current round number: 0 in the lobby, otherwise 1-based.
    pub fn round(&self) -> u32 {
        match self {
            Self::Lobby => 0,
            Self::InRound { round, .. } => *round,
            Self::Finished { total_rounds } => *total_rounds,
        }
    }

    /// Rounds in the current (or last) game; 1 before any game.
    pub fn total_rounds(&self) -> u32 {
        match self {
            Self::Lobby => 1,
            Self::InRound { total_rounds, .. }
            | Self::Finished { total_rounds } => *total_rounds,
        }
    }

    /// Returns `true` while a round is being played.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::InRound { .. })
    }

    /// The single round-advance transition.
    ///
    /// Moves to the next round while rounds remain, otherwise to
    /// `Finished`. `round` never exceeds `total_rounds`. In the lobby
    /// there is no round to move on to, so the outcome is game over and
    /// the phase stays put.
    pub fn advance(self) -> (Self, Advance) {
        match self {
            Self::Lobby => (Self::Lobby, Advance::GameOver),
            Self::InRound {
                round,
                total_rounds,
            } if round < total_rounds => {
                let next = round + 1;
                (
                    Self::InRound {
                        round: next,
                        total_rounds,
                    },
                    Advance::NextRound {
                        round: next,
                        total_rounds,
                    },
                )
            }
            Self::InRound { total_rounds, .. }
            | Self::Finished { total_rounds } => {
                (Self::Finished { total_rounds }, Advance::GameOver)
            }
        }
    }
}

impl fmt::Display for RoundPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lobby => write!(f, "Lobby"),
            Self::InRound {
                round,
                total_rounds,
            } => write!(f, "InRound({round}/{total_rounds})"),
            Self::Finished { total_rounds } => {
                write!(f, "Finished({total_rounds}/{total_rounds})")
            }
        }
    }
}
