//! Room state and game rules for Typo Royale.
//!
//! Everything here is synchronous and free of I/O. The server holds one
//! [`Coordinator`] behind a lock, feeds it client actions, and carries
//! out the [`Effect`]s it returns.
//!
//! # Key types
//!
//! - [`Coordinator`]: applies client actions, returns effects
//! - [`Room`] / [`Player`]: one game session and its members
//! - [`RoundPhase`]: lobby, in-round, or finished, with one advance transition
//! - [`RoomStore`] / [`RoomRegistry`]: where rooms live
//! - [`SentenceProvider`] / [`SentenceCorpus`]: where prompts come from

mod config;
mod coordinator;
mod error;
mod registry;
mod room;
mod sentences;

pub use config::{Advance, CoordinatorConfig, RoundPhase};
pub use coordinator::{Coordinator, Effect};
pub use error::RoomError;
pub use registry::{RoomRegistry, RoomStore};
pub use room::{Player, Room};
pub use sentences::{DEFAULT_SENTENCES, SentenceCorpus, SentenceProvider};
