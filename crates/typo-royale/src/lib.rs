//! # Typo Royale
//!
//! Real-time multiplayer typing race server.
//!
//! Players connect over WebSocket, gather in named rooms, and race to
//! type the same sentence. The host starts a game of N rounds; each
//! player reports a score per round, and once everyone has reported the
//! server shows the scoreboard briefly, then deals the next sentence or
//! announces game over.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use typo_royale::prelude::*;
//!
//! # async fn start() -> Result<(), TypoRoyaleError> {
//! let server = TypoRoyaleServer::builder()
//!     .config(ServerConfig::from_env())
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod hub;
mod server;

pub use config::{DEFAULT_PORT, ServerConfig};
pub use error::TypoRoyaleError;
pub use server::{TypoRoyaleServer, TypoRoyaleServerBuilder};

/// Convenient re-exports for embedding the server or writing clients.
pub mod prelude {
    pub use crate::{ServerConfig, TypoRoyaleError, TypoRoyaleServer, TypoRoyaleServerBuilder};
    pub use typo_royale_protocol::{
        ClientAction, Codec, JsonCodec, LooseNumber, PlayerId, RoomId, RoundInfo, ScoreEntry,
        ServerEvent,
    };
}
