//! Network edge of Typo Royale.
//!
//! The server only sees the two traits defined here: a [`Transport`] that
//! hands out player connections and a [`Connection`] that moves opaque
//! frames. Everything HTTP-shaped (the upgrade handshake, the plain-text
//! readiness reply, 404s) stays behind them.
//!
//! # Feature Flags
//!
//! - `websocket` (default): [`WebSocketTransport`], an `axum` server that
//!   answers `GET /` with either a WebSocket upgrade or the readiness text

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod router;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use router::DEFAULT_READY_MESSAGE;
#[cfg(feature = "websocket")]
pub use websocket::{WebSocketConnection, WebSocketTransport};

use std::fmt;
use std::net::SocketAddr;

/// Process-unique number assigned to a connection when it is upgraded.
///
/// The server reuses it as the player's identity, so ids are never
/// recycled while the process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Source of player connections.
pub trait Transport: Send + Sync + 'static {
    type Connection: Connection;
    type Error: std::error::Error + Send + Sync;

    /// Resolves with the next upgraded connection.
    ///
    /// Cancel-safe: dropping the future loses no connection.
    async fn accept(&mut self) -> Result<Self::Connection, Self::Error>;

    fn local_addr(&self) -> Result<SocketAddr, Self::Error>;
}

/// One player's frame pipe.
///
/// Every method takes `&self`; a reader task and a writer task share the
/// connection behind an `Arc`.
pub trait Connection: Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync;

    /// Queues one frame for the peer.
    async fn send(&self, data: &[u8]) -> Result<(), Self::Error>;

    /// Waits for the peer's next frame. `Ok(None)` once the peer has
    /// closed cleanly.
    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error>;

    async fn close(&self) -> Result<(), Self::Error>;

    fn id(&self) -> ConnectionId;

    fn peer_addr(&self) -> SocketAddr;
}
