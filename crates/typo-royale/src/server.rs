//! `TypoRoyaleServer` builder and server loop.
//!
//! This is the entry point for running a Typo Royale server. It ties
//! together all the layers: transport → protocol → coordinator → hub.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, mpsc};
use tracing::{debug, error, info, trace};
use typo_royale_protocol::{Codec, JsonCodec, RoomId};
use typo_royale_room::{Coordinator, CoordinatorConfig, Effect, RoomRegistry, SentenceCorpus};
use typo_royale_timer::{Fired, RoundTimers};
use typo_royale_transport::{Transport, WebSocketTransport};

use crate::config::ServerConfig;
use crate::handler::handle_connection;
use crate::hub::{Frame, Hub};
use crate::TypoRoyaleError;

/// Timer key for a delayed round advance.
pub(crate) type AdvanceKey = (RoomId, u32);

/// Everything a game action touches, behind one lock.
///
/// Handlers and the timer task hold the lock for the whole of
/// dispatch-then-apply, so effects from different actions never
/// interleave.
pub(crate) struct Game {
    pub(crate) coordinator: Coordinator,
    pub(crate) timers: RoundTimers<AdvanceKey>,
    pub(crate) hub: Hub,
}

impl Game {
    /// Carries out coordinator effects in order.
    pub(crate) fn apply(&mut self, effects: Vec<Effect>, codec: &impl Codec) {
        for effect in effects {
            match effect {
                Effect::Broadcast { room_id, event } => match codec.encode(&event) {
                    Ok(bytes) => {
                        let frame: Frame = bytes.into();
                        let delivered = self.hub.broadcast(&room_id, &frame);
                        trace!(%room_id, event = event.name(), delivered, "broadcast");
                    }
                    Err(e) => {
                        error!(%room_id, event = event.name(), error = %e, "failed to encode event");
                    }
                },
                Effect::Subscribe { room_id, player_id } => {
                    self.hub.subscribe(room_id, player_id);
                }
                Effect::Unsubscribe { room_id, player_id } => {
                    self.hub.unsubscribe(&room_id, player_id);
                }
                Effect::ScheduleAdvance {
                    room_id,
                    round,
                    delay,
                } => {
                    self.timers.schedule((room_id, round), delay);
                    trace!(pending = self.timers.len(), "round advance scheduled");
                }
                Effect::CancelAdvance { room_id } => {
                    let cancelled = self.timers.cancel_where(|(room, _)| *room == room_id);
                    if cancelled > 0 {
                        trace!(%room_id, cancelled, "round advance cancelled");
                    }
                }
            }
        }
    }
}

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) game: Mutex<Game>,
    pub(crate) codec: C,
    pub(crate) config: ServerConfig,
}

/// Builder for configuring and starting a Typo Royale server.
///
/// # Example
///
/// ```rust,ignore
/// use typo_royale::prelude::*;
///
/// let server = TypoRoyaleServer::builder()
///     .bind("0.0.0.0:3000")
///     .build()
///     .await?;
/// server.run().await
/// ```
pub struct TypoRoyaleServerBuilder {
    config: ServerConfig,
    sentences: Option<Vec<String>>,
}

impl TypoRoyaleServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
            sentences: None,
        }
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    pub fn round_advance_delay(mut self, delay: Duration) -> Self {
        self.config.round_advance_delay = delay;
        self
    }

    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.idle_timeout = Some(timeout);
        self
    }

    /// Replaces the built-in typing prompts.
    pub fn sentences<I, S>(mut self, sentences: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sentences = Some(sentences.into_iter().map(Into::into).collect());
        self
    }

    /// Binds the listener and assembles the server.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`.
    pub async fn build(self) -> Result<TypoRoyaleServer<JsonCodec>, TypoRoyaleError> {
        let corpus = match self.sentences {
            Some(sentences) => SentenceCorpus::new(sentences)
                .ok_or_else(|| TypoRoyaleError::Config("sentence list is empty".into()))?,
            None => SentenceCorpus::default(),
        };

        let transport = WebSocketTransport::bind(&self.config.bind_addr)
            .await?
            .with_ready_message(&self.config.ready_message);

        let coordinator = Coordinator::with_parts(
            RoomRegistry::new(),
            corpus,
            CoordinatorConfig {
                round_advance_delay: self.config.round_advance_delay,
            },
        );
        let (timers, fired_rx) = RoundTimers::new();

        let state = Arc::new(ServerState {
            game: Mutex::new(Game {
                coordinator,
                timers,
                hub: Hub::new(),
            }),
            codec: JsonCodec,
            config: self.config,
        });

        Ok(TypoRoyaleServer {
            transport,
            state,
            fired_rx,
        })
    }
}

impl Default for TypoRoyaleServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A Typo Royale server, bound and ready to run.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct TypoRoyaleServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
    fired_rx: mpsc::UnboundedReceiver<Fired<AdvanceKey>>,
}

impl TypoRoyaleServer<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> TypoRoyaleServerBuilder {
        TypoRoyaleServerBuilder::new()
    }
}

impl<C> TypoRoyaleServer<C>
where
    C: Codec,
{
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, TypoRoyaleError> {
        Ok(self.transport.local_addr()?)
    }

    /// Runs the server.
    ///
    /// Spawns the round-advance task, then accepts connections and spawns
    /// a handler task for each. Returns only if the transport stops.
    pub async fn run(mut self) -> Result<(), TypoRoyaleError> {
        info!(addr = %self.local_addr()?, "Typo Royale server running");

        tokio::spawn(run_advances(Arc::clone(&self.state), self.fired_rx));

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    error!(error = %e, "transport stopped accepting");
                    return Err(e.into());
                }
            }
        }
    }
}

/// Drains timer notices and runs each due round advance.
async fn run_advances<C: Codec>(
    state: Arc<ServerState<C>>,
    mut fired_rx: mpsc::UnboundedReceiver<Fired<AdvanceKey>>,
) {
    while let Some(fired) = fired_rx.recv().await {
        let mut game = state.game.lock().await;
        let Some((room_id, round)) = game.timers.claim(fired) else {
            continue;
        };
        match game.coordinator.advance_due(&room_id, round) {
            Ok(effects) => game.apply(effects, &state.codec),
            Err(e) => debug!(%room_id, round, reason = %e, "round advance skipped"),
        }
    }
}
