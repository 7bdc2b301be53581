//! Per-connection handler: register, read actions, clean up.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Register an outbox with the hub and spawn the writer task
//!   2. Loop: receive frames → decode `ClientAction` → dispatch
//!   3. On close, error, or idle timeout: remove the player everywhere

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};
use typo_royale_protocol::{ClientAction, Codec, PlayerId};
use typo_royale_transport::{Connection, WebSocketConnection};

use crate::TypoRoyaleError;
use crate::hub::Frame;
use crate::server::ServerState;

/// Drop guard that removes a player from every room when the handler
/// exits.
///
/// This ensures cleanup happens even if the handler panics. Since `Drop`
/// is synchronous, we spawn a fire-and-forget task for the async lock.
struct DisconnectGuard<C: Codec> {
    player_id: PlayerId,
    state: Arc<ServerState<C>>,
}

impl<C: Codec> Drop for DisconnectGuard<C> {
    fn drop(&mut self) {
        let player_id = self.player_id;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            let mut game = state.game.lock().await;
            let effects = game.coordinator.disconnect(player_id);
            game.apply(effects, &state.codec);
            game.hub.unregister(player_id);
            debug!(%player_id, connections = game.hub.connection_count(), "player removed");
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), TypoRoyaleError> {
    let conn = Arc::new(conn);
    let player_id = PlayerId(conn.id().into_inner());
    info!(%player_id, peer = %conn.peer_addr(), "player connected");

    let (outbox, inbox) = mpsc::unbounded_channel();
    state.game.lock().await.hub.register(player_id, outbox);
    let _guard = DisconnectGuard {
        player_id,
        state: Arc::clone(&state),
    };

    let writer = tokio::spawn(write_frames(Arc::clone(&conn), inbox));
    let result = read_actions(&conn, &state, player_id).await;

    writer.abort();
    if let Err(e) = conn.close().await {
        debug!(%player_id, error = %e, "close after read loop failed");
    }
    info!(%player_id, "player disconnected");

    // _guard drops here → disconnect cleanup fires.
    result
}

/// Decodes and dispatches every inbound frame until the connection ends.
async fn read_actions<C: Codec>(
    conn: &WebSocketConnection,
    state: &ServerState<C>,
    player_id: PlayerId,
) -> Result<(), TypoRoyaleError> {
    loop {
        let received = match state.config.idle_timeout {
            Some(limit) => match tokio::time::timeout(limit, conn.recv()).await {
                Ok(received) => received,
                Err(_) => {
                    info!(%player_id, "connection idle, closing");
                    return Ok(());
                }
            },
            None => conn.recv().await,
        };

        let data = match received? {
            Some(data) => data,
            None => {
                debug!(%player_id, "connection closed cleanly");
                return Ok(());
            }
        };

        let action: ClientAction = match state.codec.decode(&data) {
            Ok(action) => action,
            Err(e) => {
                debug!(%player_id, error = %e, "undecodable frame ignored");
                continue;
            }
        };
        debug!(%player_id, action = action.name(), room_id = %action.room_id(), "action received");

        let mut game = state.game.lock().await;
        let effects = game.coordinator.dispatch(player_id, action);
        game.apply(effects, &state.codec);
    }
}

/// Forwards queued frames to the socket until the outbox is dropped.
async fn write_frames(conn: Arc<WebSocketConnection>, mut inbox: mpsc::UnboundedReceiver<Frame>) {
    while let Some(frame) = inbox.recv().await {
        if let Err(e) = conn.send(&frame).await {
            debug!(conn_id = %conn.id(), error = %e, "send failed, writer stopping");
            break;
        }
    }
}
