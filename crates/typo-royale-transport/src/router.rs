//! HTTP routes on the game port.
//!
//! `GET /` serves two kinds of client. A browser asking for a WebSocket
//! upgrade gets one, and the upgraded socket is handed to the transport's
//! accept queue. Anything else asking for `/` (uptime checks, load
//! balancers) gets the plain-text readiness message. Other paths fall
//! through to axum's 404.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::Router;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{WebSocket, WebSocketUpgrade};
use axum::extract::{ConnectInfo, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tokio::sync::mpsc;

use crate::ConnectionId;
use crate::websocket::WebSocketConnection;

/// The default readiness body.
pub const DEFAULT_READY_MESSAGE: &str = "Typo Royale backend running";

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Clone)]
pub(crate) struct RouterState {
    pub(crate) ready_message: Arc<str>,
    pub(crate) upgraded: mpsc::UnboundedSender<WebSocketConnection>,
}

pub(crate) fn router(state: RouterState) -> Router {
    Router::new().route("/", get(root)).with_state(state)
}

async fn root(
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
    ConnectInfo(peer_addr): ConnectInfo<SocketAddr>,
    State(state): State<RouterState>,
) -> Response {
    match upgrade {
        Ok(ws) => ws.on_upgrade(move |socket| hand_off(socket, peer_addr, state.upgraded)),
        Err(_) => state.ready_message.to_string().into_response(),
    }
}

/// Wraps an upgraded socket and queues it for `accept`.
async fn hand_off(
    socket: WebSocket,
    peer_addr: SocketAddr,
    upgraded: mpsc::UnboundedSender<WebSocketConnection>,
) {
    let id = ConnectionId::new(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed));
    tracing::debug!(%id, %peer_addr, "accepted WebSocket connection");
    if upgraded
        .send(WebSocketConnection::new(id, peer_addr, socket))
        .is_err()
    {
        tracing::debug!(%id, "transport gone, dropping connection");
    }
}
