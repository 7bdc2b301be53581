//! WebSocket transport served by `axum`.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;

use crate::router::{DEFAULT_READY_MESSAGE, RouterState, router};
use crate::{Connection, ConnectionId, Transport, TransportError};

/// A WebSocket [`Transport`] listening on one TCP port.
///
/// The HTTP server starts on the first [`accept`](Transport::accept) and
/// runs as its own task, so every client is handshaken concurrently and a
/// slow or silent socket never holds up the others. Upgraded sockets queue
/// until `accept` takes them.
pub struct WebSocketTransport {
    local_addr: SocketAddr,
    ready_message: Arc<str>,
    /// Listener and queue sender, until the server task takes them.
    unstarted: Option<(TcpListener, mpsc::UnboundedSender<WebSocketConnection>)>,
    upgraded: mpsc::UnboundedReceiver<WebSocketConnection>,
    server: Option<JoinHandle<()>>,
}

impl WebSocketTransport {
    /// Binds a new WebSocket transport to the given address.
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::AcceptFailed)?;
        let local_addr = listener.local_addr().map_err(TransportError::AcceptFailed)?;
        tracing::info!(%local_addr, "WebSocket transport listening");

        let (tx, rx) = mpsc::unbounded_channel();
        Ok(Self {
            local_addr,
            ready_message: Arc::from(DEFAULT_READY_MESSAGE),
            unstarted: Some((listener, tx)),
            upgraded: rx,
            server: None,
        })
    }

    /// Sets the body returned for a plain `GET /`.
    pub fn with_ready_message(mut self, message: &str) -> Self {
        self.ready_message = Arc::from(message);
        self
    }

    fn start(&mut self) {
        let Some((listener, upgraded)) = self.unstarted.take() else {
            return;
        };
        let app = router(RouterState {
            ready_message: Arc::clone(&self.ready_message),
            upgraded,
        });
        let local_addr = self.local_addr;
        self.server = Some(tokio::spawn(async move {
            let service = app.into_make_service_with_connect_info::<SocketAddr>();
            if let Err(e) = axum::serve(listener, service).await {
                tracing::error!(%local_addr, error = %e, "HTTP server stopped");
            }
        }));
    }
}

impl Transport for WebSocketTransport {
    type Connection = WebSocketConnection;
    type Error = TransportError;

    async fn accept(&mut self) -> Result<Self::Connection, Self::Error> {
        self.start();
        self.upgraded.recv().await.ok_or(TransportError::Stopped)
    }

    fn local_addr(&self) -> Result<SocketAddr, Self::Error> {
        Ok(self.local_addr)
    }
}

impl Drop for WebSocketTransport {
    fn drop(&mut self) {
        if let Some(server) = self.server.take() {
            server.abort();
        }
    }
}

/// A single WebSocket connection.
///
/// The read and write halves are locked separately, so one task can wait
/// in [`recv`](Connection::recv) while another sends.
pub struct WebSocketConnection {
    id: ConnectionId,
    peer_addr: SocketAddr,
    sink: Mutex<SplitSink<WebSocket, Message>>,
    stream: Mutex<SplitStream<WebSocket>>,
}

impl WebSocketConnection {
    pub(crate) fn new(id: ConnectionId, peer_addr: SocketAddr, socket: WebSocket) -> Self {
        let (sink, stream) = socket.split();
        Self {
            id,
            peer_addr,
            sink: Mutex::new(sink),
            stream: Mutex::new(stream),
        }
    }
}

fn broken_pipe(e: axum::Error) -> TransportError {
    TransportError::SendFailed(io::Error::new(io::ErrorKind::BrokenPipe, e))
}

impl Connection for WebSocketConnection {
    type Error = TransportError;

    /// UTF-8 payloads go out as text frames, anything else as binary.
    async fn send(&self, data: &[u8]) -> Result<(), Self::Error> {
        let msg = match std::str::from_utf8(data) {
            Ok(text) => Message::Text(text.to_owned().into()),
            Err(_) => Message::Binary(data.to_vec().into()),
        };
        self.sink.lock().await.send(msg).await.map_err(broken_pipe)
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error> {
        let mut stream = self.stream.lock().await;
        loop {
            match stream.next().await {
                Some(Ok(Message::Binary(data))) => return Ok(Some(data.to_vec())),
                Some(Ok(Message::Text(text))) => {
                    return Ok(Some(text.as_str().as_bytes().to_vec()));
                }
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Ok(_)) => continue, // ping/pong
                Some(Err(e)) => {
                    return Err(TransportError::ReceiveFailed(io::Error::new(
                        io::ErrorKind::ConnectionReset,
                        e,
                    )));
                }
            }
        }
    }

    async fn close(&self) -> Result<(), Self::Error> {
        self.sink.lock().await.close().await.map_err(broken_pipe)
    }

    fn id(&self) -> ConnectionId {
        self.id
    }

    fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }
}
