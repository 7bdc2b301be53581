//! Integration tests for the WebSocket transport.
//!
//! These tests spin up a real listener on an OS-assigned port and talk
//! to it with a `tokio-tungstenite` client or a raw TCP socket.

#[cfg(feature = "websocket")]
mod websocket {
    use std::time::Duration;

    use futures_util::{SinkExt, StreamExt};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio_tungstenite::tungstenite::Message;
    use typo_royale_transport::{
        Connection, DEFAULT_READY_MESSAGE, Transport, WebSocketConnection,
        WebSocketTransport,
    };

    type ClientWs = tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<TcpStream>,
    >;

    /// Binds a transport on port 0 and returns it with its address.
    async fn bind() -> (WebSocketTransport, String) {
        let transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport.local_addr().expect("bound address").to_string();
        (transport, addr)
    }

    /// Connects a client and returns both ends.
    async fn connect_pair(
        mut transport: WebSocketTransport,
        addr: &str,
    ) -> (WebSocketTransport, WebSocketConnection, ClientWs) {
        let accept = tokio::spawn(async move {
            let conn = transport.accept().await.expect("should accept");
            (transport, conn)
        });
        let (client, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
            .await
            .expect("client should connect");
        let (transport, conn) = accept.await.expect("task should complete");
        (transport, conn, client)
    }

    /// Plain `GET` of `path` that asks the server to close afterwards.
    fn get(path: &str) -> String {
        format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
    }

    /// Sends a raw HTTP request and returns the full response text.
    async fn http_request(addr: &str, request: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.expect("tcp connect");
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    // =====================================================================
    // WebSocket traffic
    // =====================================================================

    #[tokio::test]
    async fn test_websocket_accept_and_send_receive() {
        let (transport, addr) = bind().await;
        let (_transport, server_conn, mut client) = connect_pair(transport, &addr).await;
        assert!(server_conn.id().into_inner() > 0);

        // --- Server sends text, client receives a text frame ---
        server_conn
            .send(br#"{"event":"roomUpdate","data":[]}"#)
            .await
            .expect("send should succeed");
        let msg = client.next().await.unwrap().unwrap();
        assert!(msg.is_text());
        assert_eq!(msg.into_text().unwrap().as_str(), r#"{"event":"roomUpdate","data":[]}"#);

        // --- Client sends, server receives ---
        client
            .send(Message::Text("hello from client".to_string().into()))
            .await
            .unwrap();
        let received = server_conn
            .recv()
            .await
            .expect("recv should succeed")
            .expect("should have data");
        assert_eq!(received, b"hello from client");

        server_conn.close().await.expect("close should succeed");
    }

    #[tokio::test]
    async fn test_send_while_another_task_waits_in_recv() {
        let (transport, addr) = bind().await;
        let (_transport, server_conn, mut client) = connect_pair(transport, &addr).await;
        let server_conn = std::sync::Arc::new(server_conn);

        let reader = {
            let conn = std::sync::Arc::clone(&server_conn);
            tokio::spawn(async move { conn.recv().await })
        };
        tokio::task::yield_now().await;

        // The reader holds the read half; sending must not wait on it.
        server_conn.send(b"ping").await.expect("send while reading");
        let msg = client.next().await.unwrap().unwrap();
        assert_eq!(msg.into_data().as_ref(), b"ping");

        client.send(Message::Text("pong".to_string().into())).await.unwrap();
        let received = reader.await.unwrap().unwrap().unwrap();
        assert_eq!(received, b"pong");
    }

    #[tokio::test]
    async fn test_websocket_recv_returns_none_on_client_close() {
        let (transport, addr) = bind().await;
        let (_transport, server_conn, mut client) = connect_pair(transport, &addr).await;

        client.send(Message::Close(None)).await.unwrap();

        let result = server_conn.recv().await.expect("recv should not error");
        assert!(result.is_none(), "should return None on client close");
    }

    #[tokio::test]
    async fn test_connection_ids_are_unique() {
        let (transport, addr) = bind().await;
        let (transport, first, _c1) = connect_pair(transport, &addr).await;
        let (_transport, second, _c2) = connect_pair(transport, &addr).await;
        assert_ne!(first.id(), second.id());
    }

    // =====================================================================
    // Readiness endpoint
    // =====================================================================

    #[tokio::test]
    async fn test_plain_get_returns_ready_message() {
        let (mut transport, addr) = bind().await;
        // accept() answers plain HTTP itself and keeps waiting for an
        // upgrade, so it runs in the background for the whole test.
        let _accept = tokio::spawn(async move { transport.accept().await });

        let response = http_request(&addr, &get("/")).await;
        assert!(response.starts_with("HTTP/1.1 200 OK"), "{response}");
        assert!(response.ends_with(DEFAULT_READY_MESSAGE), "{response}");
    }

    #[tokio::test]
    async fn test_custom_ready_message_and_not_found() {
        let (transport, addr) = bind().await;
        let mut transport = transport.with_ready_message("ok");
        let _accept = tokio::spawn(async move { transport.accept().await });

        let response = http_request(&addr, &get("/")).await;
        assert!(response.ends_with("\r\n\r\nok"), "{response}");

        let response = http_request(&addr, &get("/nope")).await;
        assert!(response.starts_with("HTTP/1.1 404"), "{response}");
    }

    #[tokio::test]
    async fn test_websocket_accepted_after_health_check() {
        let (transport, addr) = bind().await;
        let mut transport = transport;
        let accept = tokio::spawn(async move { transport.accept().await });

        let response = http_request(&addr, &get("/")).await;
        assert!(response.starts_with("HTTP/1.1 200 OK"));

        // The same accept() call goes on to return the WebSocket.
        let (_client, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
            .await
            .expect("client should connect");
        let conn = accept.await.unwrap().expect("should accept websocket");
        assert!(conn.peer_addr().ip().is_loopback());
    }

    #[tokio::test]
    async fn test_silent_socket_does_not_hold_up_other_clients() {
        let (mut transport, addr) = bind().await;
        let accept = tokio::spawn(async move { transport.accept().await });

        // Connected, but never sends a request head.
        let _silent = TcpStream::connect(&addr).await.expect("tcp connect");

        let response = tokio::time::timeout(
            Duration::from_secs(1),
            http_request(&addr, &get("/")),
        )
        .await
        .expect("health check should not wait on the silent socket");
        assert!(response.starts_with("HTTP/1.1 200 OK"), "{response}");

        let (_client, _) = tokio::time::timeout(
            Duration::from_secs(1),
            tokio_tungstenite::connect_async(format!("ws://{addr}")),
        )
        .await
        .expect("upgrade should not wait on the silent socket")
        .expect("client should connect");
        let conn = tokio::time::timeout(Duration::from_secs(1), accept)
            .await
            .expect("accept should resolve")
            .unwrap()
            .expect("should accept websocket");
        assert!(conn.id().into_inner() > 0);
    }
}
