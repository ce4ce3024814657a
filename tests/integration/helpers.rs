//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tower::ServiceExt;

use standhub_api::{AppState, build_app, build_state, serve};
use standhub_core::config::AppConfig;

/// How long a test waits for any single frame or state change.
pub const WAIT: Duration = Duration::from_secs(3);

/// A StandHub server running on a loopback port with an in-memory store.
pub struct TestApp {
    /// Router over the same state, for in-process HTTP requests.
    pub router: Router,
    /// Shared state (hub, service, config).
    pub state: AppState,
    /// Address the server listens on.
    pub addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    server: Option<JoinHandle<()>>,
}

/// Response captured from an in-process request.
pub struct TestResponse {
    /// HTTP status.
    pub status: StatusCode,
    /// Parsed JSON body, `Value::Null` when empty or not JSON.
    pub body: Value,
}

impl TestApp {
    /// Boot a server whose store is seeded with `rows`.
    pub async fn new(rows: Vec<Value>) -> Self {
        Self::with_config(rows, |_| {}).await
    }

    /// Boot a server after adjusting the default configuration.
    pub async fn with_config(rows: Vec<Value>, adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let mut config = AppConfig::default();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = 0;
        config.server.shutdown_grace_seconds = 1;
        config.realtime.ping_interval_seconds = 0;
        config.store.seed = rows;
        adjust(&mut config);

        let state = build_state(config).expect("Failed to build app state");
        let router = build_app(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no address");

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let server_state = state.clone();
        let server = tokio::spawn(async move {
            serve(listener, server_state, async {
                let _ = shutdown_rx.await;
            })
            .await
            .expect("Server failed");
        });

        Self {
            router,
            state,
            addr,
            shutdown: Some(shutdown_tx),
            server: Some(server),
        }
    }

    /// Send an in-process request through the router.
    pub async fn request(&self, method: &str, path: &str, body: Option<&str>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        if body.is_some() {
            builder = builder.header("content-type", "application/json");
        }
        let request = builder
            .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
            .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// Websocket URL of the running server.
    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    /// Open a websocket client and consume its initial snapshot.
    pub async fn connect(&self) -> (WsClient, Value) {
        let mut client = WsClient::connect(&self.ws_url()).await;
        let greeting = client.next_json().await;
        (client, greeting)
    }

    /// Wait until the hub reports `expected` registered connections.
    pub async fn wait_for_connections(&self, expected: usize) {
        let hub = &self.state.hub;
        timeout(WAIT, async {
            while hub.connection_count() != expected {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap_or_else(|_| {
            panic!(
                "expected {expected} connections, hub has {}",
                hub.connection_count()
            )
        });
    }

    /// Trigger graceful shutdown and wait for the server task to exit.
    pub async fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(server) = self.server.take() {
            timeout(WAIT, server)
                .await
                .expect("Server did not stop in time")
                .expect("Server task panicked");
        }
    }
}

/// A websocket client speaking the envelope protocol.
pub struct WsClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsClient {
    /// Connect to `url`, panicking if the handshake fails.
    pub async fn connect(url: &str) -> Self {
        let (stream, _) = connect_async(url).await.expect("WebSocket handshake failed");
        Self { stream }
    }

    /// Send a JSON value as a text frame.
    pub async fn send_json(&mut self, value: Value) {
        self.send_text(&value.to_string()).await;
    }

    /// Send raw text.
    pub async fn send_text(&mut self, text: &str) {
        self.stream
            .send(Message::text(text.to_string()))
            .await
            .expect("WebSocket send failed");
    }

    /// Next data or close frame, skipping pings and pongs.
    pub async fn next_frame(&mut self) -> Option<Message> {
        loop {
            match timeout(WAIT, self.stream.next()).await.ok()?? {
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => continue,
                Ok(msg) => return Some(msg),
                Err(_) => return None,
            }
        }
    }

    /// Next text frame parsed as JSON.
    pub async fn next_json(&mut self) -> Value {
        match self.next_frame().await {
            Some(Message::Text(text)) => {
                serde_json::from_str(text.as_str()).expect("Server sent invalid JSON")
            }
            other => panic!("expected a text frame, got {other:?}"),
        }
    }

    /// Assert the server sends nothing for a short while.
    pub async fn expect_silence(&mut self) {
        let res = timeout(Duration::from_millis(200), self.stream.next()).await;
        assert!(res.is_err(), "unexpected frame: {res:?}");
    }

    /// Whether the server closed the connection.
    pub async fn expect_closed(&mut self) {
        match self.next_frame().await {
            None | Some(Message::Close(_)) => {}
            other => panic!("expected close, got {other:?}"),
        }
    }

    /// Close the socket from the client side.
    pub async fn close(mut self) {
        let _ = self.stream.close(None).await;
    }
}

/// The message of an `ERROR` envelope.
pub fn error_message(envelope: &Value) -> &str {
    assert_eq!(envelope["type"], "ERROR", "not an error envelope: {envelope}");
    envelope["payload"]["message"]
        .as_str()
        .expect("error payload has no message")
}
