//! Integration tests for the websocket hub over a real socket.

mod helpers;

use serde_json::json;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Error as WsError;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;

use helpers::{TestApp, WsClient, error_message};
use standhub_realtime::HubState;

#[tokio::test]
async fn test_connect_receives_initial_snapshot() {
    let app = TestApp::new(vec![json!({"id": "initial"})]).await;

    let (_client, greeting) = app.connect().await;

    assert_eq!(
        greeting,
        json!({"type": "UPDATE", "payload": [{"id": "initial"}]})
    );
    app.wait_for_connections(1).await;
}

#[tokio::test]
async fn test_patch_broadcasts_to_all_clients() {
    let app = TestApp::new(vec![json!({"id": "1"})]).await;
    let (mut a, _) = app.connect().await;
    let (mut b, _) = app.connect().await;
    app.wait_for_connections(2).await;

    a.send_json(json!({
        "type": "PATCH",
        "payload": {"id": "1", "updateData": {"status": "occupied"}}
    }))
    .await;

    let expected = json!({"type": "UPDATE", "payload": [{"id": "1", "status": "occupied"}]});
    assert_eq!(a.next_json().await, expected);
    assert_eq!(b.next_json().await, expected);
}

#[tokio::test]
async fn test_failed_update_replies_only_to_sender() {
    let app = TestApp::new(vec![json!({"id": "1"})]).await;
    let (mut a, _) = app.connect().await;
    let (mut b, _) = app.connect().await;
    app.wait_for_connections(2).await;

    // Unknown id: the in-memory store rejects the patch.
    a.send_json(json!({
        "type": "PATCH",
        "payload": {"id": "missing", "updateData": {"status": "x"}}
    }))
    .await;

    assert_eq!(error_message(&a.next_json().await), "Failed to update data.");
    b.expect_silence().await;
}

#[tokio::test]
async fn test_protocol_errors_keep_connection_open() {
    let app = TestApp::new(vec![json!({"id": "1"})]).await;
    let (mut client, _) = app.connect().await;

    client.send_text("{definitely not json").await;
    assert_eq!(error_message(&client.next_json().await), "Malformed message.");

    client.send_json(json!({"type": "SUBSCRIBE", "payload": {}})).await;
    assert_eq!(
        error_message(&client.next_json().await),
        "Unknown message type."
    );

    client
        .send_json(json!({"type": "PATCH", "payload": {"updateData": {}}}))
        .await;
    assert_eq!(
        error_message(&client.next_json().await),
        "Invalid payload for PATCH message."
    );

    // Still registered and still served.
    assert_eq!(app.state.hub.connection_count(), 1);
    client
        .send_json(json!({
            "type": "PATCH",
            "payload": {"id": "1", "updateData": {"status": "free"}}
        }))
        .await;
    assert_eq!(client.next_json().await["payload"][0]["status"], "free");
}

#[tokio::test]
async fn test_disconnect_removes_connection() {
    let app = TestApp::new(vec![json!({"id": "1"})]).await;
    let (a, _) = app.connect().await;
    let (mut b, _) = app.connect().await;
    app.wait_for_connections(2).await;

    a.close().await;
    app.wait_for_connections(1).await;

    let res = app
        .request(
            "PATCH",
            "/stands",
            Some(r#"{"id":"1","updateData":{"status":"busy"}}"#),
        )
        .await;
    assert_eq!(res.status, 204);
    assert_eq!(b.next_json().await["payload"][0]["status"], "busy");
}

#[tokio::test]
async fn test_rejected_origin() {
    let app = TestApp::with_config(vec![], |config| {
        config.realtime.allowed_origins = vec!["https://stands.example".to_string()];
    })
    .await;

    let mut request = app.ws_url().into_client_request().unwrap();
    request
        .headers_mut()
        .insert("origin", HeaderValue::from_static("https://evil.example"));
    match connect_async(request).await {
        Err(WsError::Http(response)) => assert_eq!(response.status(), 403),
        Err(e) => panic!("expected 403 handshake failure, got {e}"),
        Ok(_) => panic!("handshake from a rejected origin succeeded"),
    }

    let mut request = app.ws_url().into_client_request().unwrap();
    request
        .headers_mut()
        .insert("origin", HeaderValue::from_static("https://stands.example"));
    let (_stream, _) = connect_async(request).await.expect("allowed origin");
    app.wait_for_connections(1).await;
}

#[tokio::test]
async fn test_shutdown_closes_clients() {
    let mut app = TestApp::new(vec![json!({"id": "1"})]).await;
    let (mut client, _) = app.connect().await;
    app.wait_for_connections(1).await;

    app.shutdown().await;

    assert_eq!(app.state.hub.state(), HubState::Stopped);
    assert_eq!(app.state.hub.connection_count(), 0);
    client.expect_closed().await;
}

#[tokio::test]
async fn test_many_clients_receive_one_update_each() {
    let app = TestApp::new(vec![json!({"id": "1"})]).await;
    let mut clients: Vec<WsClient> = Vec::new();
    for _ in 0..5 {
        clients.push(app.connect().await.0);
    }
    app.wait_for_connections(5).await;

    clients[0]
        .send_json(json!({
            "type": "PATCH",
            "payload": {"id": "1", "updateData": {"n": 1}}
        }))
        .await;

    for client in &mut clients {
        assert_eq!(client.next_json().await["payload"][0]["n"], 1);
        client.expect_silence().await;
    }
}
