//! Integration tests for the REST surface.

mod helpers;

use serde_json::json;

use helpers::TestApp;

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new(vec![]).await;

    let response = app.request("GET", "/healthcheck", None).await;

    assert_eq!(response.status, 200);
    assert_eq!(response.body, json!({"success": true}));
}

#[tokio::test]
async fn test_detailed_health_check() {
    let app = TestApp::new(vec![]).await;
    let (_client, _) = app.connect().await;
    app.wait_for_connections(1).await;

    let response = app.request("GET", "/healthcheck/detailed", None).await;

    assert_eq!(response.status, 200);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.body["hub_state"], "running");
    assert_eq!(response.body["connections"], 1);
    assert_eq!(response.body["metrics"]["connections_total"], 1);
}

#[tokio::test]
async fn test_list_stands() {
    let app = TestApp::new(vec![json!({"id": "1", "status": "free"}), json!({"id": "2"})]).await;

    let response = app.request("GET", "/stands", None).await;

    assert_eq!(response.status, 200);
    assert_eq!(
        response.body,
        json!([{"id": "1", "status": "free"}, {"id": "2"}])
    );
}

#[tokio::test]
async fn test_rest_patch_broadcasts_to_websocket_clients() {
    let app = TestApp::new(vec![json!({"id": "7"})]).await;
    let (mut client, _) = app.connect().await;
    app.wait_for_connections(1).await;

    let response = app
        .request(
            "PATCH",
            "/stands",
            Some(r#"{"id":"7","updateData":{"status":"occupied"}}"#),
        )
        .await;
    assert_eq!(response.status, 204);

    assert_eq!(
        client.next_json().await,
        json!({"type": "UPDATE", "payload": [{"id": "7", "status": "occupied"}]})
    );
}

#[tokio::test]
async fn test_rest_patch_rejects_bad_input() {
    let app = TestApp::new(vec![json!({"id": "1"})]).await;

    let response = app.request("PATCH", "/stands", Some("{oops")).await;
    assert_eq!(response.status, 400);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");

    let response = app
        .request("PATCH", "/stands", Some(r#"{"id":"1","updateData":[1]}"#))
        .await;
    assert_eq!(response.status, 400);

    let response = app
        .request("PATCH", "/stands", Some(r#"{"id":"9","updateData":{}}"#))
        .await;
    assert_eq!(response.status, 404);
}
