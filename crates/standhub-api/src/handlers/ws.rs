//! WebSocket upgrade handler.

use axum::extract::{State, WebSocketUpgrade};
use axum::http::header::ORIGIN;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::{debug, warn};

use crate::state::AppState;

/// GET /ws
///
/// Checks the `Origin` header against `realtime.allowed_origins`, then hands
/// the upgraded socket to the hub.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Response {
    let origin = headers.get(ORIGIN).and_then(|v| v.to_str().ok());
    let realtime = state.hub.config();

    if !realtime.origin_allowed(origin) {
        warn!(origin = ?origin, "WebSocket origin rejected");
        return (StatusCode::FORBIDDEN, "Origin not allowed").into_response();
    }

    if !state.hub.state().accepts_events() {
        debug!(state = %state.hub.state(), "WebSocket refused, hub not running");
        return (StatusCode::SERVICE_UNAVAILABLE, "Hub not running").into_response();
    }

    let max = realtime.max_message_bytes;
    let hub = state.hub.clone();
    ws.max_message_size(max)
        .max_frame_size(max)
        .on_upgrade(move |socket| async move { hub.accept(socket).await })
}
