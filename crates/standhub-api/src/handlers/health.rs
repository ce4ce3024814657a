//! Health check handlers.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use standhub_realtime::{HubMetricsSnapshot, HubState};

use crate::state::AppState;

/// Liveness response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `true` while the process serves requests.
    pub success: bool,
}

/// Detailed health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedHealthResponse {
    /// `true` while the hub is running.
    pub success: bool,
    /// Server version.
    pub version: String,
    /// Hub lifecycle state.
    pub hub_state: HubState,
    /// Registered websocket connections.
    pub connections: usize,
    /// Hub counters.
    pub metrics: HubMetricsSnapshot,
}

/// GET /healthcheck
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { success: true })
}

/// GET /healthcheck/detailed
pub async fn health_detailed(State(state): State<AppState>) -> Json<DetailedHealthResponse> {
    let hub_state = state.hub.state();

    Json(DetailedHealthResponse {
        success: hub_state == HubState::Running,
        version: env!("CARGO_PKG_VERSION").to_string(),
        hub_state,
        connections: state.hub.connection_count(),
        metrics: state.hub.metrics(),
    })
}
