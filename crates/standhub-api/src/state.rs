//! Shared application state for Axum handlers.

use std::sync::Arc;

use standhub_core::config::AppConfig;
use standhub_realtime::Hub;
use standhub_service::StandService;

/// State available to every handler through Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// The WebSocket connection hub.
    pub hub: Hub,
    /// Stand business logic.
    pub service: Arc<StandService>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("hub", &self.hub)
            .finish_non_exhaustive()
    }
}
