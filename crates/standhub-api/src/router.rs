//! Route definitions for the StandHub HTTP surface.

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;

use crate::handlers;
use crate::state::AppState;

/// Build the router with every route and the body limit.
pub fn build_router(state: AppState) -> Router {
    let max_body = state.config.server.max_body_bytes;

    Router::new()
        .route("/ws", get(handlers::ws::ws_upgrade))
        .route(
            "/stands",
            get(handlers::stands::list_stands).patch(handlers::stands::patch_stand),
        )
        .route("/healthcheck", get(handlers::health::health))
        .route(
            "/healthcheck/detailed",
            get(handlers::health::health_detailed),
        )
        .layer(DefaultBodyLimit::max(max_body))
        .with_state(state)
}
