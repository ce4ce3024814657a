//! Application builder and server bootstrap.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use standhub_core::config::AppConfig;
use standhub_core::error::AppError;
use standhub_core::result::AppResult;
use standhub_realtime::Hub;
use standhub_service::StandService;
use standhub_store::build_repository;

use crate::middleware::cors::build_cors_layer;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.cors);
    build_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Wire repository, hub, and service, and start the hub.
///
/// The hub is the service's notifier and the service is the hub's updater,
/// so the hub is created idle and started once the service exists. Must be
/// called from within a Tokio runtime.
pub fn build_state(config: AppConfig) -> AppResult<AppState> {
    config.validate()?;
    let repo = build_repository(&config.store)?;

    let hub = Hub::new(config.realtime.clone());
    let service = Arc::new(StandService::new(repo, Arc::new(hub.clone())));
    hub.start(service.clone())?;

    Ok(AppState {
        config: Arc::new(config),
        hub,
        service,
    })
}

/// Serve the application on `listener` until `shutdown` resolves.
///
/// On shutdown the hub drains first, releasing every websocket, then the
/// HTTP server finishes in-flight requests.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> AppResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let grace = Duration::from_secs(state.config.server.shutdown_grace_seconds);
    let hub = state.hub.clone();
    let app = build_app(state);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.await;
            tracing::info!("Shutdown signal received");
            hub.shutdown(grace).await;
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Runs the StandHub server with the given configuration.
pub async fn run_server(config: AppConfig) -> AppResult<()> {
    tracing::info!("Starting StandHub server...");

    let addr = config.bind_address();
    let state = build_state(config)?;

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("StandHub server listening on {}", addr);

    serve(listener, state, shutdown_signal()).await
}

/// Resolves on Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
