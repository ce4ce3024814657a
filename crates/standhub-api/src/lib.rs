//! # standhub-api
//!
//! HTTP layer for StandHub built on Axum.
//!
//! Provides the `/ws` upgrade into the connection hub, the `/stands` REST
//! handlers, health checks, CORS and tracing layers, error mapping, and the
//! server bootstrap that wires store, hub, and service together.

pub mod app;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, build_state, run_server, serve};
pub use state::AppState;
