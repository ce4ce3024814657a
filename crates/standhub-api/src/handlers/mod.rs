//! HTTP and WebSocket handlers.

pub mod health;
pub mod stands;
pub mod ws;
