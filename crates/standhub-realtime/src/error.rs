//! Error types for the connection hub.

use thiserror::Error;

use standhub_core::error::AppError;

/// Wire-level decode and encode failures.
///
/// Decode failures are always answered with an `ERROR` envelope; they never
/// end a connection on their own.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The frame is not a `{type, payload}` envelope.
    #[error("malformed envelope: {0}")]
    Malformed(#[source] serde_json::Error),
    /// The envelope payload does not match its declared type.
    #[error("invalid {kind} payload: {reason}")]
    InvalidPayload {
        /// Declared message type.
        kind: &'static str,
        /// What was wrong with it.
        reason: String,
    },
    /// An outbound envelope could not be serialized.
    #[error("failed to encode envelope: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Failures of the hub façade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HubError {
    /// The event loop has not been started yet.
    #[error("connection hub is not running")]
    NotRunning,
    /// `start` was called on a hub that already left the idle state.
    #[error("connection hub was already started")]
    AlreadyStarted,
    /// The event loop has shut down.
    #[error("connection hub is stopped")]
    Stopped,
}

impl From<HubError> for AppError {
    fn from(err: HubError) -> Self {
        AppError::service_unavailable(err.to_string())
    }
}

/// Why a frame could not be queued for one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// The connection's outbound queue is full; the frame was dropped.
    #[error("outbound queue full")]
    QueueFull,
    /// The connection's writer is gone.
    #[error("connection closed")]
    Closed,
}
