//! Ingress reader: one per connection.
//!
//! Reads frames until the client goes away, turns `PATCH` envelopes into
//! stand updates, and answers everything else with an `ERROR` envelope on
//! the connection's own queue.

use std::fmt::Display;
use std::sync::Arc;

use axum::extract::ws::Message;
use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use standhub_core::traits::StandUpdater;

use super::handle::{ConnectionHandle, ConnectionId};
use crate::hub::event_loop::HubEvent;
use crate::message::builder::{
    self, INVALID_PATCH_PAYLOAD, MALFORMED_MESSAGE, UNKNOWN_MESSAGE_TYPE, UPDATE_FAILED,
};
use crate::message::serializer::{decode_envelope, decode_patch};
use crate::message::types::MessageKind;
use crate::message::validator::validate_patch;
use crate::metrics::HubMetrics;

/// Emits the connection's disconnect event exactly once.
///
/// The normal exit path calls [`DisconnectGuard::disconnect`]; if the reader
/// future is dropped instead, `Drop` queues the event on a spawned task.
pub(crate) struct DisconnectGuard {
    pending: Option<(mpsc::Sender<HubEvent>, ConnectionId)>,
}

impl DisconnectGuard {
    pub(crate) fn new(events: mpsc::Sender<HubEvent>, id: ConnectionId) -> Self {
        Self {
            pending: Some((events, id)),
        }
    }

    pub(crate) async fn disconnect(mut self) {
        if let Some((events, id)) = self.pending.take() {
            if events.send(HubEvent::Disconnect(id)).await.is_err() {
                debug!(conn_id = %id, "Hub stopped before disconnect was delivered");
            }
        }
    }
}

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        let Some((events, id)) = self.pending.take() else {
            return;
        };
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            runtime.spawn(async move {
                let _ = events.send(HubEvent::Disconnect(id)).await;
            });
        }
    }
}

/// Reads one connection's inbound frames.
pub(crate) struct IngressReader {
    handle: Arc<ConnectionHandle>,
    updater: Arc<dyn StandUpdater>,
    metrics: Arc<HubMetrics>,
}

impl IngressReader {
    pub(crate) fn new(
        handle: Arc<ConnectionHandle>,
        updater: Arc<dyn StandUpdater>,
        metrics: Arc<HubMetrics>,
    ) -> Self {
        Self {
            handle,
            updater,
            metrics,
        }
    }

    /// Read until the stream ends, errors, or the client sends a close.
    pub(crate) async fn run<R, E>(&self, mut stream: R)
    where
        R: Stream<Item = Result<Message, E>> + Unpin,
        E: Display,
    {
        while let Some(frame) = stream.next().await {
            match frame {
                Ok(Message::Text(text)) => self.handle_frame(text.as_str().as_bytes()).await,
                Ok(Message::Binary(data)) => self.handle_frame(&data).await,
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
                Ok(Message::Close(_)) => {
                    debug!(conn_id = %self.handle.id, "Client sent close");
                    break;
                }
                Err(e) => {
                    debug!(conn_id = %self.handle.id, error = %e, "WebSocket read failed");
                    break;
                }
            }
        }
    }

    async fn handle_frame(&self, frame: &[u8]) {
        self.metrics.frame_received();

        let envelope = match decode_envelope(frame) {
            Ok(envelope) => envelope,
            Err(e) => {
                debug!(conn_id = %self.handle.id, error = %e, "Malformed frame");
                self.reply_error(MALFORMED_MESSAGE);
                return;
            }
        };

        match envelope.message_kind() {
            Some(MessageKind::Patch) => self.handle_patch(envelope.payload.as_deref()).await,
            _ => {
                debug!(conn_id = %self.handle.id, kind = %envelope.kind, "Unknown message type");
                self.reply_error(UNKNOWN_MESSAGE_TYPE);
            }
        }
    }

    async fn handle_patch(&self, payload: Option<&serde_json::value::RawValue>) {
        let patch = match decode_patch(payload).and_then(validate_patch) {
            Ok(patch) => patch,
            Err(e) => {
                debug!(conn_id = %self.handle.id, error = %e, "Rejected PATCH payload");
                self.reply_error(INVALID_PATCH_PAYLOAD);
                return;
            }
        };

        if let Err(e) = self.updater.update_stand(&patch.id, &patch.update).await {
            warn!(
                conn_id = %self.handle.id,
                stand_id = %patch.id,
                error = %e,
                "Stand update failed"
            );
            self.reply_error(UPDATE_FAILED);
        }
    }

    fn reply_error(&self, message: &str) {
        let frame = match builder::error_frame(message) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(conn_id = %self.handle.id, error = %e, "Failed to encode error reply");
                return;
            }
        };

        match self.handle.send(frame) {
            Ok(()) => self.metrics.error_reply(),
            Err(e) => {
                self.metrics.frame_dropped();
                debug!(conn_id = %self.handle.id, error = %e, "Error reply not delivered");
            }
        }
    }
}
