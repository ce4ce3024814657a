//! The single task that owns the connection registry.
//!
//! Connects, disconnects, and broadcasts arrive on one FIFO queue, so a
//! connection's disconnect is always processed after its connect and the
//! registry never needs a lock.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{Instant, timeout};
use tracing::{debug, error, info, warn};

use standhub_core::error::AppError;
use standhub_core::result::AppResult;
use standhub_core::traits::StandUpdater;
use standhub_core::types::StandSnapshot;

use super::state::HubState;
use crate::connection::handle::{ConnectionHandle, ConnectionId};
use crate::connection::registry::Registry;
use crate::message::builder::{self, INITIAL_STANDS_FAILED};
use crate::metrics::HubMetrics;

/// Events processed by the loop, in arrival order.
#[derive(Debug)]
pub(crate) enum HubEvent {
    /// A new connection to register and greet with a snapshot.
    Connect(Arc<ConnectionHandle>),
    /// A connection whose reader has exited.
    Disconnect(ConnectionId),
    /// A snapshot to fan out to every registered connection.
    Broadcast(StandSnapshot),
}

/// Outcome of the shutdown drain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct DrainStats {
    /// Disconnects and broadcasts applied before the deadline.
    pub processed: usize,
    /// Events dropped because the deadline had passed.
    pub skipped: usize,
    /// Connects released without being registered.
    pub refused: usize,
}

pub(crate) struct EventLoop {
    events: mpsc::Receiver<HubEvent>,
    shutdown: oneshot::Receiver<Duration>,
    registry: Registry,
    updater: Arc<dyn StandUpdater>,
    initial_read_timeout: Option<Duration>,
    metrics: Arc<HubMetrics>,
    state: Arc<watch::Sender<HubState>>,
}

impl EventLoop {
    pub(crate) fn new(
        events: mpsc::Receiver<HubEvent>,
        shutdown: oneshot::Receiver<Duration>,
        updater: Arc<dyn StandUpdater>,
        initial_read_timeout: Option<Duration>,
        metrics: Arc<HubMetrics>,
        state: Arc<watch::Sender<HubState>>,
    ) -> Self {
        Self {
            events,
            shutdown,
            registry: Registry::new(),
            updater,
            initial_read_timeout,
            metrics,
            state,
        }
    }

    pub(crate) async fn run(mut self) {
        info!("Connection hub running");

        let grace = loop {
            tokio::select! {
                grace = &mut self.shutdown => break grace.unwrap_or(Duration::ZERO),
                event = self.events.recv() => match event {
                    Some(event) => self.handle(event).await,
                    None => break Duration::ZERO,
                },
            }
        };

        self.drain(grace);
        self.release_all();
        self.state.send_replace(HubState::Stopped);
        info!("Connection hub stopped");
    }

    async fn handle(&mut self, event: HubEvent) {
        match event {
            HubEvent::Connect(handle) => self.on_connect(handle).await,
            HubEvent::Disconnect(id) => self.on_disconnect(id),
            HubEvent::Broadcast(snapshot) => self.on_broadcast(&snapshot),
        }
    }

    /// Register a connection and greet it with the current snapshot.
    ///
    /// The snapshot read runs on the loop itself, so every other event waits
    /// behind it; `initial_read_timeout` bounds that stall.
    async fn on_connect(&mut self, handle: Arc<ConnectionHandle>) {
        if !self.registry.insert(handle.clone()) {
            debug!(conn_id = %handle.id, "Duplicate connect ignored");
            return;
        }
        self.metrics.connection_opened();
        info!(
            conn_id = %handle.id,
            connections = self.registry.len(),
            "Client connected"
        );

        let frame = match self.initial_stands().await {
            Ok(snapshot) => builder::update_frame(&snapshot),
            Err(e) => {
                warn!(conn_id = %handle.id, error = %e, "Failed to read initial stands");
                builder::error_frame(INITIAL_STANDS_FAILED)
            }
        };

        match frame {
            Ok(frame) => self.deliver(&handle, frame),
            Err(e) => error!(conn_id = %handle.id, error = %e, "Failed to encode initial frame"),
        }
    }

    async fn initial_stands(&self) -> AppResult<StandSnapshot> {
        let read = self.updater.get_initial_stands();
        match self.initial_read_timeout {
            Some(limit) => timeout(limit, read).await.map_err(|_| {
                AppError::external(format!(
                    "initial stands read timed out after {}ms",
                    limit.as_millis()
                ))
            })?,
            None => read.await,
        }
    }

    fn on_disconnect(&mut self, id: ConnectionId) {
        match self.registry.remove(&id) {
            Some(handle) => {
                handle.release();
                self.metrics.connection_closed();
                info!(
                    conn_id = %id,
                    connections = self.registry.len(),
                    lifetime_ms = handle.lifetime_ms(),
                    "Client disconnected"
                );
            }
            None => debug!(conn_id = %id, "Disconnect for unknown connection ignored"),
        }
    }

    fn on_broadcast(&mut self, snapshot: &StandSnapshot) {
        let frame = match builder::update_frame(snapshot) {
            Ok(frame) => frame,
            Err(e) => {
                error!(error = %e, "Failed to encode stand update");
                return;
            }
        };

        self.metrics.broadcast();
        for handle in self.registry.iter() {
            self.deliver(handle, frame.clone());
        }
        debug!(connections = self.registry.len(), "Stand update broadcast");
    }

    /// Queue a frame for one connection. Failures only affect that connection.
    fn deliver(&self, handle: &ConnectionHandle, frame: String) {
        match handle.send(frame) {
            Ok(()) => self.metrics.frame_sent(),
            Err(e) => {
                self.metrics.frame_dropped();
                warn!(conn_id = %handle.id, error = %e, "Failed to queue frame for client");
            }
        }
    }

    /// Process what is already queued, up to the grace deadline.
    ///
    /// New connects are refused; disconnects and broadcasts still apply
    /// until the deadline and are dropped after it.
    fn drain(&mut self, grace: Duration) -> DrainStats {
        self.state.send_replace(HubState::Draining);
        self.events.close();

        let deadline = Instant::now() + grace;
        let mut stats = DrainStats::default();
        while let Ok(event) = self.events.try_recv() {
            match event {
                HubEvent::Connect(handle) => {
                    debug!(conn_id = %handle.id, "Connect refused while draining");
                    handle.release();
                    stats.refused += 1;
                }
                _ if Instant::now() >= deadline => stats.skipped += 1,
                HubEvent::Disconnect(id) => {
                    self.on_disconnect(id);
                    stats.processed += 1;
                }
                HubEvent::Broadcast(snapshot) => {
                    self.on_broadcast(&snapshot);
                    stats.processed += 1;
                }
            }
        }

        info!(
            processed = stats.processed,
            skipped = stats.skipped,
            refused = stats.refused,
            "Hub drained"
        );
        stats
    }

    fn release_all(&mut self) {
        let handles = self.registry.drain();
        let count = handles.len();
        for handle in handles {
            handle.release();
            self.metrics.connection_closed();
        }
        if count > 0 {
            info!(count, "Released remaining connections");
        }
    }
}
