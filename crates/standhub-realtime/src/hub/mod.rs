//! The connection hub façade.
//!
//! [`Hub`] is a cheap, cloneable handle. All registry mutation happens on
//! the event loop task spawned by [`Hub::start`]; the façade only enqueues
//! events and spawns per-connection tasks.

pub(crate) mod event_loop;
pub mod state;

use std::fmt::Display;
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use standhub_core::config::RealtimeConfig;
use standhub_core::result::AppResult;
use standhub_core::traits::{Notifier, StandUpdater};
use standhub_core::types::StandSnapshot;

use self::event_loop::{EventLoop, HubEvent};
use self::state::HubState;
use crate::connection::handle::{ConnectionHandle, ConnectionId};
use crate::connection::reader::{DisconnectGuard, IngressReader};
use crate::connection::writer::run_writer;
use crate::error::HubError;
use crate::metrics::{HubMetrics, HubMetricsSnapshot};

/// Handle to the connection hub.
#[derive(Clone)]
pub struct Hub {
    inner: Arc<HubInner>,
}

struct HubInner {
    config: RealtimeConfig,
    events: mpsc::Sender<HubEvent>,
    state: Arc<watch::Sender<HubState>>,
    metrics: Arc<HubMetrics>,
    updater: OnceLock<Arc<dyn StandUpdater>>,
    /// Parts handed to the event loop on `start`.
    pending: Mutex<Option<(mpsc::Receiver<HubEvent>, oneshot::Receiver<Duration>)>>,
    shutdown: Mutex<Option<oneshot::Sender<Duration>>>,
    task: Mutex<Option<JoinHandle<()>>>,
    writers: TaskTracker,
}

impl std::fmt::Debug for Hub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hub")
            .field("state", &self.state())
            .field("connections", &self.connection_count())
            .finish()
    }
}

impl Hub {
    /// Create an idle hub. Nothing runs until [`start`](Self::start).
    pub fn new(config: RealtimeConfig) -> Self {
        let (events_tx, events_rx) = mpsc::channel(config.event_buffer_size.max(1));
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let (state, _) = watch::channel(HubState::Idle);

        Self {
            inner: Arc::new(HubInner {
                config,
                events: events_tx,
                state: Arc::new(state),
                metrics: Arc::new(HubMetrics::new()),
                updater: OnceLock::new(),
                pending: Mutex::new(Some((events_rx, shutdown_rx))),
                shutdown: Mutex::new(Some(shutdown_tx)),
                task: Mutex::new(None),
                writers: TaskTracker::new(),
            }),
        }
    }

    /// Start the event loop with the business-logic collaborator.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&self, updater: Arc<dyn StandUpdater>) -> Result<(), HubError> {
        // The task slot serializes start against shutdown.
        let mut slot = self.inner.task.lock().map_err(|_| HubError::Stopped)?;
        let parts = self
            .inner
            .pending
            .lock()
            .map_err(|_| HubError::Stopped)?
            .take();
        let Some((events, shutdown)) = parts else {
            return Err(HubError::AlreadyStarted);
        };

        if self.inner.updater.set(updater.clone()).is_err() {
            return Err(HubError::AlreadyStarted);
        }

        let event_loop = EventLoop::new(
            events,
            shutdown,
            updater,
            self.inner.config.initial_read_timeout(),
            self.inner.metrics.clone(),
            self.inner.state.clone(),
        );
        self.inner.state.send_replace(HubState::Running);
        *slot = Some(tokio::spawn(event_loop.run()));
        Ok(())
    }

    /// Current lifecycle state.
    pub fn state(&self) -> HubState {
        *self.inner.state.borrow()
    }

    /// Number of registered connections.
    pub fn connection_count(&self) -> usize {
        self.inner.metrics.active_connections() as usize
    }

    /// Snapshot of hub counters.
    pub fn metrics(&self) -> HubMetricsSnapshot {
        self.inner.metrics.snapshot()
    }

    /// The configuration the hub was built with.
    pub fn config(&self) -> &RealtimeConfig {
        &self.inner.config
    }

    /// Enqueue a registration. The snapshot greeting is sent by the loop.
    pub async fn register(&self, handle: Arc<ConnectionHandle>) -> Result<(), HubError> {
        self.enqueue(HubEvent::Connect(handle)).await
    }

    /// Enqueue a removal. Unknown ids are ignored by the loop.
    pub async fn unregister(&self, id: ConnectionId) -> Result<(), HubError> {
        self.enqueue(HubEvent::Disconnect(id)).await
    }

    /// Enqueue a snapshot for every registered connection.
    pub async fn broadcast(&self, snapshot: StandSnapshot) -> Result<(), HubError> {
        self.enqueue(HubEvent::Broadcast(snapshot)).await
    }

    async fn enqueue(&self, event: HubEvent) -> Result<(), HubError> {
        match self.state() {
            HubState::Idle => return Err(HubError::NotRunning),
            HubState::Draining | HubState::Stopped => return Err(HubError::Stopped),
            HubState::Running => {}
        }
        self.inner
            .events
            .send(event)
            .await
            .map_err(|_| HubError::Stopped)
    }

    /// Serve an upgraded WebSocket until the client leaves.
    pub async fn accept(&self, socket: WebSocket) {
        let (sink, stream) = socket.split();
        self.serve_connection(sink, stream).await;
    }

    /// Serve one connection over any message sink/stream pair.
    ///
    /// Spawns the writer, registers the connection, then runs the ingress
    /// reader on the calling task. Returns after the disconnect is queued.
    pub async fn serve_connection<S, R, E>(&self, mut sink: S, stream: R)
    where
        S: Sink<Message> + Unpin + Send + 'static,
        S::Error: Display + Send,
        R: Stream<Item = Result<Message, E>> + Unpin,
        E: Display,
    {
        let updater = match (self.state(), self.inner.updater.get()) {
            (HubState::Running, Some(updater)) => updater.clone(),
            (state, _) => {
                debug!(state = %state, "Refusing connection, hub not running");
                let _ = sink.send(Message::Close(None)).await;
                let _ = sink.close().await;
                return;
            }
        };

        let (handle, outbound) = ConnectionHandle::new(self.inner.config.outbound_buffer_size);
        let handle = Arc::new(handle);
        self.inner.writers.spawn(run_writer(
            sink,
            outbound,
            handle.clone(),
            self.inner.config.ping_interval(),
        ));

        if let Err(e) = self.register(handle.clone()).await {
            debug!(conn_id = %handle.id, error = %e, "Registration refused");
            handle.release();
            return;
        }

        let guard = DisconnectGuard::new(self.inner.events.clone(), handle.id);
        IngressReader::new(handle, updater, self.inner.metrics.clone())
            .run(stream)
            .await;
        guard.disconnect().await;
    }

    /// Stop the hub.
    ///
    /// Events already queued are processed for up to `grace`, then every
    /// connection is released and its writer flushes and closes. Later
    /// façade calls return [`HubError::Stopped`].
    pub async fn shutdown(&self, grace: Duration) {
        let task = match self.inner.task.lock() {
            Ok(mut slot) => {
                let task = slot.take();
                // Never started: retire the loop parts so `start` fails.
                if task.is_none() && self.state() == HubState::Idle {
                    if let Ok(mut pending) = self.inner.pending.lock() {
                        pending.take();
                    }
                    self.inner.state.send_replace(HubState::Stopped);
                }
                task
            }
            Err(_) => None,
        };
        let Some(task) = task else {
            return;
        };
        let shutdown = self.inner.shutdown.lock().ok().and_then(|mut s| s.take());

        info!(grace_ms = grace.as_millis() as u64, "Shutting down connection hub");
        if let Some(shutdown) = shutdown {
            let _ = shutdown.send(grace);
        }

        if let Err(e) = task.await {
            warn!(error = %e, "Hub event loop ended abnormally");
            self.inner.state.send_replace(HubState::Stopped);
        }

        self.inner.writers.close();
        if tokio::time::timeout(grace, self.inner.writers.wait())
            .await
            .is_err()
        {
            warn!("Some connection writers did not finish within the grace period");
        }
    }
}

#[async_trait]
impl Notifier for Hub {
    async fn notify(&self, snapshot: StandSnapshot) -> AppResult<()> {
        self.broadcast(snapshot).await.map_err(Into::into)
    }
}
