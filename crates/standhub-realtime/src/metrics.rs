//! Hub metrics counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Hub-level counters, updated lock-free from the event loop and readers.
#[derive(Debug, Default)]
pub struct HubMetrics {
    /// Connections ever registered
    pub connections_total: AtomicU64,
    /// Connections currently registered
    pub connections_active: AtomicU64,
    /// Inbound frames handled by readers
    pub frames_received: AtomicU64,
    /// Frames queued to connections
    pub frames_sent: AtomicU64,
    /// Frames dropped because a connection's queue was full or closed
    pub frames_dropped: AtomicU64,
    /// Snapshot broadcasts processed
    pub broadcasts: AtomicU64,
    /// `ERROR` replies sent
    pub error_replies: AtomicU64,
}

impl HubMetrics {
    /// Create zeroed metrics
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn connection_opened(&self) {
        self.connections_total.fetch_add(1, Ordering::Relaxed);
        self.connections_active.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn connection_closed(&self) {
        // Only called for connections that were counted as opened.
        self.connections_active.fetch_sub(1, Ordering::Relaxed);
    }

    pub(crate) fn frame_received(&self) {
        self.frames_received.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn frame_sent(&self) {
        self.frames_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn frame_dropped(&self) {
        self.frames_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn broadcast(&self) {
        self.broadcasts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn error_reply(&self) {
        self.error_replies.fetch_add(1, Ordering::Relaxed);
    }

    /// Currently registered connections.
    pub fn active_connections(&self) -> u64 {
        self.connections_active.load(Ordering::Relaxed)
    }

    /// Get a snapshot of all counters
    pub fn snapshot(&self) -> HubMetricsSnapshot {
        HubMetricsSnapshot {
            connections_total: self.connections_total.load(Ordering::Relaxed),
            connections_active: self.connections_active.load(Ordering::Relaxed),
            frames_received: self.frames_received.load(Ordering::Relaxed),
            frames_sent: self.frames_sent.load(Ordering::Relaxed),
            frames_dropped: self.frames_dropped.load(Ordering::Relaxed),
            broadcasts: self.broadcasts.load(Ordering::Relaxed),
            error_replies: self.error_replies.load(Ordering::Relaxed),
        }
    }
}

/// Serializable metrics snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubMetricsSnapshot {
    /// Connections ever registered
    pub connections_total: u64,
    /// Connections currently registered
    pub connections_active: u64,
    /// Inbound frames handled
    pub frames_received: u64,
    /// Frames queued to connections
    pub frames_sent: u64,
    /// Frames dropped
    pub frames_dropped: u64,
    /// Broadcasts processed
    pub broadcasts: u64,
    /// `ERROR` replies sent
    pub error_replies: u64,
}
