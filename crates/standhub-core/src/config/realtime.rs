//! Real-time WebSocket hub configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Real-time (WebSocket) hub configuration.
///
/// This value is handed explicitly to the upgrade handler and the hub;
/// nothing about the upgrade is process-global.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Capacity of the hub's event queue. Producers wait when it is full.
    #[serde(default = "default_event_buffer")]
    pub event_buffer_size: usize,
    /// Capacity of each connection's outbound frame queue.
    #[serde(default = "default_outbound_buffer")]
    pub outbound_buffer_size: usize,
    /// WebSocket ping interval in seconds (0 disables pings).
    #[serde(default = "default_ping_interval")]
    pub ping_interval_seconds: u64,
    /// Upper bound on the initial snapshot read for a new connection, in
    /// milliseconds (0 waits indefinitely). The event loop is blocked for
    /// the duration of that read.
    #[serde(default = "default_initial_read_timeout")]
    pub initial_read_timeout_ms: u64,
    /// Largest inbound WebSocket message accepted by the upgrade.
    #[serde(default = "default_max_message")]
    pub max_message_bytes: usize,
    /// Origins allowed to open a WebSocket (`"*"` allows any).
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            event_buffer_size: default_event_buffer(),
            outbound_buffer_size: default_outbound_buffer(),
            ping_interval_seconds: default_ping_interval(),
            initial_read_timeout_ms: default_initial_read_timeout(),
            max_message_bytes: default_max_message(),
            allowed_origins: default_allowed_origins(),
        }
    }
}

impl RealtimeConfig {
    /// Validate buffer sizes.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.event_buffer_size == 0 {
            return Err(AppError::configuration(
                "realtime.event_buffer_size must be greater than zero",
            ));
        }
        if self.outbound_buffer_size == 0 {
            return Err(AppError::configuration(
                "realtime.outbound_buffer_size must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Ping interval, or `None` when keepalive pings are disabled.
    pub fn ping_interval(&self) -> Option<Duration> {
        (self.ping_interval_seconds > 0).then(|| Duration::from_secs(self.ping_interval_seconds))
    }

    /// Initial snapshot read bound, or `None` to wait indefinitely.
    pub fn initial_read_timeout(&self) -> Option<Duration> {
        (self.initial_read_timeout_ms > 0).then(|| Duration::from_millis(self.initial_read_timeout_ms))
    }

    /// Whether a browser `Origin` header value may open a socket.
    ///
    /// Requests without an `Origin` header (non-browser clients) are allowed.
    pub fn origin_allowed(&self, origin: Option<&str>) -> bool {
        match origin {
            None => true,
            Some(origin) => self
                .allowed_origins
                .iter()
                .any(|allowed| allowed == "*" || allowed.eq_ignore_ascii_case(origin)),
        }
    }
}

fn default_event_buffer() -> usize {
    256
}

fn default_outbound_buffer() -> usize {
    64
}

fn default_ping_interval() -> u64 {
    30
}

fn default_initial_read_timeout() -> u64 {
    5_000
}

fn default_max_message() -> usize {
    65_536
}

fn default_allowed_origins() -> Vec<String> {
    vec!["*".to_string()]
}
