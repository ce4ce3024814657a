//! Hub lifecycle states.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle of the hub's event loop.
///
/// `Idle -> Running -> Draining -> Stopped`; a hub that is shut down before
/// it starts goes straight from `Idle` to `Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HubState {
    /// Created, event loop not started.
    Idle,
    /// Processing events.
    Running,
    /// Shutting down; queued events are finishing.
    Draining,
    /// Event loop has exited.
    Stopped,
}

impl HubState {
    /// Lowercase name, as reported by health checks.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Stopped => "stopped",
        }
    }

    /// Whether events sent now will still be processed.
    pub fn accepts_events(&self) -> bool {
        matches!(self, Self::Running)
    }
}

impl fmt::Display for HubState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
