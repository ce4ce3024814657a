//! Snapshot fan-out capability.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::StandSnapshot;

/// Receives refreshed snapshots and distributes them to live clients.
#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    /// Queue a snapshot for delivery to every connected client.
    async fn notify(&self, snapshot: StandSnapshot) -> AppResult<()>;
}
