//! Business-logic capability consumed by the realtime hub.

use async_trait::async_trait;
use serde_json::value::RawValue;

use crate::result::AppResult;
use crate::types::{StandId, StandSnapshot};

/// Stand operations the hub dispatches client commands to.
#[async_trait]
pub trait StandUpdater: Send + Sync + 'static {
    /// Apply a partial update. On success the implementation pushes the
    /// refreshed snapshot to its [`crate::traits::Notifier`] itself.
    async fn update_stand(&self, id: &StandId, update: &RawValue) -> AppResult<()>;

    /// Current full collection, sent to a client when it connects.
    async fn get_initial_stands(&self) -> AppResult<StandSnapshot>;
}
