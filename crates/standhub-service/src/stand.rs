//! Stand update and snapshot service.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::value::RawValue;
use tracing::{error, info, warn};

use standhub_core::result::AppResult;
use standhub_core::traits::{Notifier, StandRepository, StandUpdater};
use standhub_core::types::{StandId, StandSnapshot};

/// Applies stand updates and redistributes the refreshed collection.
#[derive(Clone)]
pub struct StandService {
    /// Backing store.
    repo: Arc<dyn StandRepository>,
    /// Snapshot fan-out (the realtime hub in production).
    notifier: Arc<dyn Notifier>,
}

impl std::fmt::Debug for StandService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StandService").finish()
    }
}

impl StandService {
    /// Creates a new stand service.
    pub fn new(repo: Arc<dyn StandRepository>, notifier: Arc<dyn Notifier>) -> Self {
        Self { repo, notifier }
    }

    /// Reads the full collection for the REST read path.
    pub async fn list_stands(&self) -> AppResult<StandSnapshot> {
        self.repo.get_stands().await
    }
}

#[async_trait]
impl StandUpdater for StandService {
    async fn update_stand(&self, id: &StandId, update: &RawValue) -> AppResult<()> {
        if let Err(e) = self.repo.patch(id, update).await {
            error!(stand_id = %id, error = %e, "Failed to patch stand in repository");
            return Err(e);
        }

        // Re-read instead of echoing the patch so store-side triggers and
        // defaults are reflected in what clients see.
        let snapshot = match self.repo.get_stands().await {
            Ok(s) => s,
            Err(e) => {
                error!(stand_id = %id, error = %e, "Failed to read refreshed stands");
                return Err(e);
            }
        };

        if let Err(e) = self.notifier.notify(snapshot).await {
            warn!(stand_id = %id, error = %e, "Stand updated but snapshot fan-out failed");
        }

        info!(stand_id = %id, "Stand updated and snapshot distributed");
        Ok(())
    }

    async fn get_initial_stands(&self) -> AppResult<StandSnapshot> {
        self.repo.get_stands().await
    }
}
