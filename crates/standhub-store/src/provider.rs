//! Repository selection from configuration.

use std::sync::Arc;

use tracing::info;

use standhub_core::config::{StoreConfig, StoreProvider};
use standhub_core::result::AppResult;
use standhub_core::traits::StandRepository;

use crate::memory::MemoryStandRepository;
use crate::supabase::SupabaseStandRepository;

/// Build the repository selected by `store.provider`.
pub fn build_repository(config: &StoreConfig) -> AppResult<Arc<dyn StandRepository>> {
    config.validate()?;

    let repo: Arc<dyn StandRepository> = match config.provider {
        StoreProvider::Supabase => {
            info!(url = %config.url, table = %config.table, "Initializing Supabase stand repository");
            Arc::new(SupabaseStandRepository::new(config)?)
        }
        StoreProvider::Memory => {
            info!(rows = config.seed.len(), "Initializing in-memory stand repository");
            Arc::new(MemoryStandRepository::with_rows(config.seed.clone()))
        }
    };

    Ok(repo)
}
