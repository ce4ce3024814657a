//! Backing-store repository trait.

use async_trait::async_trait;
use serde_json::value::RawValue;

use crate::result::AppResult;
use crate::types::{StandId, StandSnapshot};

/// Remote stand storage reached over request/response.
///
/// Both calls are independently fallible; implementations map transport and
/// status failures into [`crate::AppError`].
#[async_trait]
pub trait StandRepository: Send + Sync + 'static {
    /// Apply a partial update to one stand.
    async fn patch(&self, id: &StandId, update: &RawValue) -> AppResult<()>;

    /// Read the full stand collection.
    async fn get_stands(&self) -> AppResult<StandSnapshot>;
}
