//! In-memory stand repository.

use async_trait::async_trait;
use serde_json::Value;
use serde_json::value::RawValue;
use tokio::sync::RwLock;
use tracing::debug;

use standhub_core::error::AppError;
use standhub_core::result::AppResult;
use standhub_core::traits::StandRepository;
use standhub_core::types::{StandId, StandSnapshot};

/// Stand rows kept in process memory.
///
/// Rows are JSON objects carrying an `"id"` field; a patch shallow-merges
/// the update object into the matching row.
#[derive(Debug, Default)]
pub struct MemoryStandRepository {
    rows: RwLock<Vec<Value>>,
}

impl MemoryStandRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository holding the given rows.
    pub fn with_rows(rows: Vec<Value>) -> Self {
        Self {
            rows: RwLock::new(rows),
        }
    }
}

fn row_matches(row: &Value, id: &StandId) -> bool {
    match row.get("id") {
        Some(Value::String(s)) => s == id.as_str(),
        Some(Value::Number(n)) => n.to_string() == id.as_str(),
        _ => false,
    }
}

#[async_trait]
impl StandRepository for MemoryStandRepository {
    async fn patch(&self, id: &StandId, update: &RawValue) -> AppResult<()> {
        let update: Value = serde_json::from_str(update.get())?;
        let Value::Object(fields) = update else {
            return Err(AppError::validation("stand update must be a JSON object"));
        };

        let mut rows = self.rows.write().await;
        let row = rows
            .iter_mut()
            .find(|row| row_matches(row, id))
            .ok_or_else(|| AppError::not_found(format!("stand '{id}' not found")))?;

        if let Value::Object(target) = row {
            for (key, value) in fields {
                // The id column is the lookup key and is never rewritten.
                if key != "id" {
                    target.insert(key, value);
                }
            }
        }

        debug!(stand_id = %id, "Patched in-memory stand");
        Ok(())
    }

    async fn get_stands(&self) -> AppResult<StandSnapshot> {
        let rows = self.rows.read().await;
        StandSnapshot::from_value(&*rows)
    }
}
