//! Stand identifier and collection snapshot.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::error::AppError;

/// Identifier of a single stand record.
///
/// The backing store owns the format; the only local rule is that an id is
/// never blank.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StandId(String);

impl StandId {
    /// Return the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for StandId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.to_string())
    }
}

impl TryFrom<String> for StandId {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.trim().is_empty() {
            return Err(AppError::validation("stand id must not be empty"));
        }
        Ok(Self(value))
    }
}

impl From<StandId> for String {
    fn from(id: StandId) -> Self {
        id.0
    }
}

impl fmt::Display for StandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The full current state of the stand collection.
///
/// Kept as an opaque, already-validated JSON document so it can be pushed to
/// clients byte-for-byte as the backing store returned it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StandSnapshot(Box<RawValue>);

impl StandSnapshot {
    /// Validate raw bytes from the backing store as a JSON document.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AppError> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| AppError::serialization(format!("snapshot is not UTF-8: {e}")))?;
        Self::from_json(text.trim().to_string())
    }

    /// Validate an owned JSON string.
    pub fn from_json(json: String) -> Result<Self, AppError> {
        RawValue::from_string(json).map(Self).map_err(|e| {
            AppError::serialization(format!("snapshot is not a JSON document: {e}"))
        })
    }

    /// Serialize any value into a snapshot.
    pub fn from_value<T: Serialize>(value: &T) -> Result<Self, AppError> {
        Ok(Self(serde_json::value::to_raw_value(value)?))
    }

    /// The snapshot as raw JSON.
    pub fn as_raw(&self) -> &RawValue {
        &self.0
    }

    /// The snapshot as JSON text.
    pub fn as_str(&self) -> &str {
        self.0.get()
    }
}
