//! Backing store configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Which backing store implementation to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreProvider {
    /// Remote PostgREST endpoint (Supabase).
    Supabase,
    /// In-process store seeded from configuration.
    #[default]
    Memory,
}

/// Backing store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Provider selection.
    #[serde(default)]
    pub provider: StoreProvider,
    /// Base URL of the Supabase project.
    #[serde(default)]
    pub url: String,
    /// Supabase API key, sent both as `apikey` and bearer token.
    #[serde(default)]
    pub api_key: String,
    /// Table holding the stand rows.
    #[serde(default = "default_table")]
    pub table: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// Initial rows for the memory provider.
    #[serde(default)]
    pub seed: Vec<serde_json::Value>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            provider: StoreProvider::default(),
            url: String::new(),
            api_key: String::new(),
            table: default_table(),
            request_timeout_seconds: default_request_timeout(),
            seed: Vec::new(),
        }
    }
}

impl StoreConfig {
    /// Validate provider-specific requirements.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.provider == StoreProvider::Supabase {
            if self.url.trim().is_empty() {
                return Err(AppError::configuration(
                    "store.url is required for the supabase provider",
                ));
            }
            if self.api_key.trim().is_empty() {
                return Err(AppError::configuration(
                    "store.api_key is required for the supabase provider",
                ));
            }
        }
        Ok(())
    }

    /// Request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

fn default_table() -> String {
    "stands".to_string()
}

fn default_request_timeout() -> u64 {
    10
}
