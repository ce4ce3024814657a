//! # standhub-service
//!
//! Business logic between the realtime hub / REST handlers and the backing
//! store. A successful mutation always ends with a full refreshed snapshot
//! pushed to the configured [`standhub_core::traits::Notifier`].

pub mod stand;

pub use stand::StandService;
