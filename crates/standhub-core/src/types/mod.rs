//! Shared domain types.

pub mod stand;

pub use stand::{StandId, StandSnapshot};
