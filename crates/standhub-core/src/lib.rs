//! # standhub-core
//!
//! Core crate for StandHub. Contains configuration schemas, the stand
//! identifier and snapshot types, the collaborator traits shared by the
//! store, service, and realtime crates, and the unified error system.
//!
//! This crate has **no** internal dependencies on other StandHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
