//! Collaborator traits.
//!
//! The hub, the business logic, and the backing store only know each other
//! through these capabilities, so each can be swapped for a test double.

pub mod notifier;
pub mod repository;
pub mod service;

pub use notifier::Notifier;
pub use repository::StandRepository;
pub use service::StandUpdater;
