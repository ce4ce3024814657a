//! # standhub-store
//!
//! Backing store providers for the stand collection. The remote provider
//! talks to a Supabase (PostgREST) table over HTTP; the memory provider
//! keeps rows in-process for local development and tests.

pub mod memory;
pub mod provider;
pub mod supabase;

pub use memory::MemoryStandRepository;
pub use provider::build_repository;
pub use supabase::SupabaseStandRepository;
