//! Convenience result type alias for StandHub.

use crate::error::AppError;

/// A specialized `Result` type for StandHub operations.
pub type AppResult<T> = Result<T, AppError>;
