//! Convenience result type alias for EventSphere.

use crate::error::AppError;

/// A specialized `Result` type for EventSphere operations.
pub type AppResult<T> = Result<T, AppError>;
