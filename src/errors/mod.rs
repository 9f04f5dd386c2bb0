//! Centralized error handling for the candidate supply pipeline.
//!
//! Each layer (catalog client, strategies, queue, suggestions) returns
//! `AppError` or a more specific variant that converts into it via `?`.

pub mod types;

pub use types::*;

/// Convenience alias for `Result<T, AppError>`.
pub type AppResult<T> = Result<T, AppError>;
