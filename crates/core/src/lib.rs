//! Shared primitives for all Rust crates in Auditscope.

#![forbid(unsafe_code)]

/// Caller authorization primitives shared across crates.
pub mod auth;

use thiserror::Error;

pub use auth::CallerRole;

/// Result type used across Auditscope crates.
pub type AppResult<T> = Result<T, AppError>;

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Caller is not authenticated against the remote service.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Caller is authenticated but blocked by the access policy.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Remote service call failed or returned an unusable response.
    #[error("remote error: {0}")]
    Remote(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}
