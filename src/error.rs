//! Error types for s3nav.

use thiserror::Error;

use crate::auth::AuthError;
use crate::storage::StoreError;

/// Common error type for s3nav.
#[derive(Error, Debug)]
pub enum NavError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Object store error.
    ///
    /// Store "not found" conditions are mapped to [`NavError::NotFound`] by the
    /// storage service before they get here.
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    /// Authentication or directory error.
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Target already exists.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for s3nav operations.
pub type Result<T> = std::result::Result<T, NavError>;
