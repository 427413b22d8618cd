//! Application error types

use thiserror::Error;

use crate::builder::BuildError;
use crate::ports::StoreError;
use crate::stores::EnvironmentError;

/// Application-level errors.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// The request could not be assembled.
    #[error(transparent)]
    Build(#[from] BuildError),

    /// A persistence operation failed.
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    /// An environment operation was rejected.
    #[error(transparent)]
    Environment(#[from] EnvironmentError),

    /// The requested history entry does not exist.
    #[error("history entry not found: {0}")]
    HistoryNotFound(String),
}

/// Result type alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
