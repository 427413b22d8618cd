//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur during validation or processing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The HTTP method is not supported.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// The body type tag is not one of the known kinds.
    #[error("unsupported body type: {0}")]
    UnsupportedBodyType(String),

    /// The auth mode tag is not one of the known kinds.
    #[error("unsupported auth mode: {0}")]
    UnsupportedAuthMode(String),

    /// An environment name is empty or otherwise unusable.
    #[error("invalid environment name: {0:?}")]
    InvalidEnvironmentName(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
