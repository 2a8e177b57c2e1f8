//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur during validation or construction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The provided URL is invalid or malformed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The HTTP method is not supported by the harness.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// A header name or value is invalid.
    #[error("invalid header: {0}")]
    InvalidHeader(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
