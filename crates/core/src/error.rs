//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Failure reported by an external store adapter.
///
/// Stores are collaborators; this is the only shape their failures take once
/// they cross into the domain.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A record with the same unique key already exists.
    #[error("duplicate key: {0}")]
    Duplicate(String),

    /// The backing store could not serve the request.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn duplicate(key: impl Into<String>) -> Self {
        Self::Duplicate(key.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}

/// Domain-level error.
///
/// Every variant is an expected, recoverable outcome that is reported to the
/// caller as a typed result.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation, or a referenced record has the wrong shape
    /// for the operation (e.g. issuing a credential to a non-student).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A referenced identity or record does not exist.
    #[error("not found")]
    NotFound,

    /// The requester's role does not permit the operation.
    #[error("forbidden")]
    Forbidden,

    /// The backing store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }
}
