//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic business failures: malformed values,
/// violated invariants, missing aggregates, state conflicts. Infrastructure
/// failures (storage, transport) live in their own error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation at construction (malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A domain invariant was violated (invalid state transition,
    /// duplicate grant, revoking a permission that was never held, ...).
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An identifier could not be parsed.
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A referenced aggregate does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A conflicting aggregate already exists.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The acting user does not hold the required permission.
    #[error("unauthorized")]
    Unauthorized,
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}
