//! Service-level error type.

use thiserror::Error;

use authforge_core::DomainError;
use authforge_events::DispatchError;
use authforge_tokens::{AuthorizationCodeError, CodecError, TokenVerificationError};

use crate::repository::RepositoryError;

/// Any failure a service operation can surface.
///
/// Domain failures pass through untouched so callers can distinguish
/// validation, not-found, state-conflict and unauthorized conditions;
/// mapping them to user-visible responses is the API layer's concern.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    AuthorizationCode(#[from] AuthorizationCodeError),

    #[error(transparent)]
    Verification(#[from] TokenVerificationError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

impl ServiceError {
    /// True when the failure is the domain-level unauthorized condition.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ServiceError::Domain(DomainError::Unauthorized))
    }

    /// True when the failure is a domain-level not-found condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::Domain(DomainError::NotFound(_)))
    }
}
