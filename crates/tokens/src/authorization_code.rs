//! Authorization code aggregate: a short-lived, single-use grant.
//!
//! State machine: *Issued* (used=false, not expired) → *Used* (terminal)
//! or *Expired* (terminal, computed from `expires_at` — never stored as a
//! flag).

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use authforge_core::{AggregateRoot, DomainError, DomainResult, Entity};
use authforge_identity::{ApplicationId, PermissionId};

use crate::code::{Code, CodeHasher, HashedCode};

/// Lifetime of an authorization code, in seconds.
pub const AUTHORIZATION_CODE_TTL_SECS: i64 = 60;

/// Identity of an authorization code: the code's hash plus the application
/// it was issued to. The plaintext code never appears here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AuthorizationCodeId {
    code: HashedCode,
    application_id: ApplicationId,
}

impl AuthorizationCodeId {
    pub fn new(code: HashedCode, application_id: ApplicationId) -> Self {
        Self {
            code,
            application_id,
        }
    }

    pub fn code(&self) -> &HashedCode {
        &self.code
    }

    pub fn application_id(&self) -> ApplicationId {
        self.application_id
    }
}

/// Redemption failure. Terminal for the call either way; never auto-retried.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationCodeError {
    #[error("authorization code has already been used")]
    AlreadyUsed,

    #[error("authorization code has expired")]
    Expired,
}

/// A single-use grant tied to an application and a set of permissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationCode {
    id: AuthorizationCodeId,
    expires_at: DateTime<Utc>,
    used: bool,
    permissions: HashSet<PermissionId>,
}

impl AuthorizationCode {
    /// Issue a fresh code for an application.
    ///
    /// Returns the aggregate (to persist — it carries only the hash) and
    /// the plaintext [`Code`] (to hand to the client, exactly once).
    ///
    /// A grant with zero scopes is meaningless, so an empty permission set
    /// is rejected outright.
    pub fn generate(
        application_id: ApplicationId,
        permissions: HashSet<PermissionId>,
        hasher: &dyn CodeHasher,
        now: DateTime<Utc>,
    ) -> DomainResult<(Self, Code)> {
        if permissions.is_empty() {
            return Err(DomainError::validation(
                "authorization code requires at least one permission",
            ));
        }

        let code = Code::generate();
        let aggregate = Self {
            id: AuthorizationCodeId::new(hasher.hash(&code), application_id),
            expires_at: now + Duration::seconds(AUTHORIZATION_CODE_TTL_SECS),
            used: false,
            permissions,
        };
        Ok((aggregate, code))
    }

    /// Rehydrate a persisted aggregate.
    pub fn restore(
        id: AuthorizationCodeId,
        expires_at: DateTime<Utc>,
        used: bool,
        permissions: HashSet<PermissionId>,
    ) -> DomainResult<Self> {
        if permissions.is_empty() {
            return Err(DomainError::validation(
                "authorization code requires at least one permission",
            ));
        }
        Ok(Self {
            id,
            expires_at,
            used,
            permissions,
        })
    }

    /// Consume the code.
    ///
    /// The used check runs before the expiry check so a replayed code is
    /// reported as already-used rather than masked by an expiry message.
    /// On expiry the `used` flag is left untouched.
    pub fn redeem(&mut self, now: DateTime<Utc>) -> Result<(), AuthorizationCodeError> {
        if self.used {
            return Err(AuthorizationCodeError::AlreadyUsed);
        }
        if self.expires_at < now {
            return Err(AuthorizationCodeError::Expired);
        }
        self.used = true;
        Ok(())
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn used(&self) -> bool {
        self.used
    }

    pub fn permissions(&self) -> &HashSet<PermissionId> {
        &self.permissions
    }
}

impl Entity for AuthorizationCode {
    type Id = AuthorizationCodeId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl AggregateRoot for AuthorizationCode {}

#[cfg(test)]
mod tests {
    use authforge_identity::{PermissionName, ResourceId};

    use super::*;
    use crate::code::Sha256CodeHasher;

    fn perms() -> HashSet<PermissionId> {
        [PermissionId::new(
            ResourceId::new("Billing").unwrap(),
            PermissionName::new("Charge").unwrap(),
        )]
        .into()
    }

    fn generate(now: DateTime<Utc>) -> (AuthorizationCode, Code) {
        AuthorizationCode::generate(ApplicationId::new(), perms(), &Sha256CodeHasher, now).unwrap()
    }

    #[test]
    fn generate_issues_unused_code_with_sixty_second_lifetime() {
        let now = Utc::now();
        let (aggregate, code) = generate(now);

        assert!(!aggregate.used());
        assert_eq!(aggregate.expires_at(), now + Duration::seconds(60));
        assert_eq!(
            *aggregate.id().code(),
            Sha256CodeHasher.hash(&code),
            "stored identity must be the hash of the issued code"
        );
    }

    #[test]
    fn empty_permission_set_is_rejected() {
        let result = AuthorizationCode::generate(
            ApplicationId::new(),
            HashSet::new(),
            &Sha256CodeHasher,
            Utc::now(),
        );
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn second_redeem_fails_as_already_used() {
        let now = Utc::now();
        let (mut aggregate, _) = generate(now);

        aggregate.redeem(now).unwrap();
        assert!(aggregate.used());

        let err = aggregate.redeem(now).unwrap_err();
        assert_eq!(err, AuthorizationCodeError::AlreadyUsed);
    }

    #[test]
    fn redeem_after_expiry_fails_and_leaves_code_unused() {
        let now = Utc::now();
        let (mut aggregate, _) = generate(now);

        let err = aggregate.redeem(now + Duration::seconds(61)).unwrap_err();
        assert_eq!(err, AuthorizationCodeError::Expired);
        assert!(!aggregate.used());
    }

    #[test]
    fn used_wins_over_expired() {
        let now = Utc::now();
        let (mut aggregate, _) = generate(now);
        aggregate.redeem(now).unwrap();

        let err = aggregate.redeem(now + Duration::seconds(120)).unwrap_err();
        assert_eq!(err, AuthorizationCodeError::AlreadyUsed);
    }
}
