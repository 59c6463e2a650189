//! Authorization code issuance and redemption.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use authforge_core::DomainError;
use authforge_identity::{ApplicationId, PermissionId};
use authforge_tokens::{AuthorizationCode, AuthorizationCodeId, Code, CodeHasher};

use crate::error::ServiceError;
use crate::repository::UnitOfWork;

pub struct AuthorizationCodeService {
    uow: Arc<dyn UnitOfWork>,
    hasher: Arc<dyn CodeHasher>,
}

impl AuthorizationCodeService {
    pub fn new(uow: Arc<dyn UnitOfWork>, hasher: Arc<dyn CodeHasher>) -> Self {
        Self { uow, hasher }
    }

    /// Issue a short-lived single-use code granting `permissions` to
    /// `application_id`. Returns the plaintext code; only the hash is
    /// persisted.
    pub async fn issue(
        &self,
        application_id: ApplicationId,
        permissions: HashSet<PermissionId>,
        now: DateTime<Utc>,
    ) -> Result<Code, ServiceError> {
        if self.uow.applications().get(&application_id).await?.is_none() {
            return Err(DomainError::not_found(format!("application '{application_id}'")).into());
        }

        let (aggregate, code) =
            AuthorizationCode::generate(application_id, permissions, self.hasher.as_ref(), now)?;

        let tx = self.uow.begin();
        self.uow.authorization_codes().add(aggregate).await?;
        tx.commit()?;

        tracing::info!(application_id = %application_id, "authorization code issued");
        Ok(code)
    }

    /// Redeem a code presented by a client, returning the permissions it
    /// granted. Single-use: a second redemption fails.
    pub async fn redeem(
        &self,
        code: &Code,
        application_id: ApplicationId,
        now: DateTime<Utc>,
    ) -> Result<HashSet<PermissionId>, ServiceError> {
        let id = AuthorizationCodeId::new(self.hasher.hash(code), application_id);
        let mut aggregate = self
            .uow
            .authorization_codes()
            .get(&id)
            .await?
            .ok_or_else(|| DomainError::not_found("authorization code".to_string()))?;

        aggregate.redeem(now)?;
        let permissions = aggregate.permissions().clone();

        let tx = self.uow.begin();
        self.uow.authorization_codes().save(aggregate).await?;
        tx.commit()?;

        tracing::info!(application_id = %application_id, "authorization code redeemed");
        Ok(permissions)
    }
}
