//! Application registration service.

use std::sync::Arc;

use chrono::Utc;

use authforge_core::{DomainError, Entity};
use authforge_events::EventScopeFactory;
use authforge_identity::{AbsoluteUrl, Application, ApplicationId, UserId};
use authforge_tokens::{Code, SecretKeyCipher};

use crate::error::ServiceError;
use crate::repository::UnitOfWork;

const APPLICATION_AGGREGATE: &str = "application";

/// Registers OAuth-style client applications.
pub struct ApplicationService {
    uow: Arc<dyn UnitOfWork>,
    scopes: EventScopeFactory,
    secret_cipher: Arc<SecretKeyCipher>,
}

impl ApplicationService {
    pub fn new(
        uow: Arc<dyn UnitOfWork>,
        scopes: EventScopeFactory,
        secret_cipher: Arc<SecretKeyCipher>,
    ) -> Self {
        Self {
            uow,
            scopes,
            secret_cipher,
        }
    }

    /// Register an application for `owner`.
    ///
    /// The generated secret is returned in plaintext exactly once; only
    /// its sealed form is stored on the aggregate.
    pub async fn register(
        &self,
        owner: UserId,
        name: &str,
        homepage_url: AbsoluteUrl,
        callback_url: AbsoluteUrl,
    ) -> Result<(Application, Code), ServiceError> {
        if self.uow.users().get(&owner).await?.is_none() {
            return Err(DomainError::not_found(format!("user '{owner}'")).into());
        }

        let secret = Code::generate();
        let sealed = self.secret_cipher.encrypt(&secret)?;

        let mut scope = self.scopes.begin();
        let (application, event) = Application::create(
            ApplicationId::new(),
            owner,
            name,
            homepage_url,
            callback_url,
            sealed,
            Utc::now(),
        )?;
        scope.record(APPLICATION_AGGREGATE, application.id(), &event)?;

        let tx = self.uow.begin();
        self.uow.applications().add(application.clone()).await?;
        tx.commit()?;
        scope.publish()?;

        tracing::info!(application_id = %application.id(), "application registered");
        Ok((application, secret))
    }
}
