//! User management service.

use std::sync::Arc;

use chrono::Utc;

use authforge_core::{DomainError, Entity};
use authforge_events::EventScopeFactory;
use authforge_identity::{EmailAddress, HashedPassword, PermissionId, RoleId, User, UserId};

use crate::error::ServiceError;
use crate::repository::UnitOfWork;

const USER_AGGREGATE: &str = "user";

pub struct UserService {
    uow: Arc<dyn UnitOfWork>,
    scopes: EventScopeFactory,
}

impl UserService {
    pub fn new(uow: Arc<dyn UnitOfWork>, scopes: EventScopeFactory) -> Self {
        Self { uow, scopes }
    }

    pub async fn register(
        &self,
        email: EmailAddress,
        hashed_password: HashedPassword,
    ) -> Result<User, ServiceError> {
        let mut scope = self.scopes.begin();
        let (user, event) = User::create(UserId::new(), email, hashed_password, Utc::now());
        scope.record(USER_AGGREGATE, user.id(), &event)?;

        let tx = self.uow.begin();
        self.uow.users().add(user.clone()).await?;
        tx.commit()?;
        scope.publish()?;

        tracing::info!(user_id = %user.id(), "user registered");
        Ok(user)
    }

    pub async fn assign_role(&self, user_id: UserId, role_id: RoleId) -> Result<(), ServiceError> {
        let mut user = self.get_user(user_id).await?;
        if self.uow.roles().get(&role_id).await?.is_none() {
            return Err(DomainError::not_found(format!("role '{role_id}'")).into());
        }

        let mut scope = self.scopes.begin();
        let event = user.assign_role(role_id, Utc::now())?;
        scope.record(USER_AGGREGATE, user.id(), &event)?;

        let tx = self.uow.begin();
        self.uow.users().save(user).await?;
        tx.commit()?;
        scope.publish()?;
        Ok(())
    }

    /// Grant a permission directly to a user.
    pub async fn grant_permission(
        &self,
        user_id: UserId,
        permission: PermissionId,
    ) -> Result<(), ServiceError> {
        let mut user = self.get_user(user_id).await?;

        let mut scope = self.scopes.begin();
        let event = user.grant_permission(permission, Utc::now())?;
        scope.record(USER_AGGREGATE, user.id(), &event)?;

        let tx = self.uow.begin();
        self.uow.users().save(user).await?;
        tx.commit()?;
        scope.publish()?;
        Ok(())
    }

    async fn get_user(&self, user_id: UserId) -> Result<User, ServiceError> {
        self.uow
            .users()
            .get(&user_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("user '{user_id}'")).into())
    }
}
