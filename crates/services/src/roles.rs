//! Role management service.

use std::sync::Arc;

use chrono::Utc;

use authforge_core::{DomainError, Entity};
use authforge_events::EventScopeFactory;
use authforge_identity::{PermissionId, Role, RoleId};

use crate::error::ServiceError;
use crate::repository::UnitOfWork;

const ROLE_AGGREGATE: &str = "role";

pub struct RoleService {
    uow: Arc<dyn UnitOfWork>,
    scopes: EventScopeFactory,
}

impl RoleService {
    pub fn new(uow: Arc<dyn UnitOfWork>, scopes: EventScopeFactory) -> Self {
        Self { uow, scopes }
    }

    pub async fn create_role(
        &self,
        name: &str,
        description: &str,
    ) -> Result<Role, ServiceError> {
        let mut scope = self.scopes.begin();
        let (role, event) = Role::create(RoleId::new(), name, description, Utc::now())?;
        scope.record(ROLE_AGGREGATE, role.id(), &event)?;

        let tx = self.uow.begin();
        self.uow.roles().add(role.clone()).await?;
        tx.commit()?;
        scope.publish()?;

        tracing::info!(role_id = %role.id(), "role created");
        Ok(role)
    }

    pub async fn grant_permission(
        &self,
        role_id: RoleId,
        permission: PermissionId,
    ) -> Result<(), ServiceError> {
        let mut role = self
            .uow
            .roles()
            .get(&role_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("role '{role_id}'")))?;

        let mut scope = self.scopes.begin();
        let event = role.grant_permission(permission, Utc::now())?;
        scope.record(ROLE_AGGREGATE, role.id(), &event)?;

        let tx = self.uow.begin();
        self.uow.roles().save(role).await?;
        tx.commit()?;
        scope.publish()?;
        Ok(())
    }

    pub async fn withdraw_permission(
        &self,
        role_id: RoleId,
        permission: &PermissionId,
    ) -> Result<(), ServiceError> {
        let mut role = self
            .uow
            .roles()
            .get(&role_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("role '{role_id}'")))?;

        let mut scope = self.scopes.begin();
        let event = role.withdraw_permission(permission, Utc::now())?;
        scope.record(ROLE_AGGREGATE, role.id(), &event)?;

        let tx = self.uow.begin();
        self.uow.roles().save(role).await?;
        tx.commit()?;
        scope.publish()?;
        Ok(())
    }
}
