//! Resource and permission management services.

use std::sync::Arc;

use chrono::Utc;

use authforge_core::{DomainError, Entity};
use authforge_identity::{
    Permission, PermissionName, Resource, ResourceId, UserId, system,
};
use authforge_events::EventScopeFactory;

use crate::access_control::AccessControl;
use crate::error::ServiceError;
use crate::repository::UnitOfWork;

const RESOURCE_AGGREGATE: &str = "resource";

/// Creates resources, gated on the `Identity.CreateResource` permission.
pub struct ResourceService {
    uow: Arc<dyn UnitOfWork>,
    scopes: EventScopeFactory,
    access: AccessControl,
}

impl ResourceService {
    pub fn new(uow: Arc<dyn UnitOfWork>, scopes: EventScopeFactory) -> Self {
        let access = AccessControl::new(Arc::clone(&uow));
        Self {
            uow,
            scopes,
            access,
        }
    }

    /// Create a resource on behalf of `acting_user`.
    ///
    /// The authorization check runs strictly first: an unauthorized caller
    /// causes no writes and no events.
    pub async fn create_resource(
        &self,
        acting_user: UserId,
        id: ResourceId,
        description: &str,
    ) -> Result<Resource, ServiceError> {
        self.access
            .require(acting_user, &system::create_resource_permission())
            .await?;

        if self.uow.resources().get(&id).await?.is_some() {
            return Err(DomainError::conflict(format!("resource '{id}' already exists")).into());
        }

        let mut scope = self.scopes.begin();
        let (resource, event) = Resource::create(id, description, Utc::now())?;
        scope.record(RESOURCE_AGGREGATE, resource.id(), &event)?;

        let tx = self.uow.begin();
        self.uow.resources().add(resource.clone()).await?;
        tx.commit()?;
        scope.publish()?;

        tracing::info!(resource_id = %resource.id(), "resource created");
        Ok(resource)
    }
}

/// Mints permissions under an existing resource's namespace.
pub struct PermissionService {
    uow: Arc<dyn UnitOfWork>,
    scopes: EventScopeFactory,
}

impl PermissionService {
    pub fn new(uow: Arc<dyn UnitOfWork>, scopes: EventScopeFactory) -> Self {
        Self { uow, scopes }
    }

    pub async fn create_permission(
        &self,
        resource_id: &ResourceId,
        name: PermissionName,
        description: &str,
    ) -> Result<Permission, ServiceError> {
        let mut resource = self
            .uow
            .resources()
            .get(resource_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("resource '{resource_id}'")))?;

        let mut scope = self.scopes.begin();
        let (permission, event) = resource.create_permission(name, description, Utc::now())?;
        scope.record(RESOURCE_AGGREGATE, resource.id(), &event)?;

        let tx = self.uow.begin();
        self.uow.permissions().add(permission.clone()).await?;
        self.uow.resources().save(resource).await?;
        tx.commit()?;
        scope.publish()?;

        tracing::info!(permission_id = %permission.id(), "permission created");
        Ok(permission)
    }
}
