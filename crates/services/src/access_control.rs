//! Authorization resolution.

use std::sync::Arc;

use authforge_core::DomainError;
use authforge_identity::{PermissionHolder, PermissionId, UserId};

use crate::error::ServiceError;
use crate::repository::UnitOfWork;

/// Resolves whether a user holds a permission.
///
/// A permission is granted if held directly by the user **or** by any role
/// assigned to the user (union resolution). Checks have no side effects.
pub struct AccessControl {
    uow: Arc<dyn UnitOfWork>,
}

impl AccessControl {
    pub fn new(uow: Arc<dyn UnitOfWork>) -> Self {
        Self { uow }
    }

    /// Resolve the check; the user must exist.
    pub async fn is_permitted(
        &self,
        user_id: UserId,
        permission: &PermissionId,
    ) -> Result<bool, ServiceError> {
        let user = self
            .uow
            .users()
            .get(&user_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("user '{user_id}'")))?;

        if user.is_permitted_to(permission) {
            return Ok(true);
        }

        for role_id in user.roles() {
            if let Some(role) = self.uow.roles().get(role_id).await? {
                if role.is_permitted_to(permission) {
                    return Ok(true);
                }
            }
        }

        Ok(false)
    }

    /// Fail with `Unauthorized` unless the user holds the permission.
    pub async fn require(
        &self,
        user_id: UserId,
        permission: &PermissionId,
    ) -> Result<(), ServiceError> {
        if self.is_permitted(user_id, permission).await? {
            Ok(())
        } else {
            tracing::debug!(
                user_id = %user_id,
                permission = %permission,
                "authorization denied"
            );
            Err(DomainError::Unauthorized.into())
        }
    }
}
