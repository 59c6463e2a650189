//! User aggregate.
//!
//! A user holds permissions through two paths: directly, and through the
//! roles assigned to it. Resolution of the union happens in the access
//! control service; this aggregate only owns the memberships.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use authforge_core::{AggregateRoot, DomainError, DomainResult, Entity, impl_uuid_id};
use authforge_events::Event;

use crate::permission::{PermissionHolder, PermissionId};
use crate::role::RoleId;
use crate::values::{EmailAddress, HashedPassword};

/// Unique identifier for a user.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl_uuid_id!(UserId, "UserId");

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    email: EmailAddress,
    hashed_password: HashedPassword,
    roles: HashSet<RoleId>,
    permissions: HashSet<PermissionId>,
}

impl User {
    /// Create a new user, returning it together with the event it raises.
    pub fn create(
        id: UserId,
        email: EmailAddress,
        hashed_password: HashedPassword,
        now: DateTime<Utc>,
    ) -> (Self, UserEvent) {
        let user = Self {
            id,
            email: email.clone(),
            hashed_password,
            roles: HashSet::new(),
            permissions: HashSet::new(),
        };
        let event = UserEvent::Created(UserCreated {
            user_id: id,
            email,
            occurred_at: now,
        });
        (user, event)
    }

    /// Assign a role to this user. Assigning the same role twice fails.
    pub fn assign_role(&mut self, role_id: RoleId, now: DateTime<Utc>) -> DomainResult<UserEvent> {
        if !self.roles.insert(role_id) {
            return Err(DomainError::invariant(format!(
                "role '{role_id}' already assigned"
            )));
        }
        Ok(UserEvent::RoleAssigned(UserRoleAssigned {
            user_id: self.id,
            role_id,
            occurred_at: now,
        }))
    }

    /// Remove a role from this user. Removing a role that is not assigned fails.
    pub fn remove_role(&mut self, role_id: &RoleId, now: DateTime<Utc>) -> DomainResult<UserEvent> {
        if !self.roles.remove(role_id) {
            return Err(DomainError::invariant(format!(
                "role '{role_id}' not assigned"
            )));
        }
        Ok(UserEvent::RoleRemoved(UserRoleRemoved {
            user_id: self.id,
            role_id: *role_id,
            occurred_at: now,
        }))
    }

    /// Grant a permission directly to this user.
    pub fn grant_permission(
        &mut self,
        permission: PermissionId,
        now: DateTime<Utc>,
    ) -> DomainResult<UserEvent> {
        self.obtain_permission(permission.clone())?;
        Ok(UserEvent::PermissionObtained(UserPermissionObtained {
            user_id: self.id,
            permission_id: permission,
            occurred_at: now,
        }))
    }

    /// Withdraw a directly held permission.
    pub fn withdraw_permission(
        &mut self,
        permission: &PermissionId,
        now: DateTime<Utc>,
    ) -> DomainResult<UserEvent> {
        self.revoke_permission(permission)?;
        Ok(UserEvent::PermissionRevoked(UserPermissionRevoked {
            user_id: self.id,
            permission_id: permission.clone(),
            occurred_at: now,
        }))
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub fn hashed_password(&self) -> &HashedPassword {
        &self.hashed_password
    }

    /// Roles assigned to this user.
    pub fn roles(&self) -> &HashSet<RoleId> {
        &self.roles
    }
}

impl PermissionHolder for User {
    fn permissions(&self) -> &HashSet<PermissionId> {
        &self.permissions
    }

    fn permissions_mut(&mut self) -> &mut HashSet<PermissionId> {
        &mut self.permissions
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl AggregateRoot for User {}

/// Event emitted when a user is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreated {
    pub user_id: UserId,
    pub email: EmailAddress,
    pub occurred_at: DateTime<Utc>,
}

/// Event emitted when a role is assigned to a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRoleAssigned {
    pub user_id: UserId,
    pub role_id: RoleId,
    pub occurred_at: DateTime<Utc>,
}

/// Event emitted when a role is removed from a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRoleRemoved {
    pub user_id: UserId,
    pub role_id: RoleId,
    pub occurred_at: DateTime<Utc>,
}

/// Event emitted when a user obtains a direct permission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPermissionObtained {
    pub user_id: UserId,
    pub permission_id: PermissionId,
    pub occurred_at: DateTime<Utc>,
}

/// Event emitted when a direct permission is revoked from a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPermissionRevoked {
    pub user_id: UserId,
    pub permission_id: PermissionId,
    pub occurred_at: DateTime<Utc>,
}

/// All user events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum UserEvent {
    Created(UserCreated),
    RoleAssigned(UserRoleAssigned),
    RoleRemoved(UserRoleRemoved),
    PermissionObtained(UserPermissionObtained),
    PermissionRevoked(UserPermissionRevoked),
}

impl Event for UserEvent {
    fn event_type(&self) -> &'static str {
        match self {
            UserEvent::Created(_) => "identity.user.created",
            UserEvent::RoleAssigned(_) => "identity.user.role_assigned",
            UserEvent::RoleRemoved(_) => "identity.user.role_removed",
            UserEvent::PermissionObtained(_) => "identity.user.permission_obtained",
            UserEvent::PermissionRevoked(_) => "identity.user.permission_revoked",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            UserEvent::Created(e) => e.occurred_at,
            UserEvent::RoleAssigned(e) => e.occurred_at,
            UserEvent::RoleRemoved(e) => e.occurred_at,
            UserEvent::PermissionObtained(e) => e.occurred_at,
            UserEvent::PermissionRevoked(e) => e.occurred_at,
        }
    }
}
