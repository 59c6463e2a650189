//! Role aggregate: a named, grantable permission holder.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use authforge_core::{AggregateRoot, DomainError, DomainResult, Entity, impl_uuid_id};
use authforge_events::Event;

use crate::permission::{PermissionHolder, PermissionId};

/// Unique identifier for a role.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleId(Uuid);

impl_uuid_id!(RoleId, "RoleId");

/// A role: a bundle of permissions assignable to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    id: RoleId,
    name: String,
    description: String,
    permissions: HashSet<PermissionId>,
}

impl Role {
    /// Create a new role, returning it together with the event it raises.
    pub fn create(
        id: RoleId,
        name: impl Into<String>,
        description: impl Into<String>,
        now: DateTime<Utc>,
    ) -> DomainResult<(Self, RoleEvent)> {
        let name = name.into();
        let description = description.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("role name cannot be empty"));
        }
        if description.trim().is_empty() {
            return Err(DomainError::validation("role description cannot be empty"));
        }

        let role = Self {
            id,
            name: name.clone(),
            description: description.clone(),
            permissions: HashSet::new(),
        };
        let event = RoleEvent::Created(RoleCreated {
            role_id: id,
            name,
            description,
            occurred_at: now,
        });
        Ok((role, event))
    }

    /// Grant a permission to this role.
    pub fn grant_permission(
        &mut self,
        permission: PermissionId,
        now: DateTime<Utc>,
    ) -> DomainResult<RoleEvent> {
        self.obtain_permission(permission.clone())?;
        Ok(RoleEvent::PermissionObtained(RolePermissionObtained {
            role_id: self.id,
            permission_id: permission,
            occurred_at: now,
        }))
    }

    /// Withdraw a previously granted permission.
    pub fn withdraw_permission(
        &mut self,
        permission: &PermissionId,
        now: DateTime<Utc>,
    ) -> DomainResult<RoleEvent> {
        self.revoke_permission(permission)?;
        Ok(RoleEvent::PermissionRevoked(RolePermissionRevoked {
            role_id: self.id,
            permission_id: permission.clone(),
            occurred_at: now,
        }))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl PermissionHolder for Role {
    fn permissions(&self) -> &HashSet<PermissionId> {
        &self.permissions
    }

    fn permissions_mut(&mut self) -> &mut HashSet<PermissionId> {
        &mut self.permissions
    }
}

impl Entity for Role {
    type Id = RoleId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl AggregateRoot for Role {}

/// Event emitted when a role is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleCreated {
    pub role_id: RoleId,
    pub name: String,
    pub description: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event emitted when a role obtains a permission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RolePermissionObtained {
    pub role_id: RoleId,
    pub permission_id: PermissionId,
    pub occurred_at: DateTime<Utc>,
}

/// Event emitted when a permission is revoked from a role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RolePermissionRevoked {
    pub role_id: RoleId,
    pub permission_id: PermissionId,
    pub occurred_at: DateTime<Utc>,
}

/// All role events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RoleEvent {
    Created(RoleCreated),
    PermissionObtained(RolePermissionObtained),
    PermissionRevoked(RolePermissionRevoked),
}

impl Event for RoleEvent {
    fn event_type(&self) -> &'static str {
        match self {
            RoleEvent::Created(_) => "identity.role.created",
            RoleEvent::PermissionObtained(_) => "identity.role.permission_obtained",
            RoleEvent::PermissionRevoked(_) => "identity.role.permission_revoked",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            RoleEvent::Created(e) => e.occurred_at,
            RoleEvent::PermissionObtained(e) => e.occurred_at,
            RoleEvent::PermissionRevoked(e) => e.occurred_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permission::PermissionName;
    use crate::resource::ResourceId;

    fn perm(name: &str) -> PermissionId {
        PermissionId::new(
            ResourceId::new("Billing").unwrap(),
            PermissionName::new(name).unwrap(),
        )
    }

    #[test]
    fn create_role_emits_event() {
        let id = RoleId::new();
        let (role, event) = Role::create(id, "Accountant", "Billing staff", Utc::now()).unwrap();

        assert_eq!(role.name(), "Accountant");
        let RoleEvent::Created(e) = &event else {
            panic!("expected RoleCreated event");
        };
        assert_eq!(e.role_id, id);
    }

    #[test]
    fn create_role_rejects_blank_name() {
        assert!(Role::create(RoleId::new(), " ", "desc", Utc::now()).is_err());
    }

    #[test]
    fn grant_and_withdraw_permission() {
        let (mut role, _) = Role::create(RoleId::new(), "Accountant", "desc", Utc::now()).unwrap();
        let p = perm("Charge");

        let event = role.grant_permission(p.clone(), Utc::now()).unwrap();
        assert!(role.is_permitted_to(&p));
        assert!(matches!(event, RoleEvent::PermissionObtained(_)));

        let event = role.withdraw_permission(&p, Utc::now()).unwrap();
        assert!(!role.is_permitted_to(&p));
        assert!(matches!(event, RoleEvent::PermissionRevoked(_)));
    }

    #[test]
    fn double_grant_fails_without_emitting() {
        let (mut role, _) = Role::create(RoleId::new(), "Accountant", "desc", Utc::now()).unwrap();
        let p = perm("Charge");

        role.grant_permission(p.clone(), Utc::now()).unwrap();
        assert!(role.grant_permission(p, Utc::now()).is_err());
    }
}
