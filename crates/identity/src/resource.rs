//! Resource aggregate: the namespace that mints permissions.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use authforge_core::{AggregateRoot, DomainError, DomainResult, Entity, ValueObject};
use authforge_events::Event;

use crate::permission::{Permission, PermissionId, PermissionName};

/// Identifier of a protected resource.
///
/// Non-empty, ASCII-alphanumeric, no spaces; `Display` round-trips the
/// input (e.g. "Billing").
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn new(value: impl Into<String>) -> DomainResult<Self> {
        let value = value.into();
        if value.is_empty() || !value.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(DomainError::validation(format!(
                "resource id must be non-empty and alphanumeric: '{value}'"
            )));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl ValueObject for ResourceId {}

/// A protected resource.
///
/// # Invariants
/// - Description is non-empty.
/// - The resource is the only entity allowed to mint permissions under its
///   namespace; permission names are unique within it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    id: ResourceId,
    description: String,
    permissions: HashSet<PermissionId>,
}

impl Resource {
    /// Create a new resource, returning it together with the event it raises.
    pub fn create(
        id: ResourceId,
        description: impl Into<String>,
        now: DateTime<Utc>,
    ) -> DomainResult<(Self, ResourceEvent)> {
        let description = description.into();
        if description.trim().is_empty() {
            return Err(DomainError::validation("resource description cannot be empty"));
        }

        let resource = Self {
            id: id.clone(),
            description: description.clone(),
            permissions: HashSet::new(),
        };
        let event = ResourceEvent::Created(ResourceCreated {
            resource_id: id,
            description,
            occurred_at: now,
        });
        Ok((resource, event))
    }

    /// Mint a permission under this resource's namespace.
    ///
    /// Fails if a permission with the same name already exists here.
    pub fn create_permission(
        &mut self,
        name: PermissionName,
        description: impl Into<String>,
        now: DateTime<Utc>,
    ) -> DomainResult<(Permission, ResourceEvent)> {
        let permission_id = PermissionId::new(self.id.clone(), name);
        if !self.permissions.insert(permission_id.clone()) {
            return Err(DomainError::invariant(format!(
                "permission '{permission_id}' already exists"
            )));
        }

        let permission = Permission::new(permission_id.clone(), description)?;
        let event = ResourceEvent::PermissionCreated(PermissionCreated {
            permission_id,
            description: permission.description().to_string(),
            occurred_at: now,
        });
        Ok((permission, event))
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Identifiers of the permissions minted under this resource.
    pub fn permissions(&self) -> &HashSet<PermissionId> {
        &self.permissions
    }
}

impl Entity for Resource {
    type Id = ResourceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl AggregateRoot for Resource {}

/// Event emitted when a resource is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceCreated {
    pub resource_id: ResourceId,
    pub description: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event emitted when a permission is minted under a resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionCreated {
    pub permission_id: PermissionId,
    pub description: String,
    pub occurred_at: DateTime<Utc>,
}

/// All resource events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ResourceEvent {
    Created(ResourceCreated),
    PermissionCreated(PermissionCreated),
}

impl Event for ResourceEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ResourceEvent::Created(_) => "identity.resource.created",
            ResourceEvent::PermissionCreated(_) => "identity.resource.permission_created",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ResourceEvent::Created(e) => e.occurred_at,
            ResourceEvent::PermissionCreated(e) => e.occurred_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_id_round_trips_valid_input() {
        let id = ResourceId::new("Billing").unwrap();
        assert_eq!(id.to_string(), "Billing");
    }

    #[test]
    fn resource_id_rejects_empty_and_non_alphanumeric() {
        assert!(ResourceId::new("").is_err());
        assert!(ResourceId::new("with space").is_err());
        assert!(ResourceId::new("dash-ed").is_err());
    }

    #[test]
    fn create_resource_emits_created_event() {
        let (resource, event) =
            Resource::create(ResourceId::new("Billing").unwrap(), "Billing API", Utc::now())
                .unwrap();

        assert_eq!(resource.id().as_str(), "Billing");
        assert!(resource.permissions().is_empty());

        let ResourceEvent::Created(e) = &event else {
            panic!("expected ResourceCreated event");
        };
        assert_eq!(e.resource_id, *resource.id());
        assert_eq!(e.description, "Billing API");
    }

    #[test]
    fn create_resource_rejects_empty_description() {
        let result = Resource::create(ResourceId::new("Billing").unwrap(), "  ", Utc::now());
        assert!(result.is_err());
    }

    #[test]
    fn create_permission_mints_namespaced_id_and_event() {
        let (mut resource, _) =
            Resource::create(ResourceId::new("Billing").unwrap(), "desc", Utc::now()).unwrap();

        let (permission, event) = resource
            .create_permission(
                PermissionName::new("Charge").unwrap(),
                "desc2",
                Utc::now(),
            )
            .unwrap();

        assert_eq!(permission.id().to_string(), "Billing.Charge");
        assert!(resource.permissions().contains(permission.id()));

        let ResourceEvent::PermissionCreated(e) = &event else {
            panic!("expected PermissionCreated event");
        };
        assert_eq!(e.permission_id, *permission.id());
        assert_eq!(e.description, "desc2");
    }

    #[test]
    fn duplicate_permission_name_fails() {
        let (mut resource, _) =
            Resource::create(ResourceId::new("Billing").unwrap(), "desc", Utc::now()).unwrap();

        resource
            .create_permission(PermissionName::new("Charge").unwrap(), "desc", Utc::now())
            .unwrap();
        let err = resource
            .create_permission(PermissionName::new("Charge").unwrap(), "desc", Utc::now())
            .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }
}
