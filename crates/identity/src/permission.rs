//! Permissions and the permission-holder capability.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use authforge_core::{DomainError, DomainResult, Entity, ValueObject};

use crate::resource::ResourceId;

/// Name of a permission within its resource's namespace.
///
/// Non-empty, ASCII-alphanumeric only.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PermissionName(String);

impl PermissionName {
    pub fn new(value: impl Into<String>) -> DomainResult<Self> {
        let value = value.into();
        if value.is_empty() || !value.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(DomainError::validation(format!(
                "permission name must be non-empty and alphanumeric: '{value}'"
            )));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for PermissionName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl ValueObject for PermissionName {}

/// Composite permission identifier: `(resource, name)`.
///
/// Displayed as `"{resource}.{name}"` (e.g. "Billing.Charge"). Permissions
/// exist only under a resource's namespace; there is no standalone
/// permission identifier space.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct PermissionId {
    resource_id: ResourceId,
    name: PermissionName,
}

impl PermissionId {
    pub fn new(resource_id: ResourceId, name: PermissionName) -> Self {
        Self { resource_id, name }
    }

    pub fn resource_id(&self) -> &ResourceId {
        &self.resource_id
    }

    pub fn name(&self) -> &PermissionName {
        &self.name
    }
}

impl core::fmt::Display for PermissionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{}", self.resource_id, self.name)
    }
}

impl ValueObject for PermissionId {}

/// A permission definition.
///
/// Entity, not an aggregate: it is minted and owned by its resource (see
/// `Resource::create_permission`) and addressable only through it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    id: PermissionId,
    description: String,
}

impl Permission {
    pub(crate) fn new(id: PermissionId, description: impl Into<String>) -> DomainResult<Self> {
        let description = description.into();
        if description.trim().is_empty() {
            return Err(DomainError::validation("permission description cannot be empty"));
        }
        Ok(Self { id, description })
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl Entity for Permission {
    type Id = PermissionId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Capability shared by [`crate::User`] and [`crate::Role`]: owning and
/// mutating a set of permission identifiers.
///
/// Obtaining a permission twice, or revoking one that was never obtained,
/// is a caller error — not silently ignored.
pub trait PermissionHolder {
    fn permissions(&self) -> &HashSet<PermissionId>;

    fn permissions_mut(&mut self) -> &mut HashSet<PermissionId>;

    fn is_permitted_to(&self, permission: &PermissionId) -> bool {
        self.permissions().contains(permission)
    }

    fn obtain_permission(&mut self, permission: PermissionId) -> DomainResult<()> {
        if !self.permissions_mut().insert(permission.clone()) {
            return Err(DomainError::invariant(format!(
                "permission '{permission}' already held"
            )));
        }
        Ok(())
    }

    fn revoke_permission(&mut self, permission: &PermissionId) -> DomainResult<()> {
        if !self.permissions_mut().remove(permission) {
            return Err(DomainError::invariant(format!(
                "permission '{permission}' not held"
            )));
        }
        Ok(())
    }
}
