//! Well-known system permissions.

use crate::permission::{PermissionId, PermissionName};
use crate::resource::ResourceId;

const SYSTEM_RESOURCE: &str = "Identity";

/// Permission required to create a resource: `Identity.CreateResource`.
pub fn create_resource_permission() -> PermissionId {
    system_permission("CreateResource")
}

fn system_permission(name: &str) -> PermissionId {
    // Both components are static, known-valid literals.
    let resource = ResourceId::new(SYSTEM_RESOURCE)
        .unwrap_or_else(|_| unreachable!("system resource id is valid"));
    let name = PermissionName::new(name)
        .unwrap_or_else(|_| unreachable!("system permission name is valid"));
    PermissionId::new(resource, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_resource_permission_is_namespaced_under_identity() {
        assert_eq!(
            create_resource_permission().to_string(),
            "Identity.CreateResource"
        );
    }
}
