//! `authforge-identity` — the identity/authorization domain model.
//!
//! Users, roles, resources, permissions and registered applications, with
//! strongly validated value primitives and creation factories that hand
//! back the domain events they raise. This crate is intentionally
//! decoupled from storage, transport and cryptography.

pub mod application;
pub mod permission;
pub mod resource;
pub mod role;
pub mod system;
pub mod user;
pub mod values;

pub use application::{Application, ApplicationEvent, ApplicationId};
pub use permission::{Permission, PermissionHolder, PermissionId, PermissionName};
pub use resource::{Resource, ResourceEvent, ResourceId};
pub use role::{Role, RoleEvent, RoleId};
pub use user::{User, UserEvent, UserId};
pub use values::{AbsoluteUrl, EmailAddress, EncryptedSecretKey, HashedPassword};
