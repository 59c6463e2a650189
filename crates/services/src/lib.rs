//! `authforge-services` — orchestration over the identity and token
//! domain models.
//!
//! Each service method follows the same shape: validate input values,
//! load aggregates through repository interfaces, invoke a lifecycle
//! operation, persist, and only then publish the buffered domain events.

pub mod access_control;
pub mod applications;
pub mod codes;
pub mod error;
pub mod memory;
pub mod repository;
pub mod resources;
pub mod roles;
pub mod tokens;
pub mod users;

pub use access_control::AccessControl;
pub use applications::ApplicationService;
pub use codes::AuthorizationCodeService;
pub use error::ServiceError;
pub use repository::{
    ApplicationRepository, AuthorizationCodeRepository, PermissionRepository, RefreshTokenRepository,
    RepositoryError, RepositoryResult, ResourceRepository, RoleRepository, TransactionScope,
    UnitOfWork, UserRepository,
};
pub use resources::{PermissionService, ResourceService};
pub use roles::RoleService;
pub use tokens::{TokenPair, TokenService};
pub use users::UserService;
