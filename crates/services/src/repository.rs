//! Persistence boundary: repository and unit-of-work contracts.
//!
//! One repository per aggregate, with the minimal surface the services
//! need: `get`, `add`, and `save` where the aggregate mutates after
//! creation. No query/filter surface belongs to this core; richer
//! adapters live with the persistence layer that implements these traits.

use async_trait::async_trait;
use thiserror::Error;

use authforge_identity::{
    Application, ApplicationId, Permission, PermissionId, Resource, ResourceId, Role, RoleId,
    User, UserId,
};
use authforge_tokens::{AuthorizationCode, AuthorizationCodeId, EncryptedTokenValue, RefreshToken};

/// Infrastructure-level persistence failure.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("storage failure: {0}")]
    Storage(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get(&self, id: &UserId) -> RepositoryResult<Option<User>>;
    async fn add(&self, user: User) -> RepositoryResult<()>;
    async fn save(&self, user: User) -> RepositoryResult<()>;
}

#[async_trait]
pub trait RoleRepository: Send + Sync {
    async fn get(&self, id: &RoleId) -> RepositoryResult<Option<Role>>;
    async fn add(&self, role: Role) -> RepositoryResult<()>;
    async fn save(&self, role: Role) -> RepositoryResult<()>;
}

#[async_trait]
pub trait ResourceRepository: Send + Sync {
    async fn get(&self, id: &ResourceId) -> RepositoryResult<Option<Resource>>;
    async fn add(&self, resource: Resource) -> RepositoryResult<()>;
    async fn save(&self, resource: Resource) -> RepositoryResult<()>;
}

#[async_trait]
pub trait PermissionRepository: Send + Sync {
    async fn get(&self, id: &PermissionId) -> RepositoryResult<Option<Permission>>;
    async fn add(&self, permission: Permission) -> RepositoryResult<()>;
}

#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    async fn get(&self, id: &ApplicationId) -> RepositoryResult<Option<Application>>;
    async fn add(&self, application: Application) -> RepositoryResult<()>;
}

#[async_trait]
pub trait AuthorizationCodeRepository: Send + Sync {
    async fn get(&self, id: &AuthorizationCodeId) -> RepositoryResult<Option<AuthorizationCode>>;
    async fn add(&self, code: AuthorizationCode) -> RepositoryResult<()>;
    async fn save(&self, code: AuthorizationCode) -> RepositoryResult<()>;
}

/// Server-side single-use records for refresh tokens, keyed by the
/// distributed token value.
#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    async fn get(&self, value: &EncryptedTokenValue) -> RepositoryResult<Option<RefreshToken>>;
    async fn add(&self, token: RefreshToken) -> RepositoryResult<()>;
    async fn save(&self, token: RefreshToken) -> RepositoryResult<()>;
}

/// Transactional boundary around the repository operations of one
/// logical action. Dropping a scope without [`TransactionScope::commit`]
/// rolls the action back.
pub trait TransactionScope: Send {
    fn commit(self: Box<Self>) -> RepositoryResult<()>;
}

/// One repository accessor per aggregate kind plus the transaction seam.
pub trait UnitOfWork: Send + Sync {
    fn users(&self) -> &dyn UserRepository;
    fn roles(&self) -> &dyn RoleRepository;
    fn resources(&self) -> &dyn ResourceRepository;
    fn permissions(&self) -> &dyn PermissionRepository;
    fn applications(&self) -> &dyn ApplicationRepository;
    fn authorization_codes(&self) -> &dyn AuthorizationCodeRepository;
    fn refresh_tokens(&self) -> &dyn RefreshTokenRepository;

    fn begin(&self) -> Box<dyn TransactionScope>;
}
