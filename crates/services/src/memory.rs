//! In-memory persistence adapters for tests and dev wiring.
//!
//! Writes apply immediately; the transaction scope is therefore a no-op
//! commit. A real storage adapter supplies genuine transactional
//! semantics behind the same traits.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Mutex;

use async_trait::async_trait;

use authforge_identity::{
    Application, ApplicationId, Permission, PermissionId, Resource, ResourceId, Role, RoleId,
    User, UserId,
};
use authforge_tokens::{AuthorizationCode, AuthorizationCodeId, EncryptedTokenValue, RefreshToken};

use crate::repository::{
    ApplicationRepository, AuthorizationCodeRepository, PermissionRepository, RefreshTokenRepository,
    RepositoryError, RepositoryResult, ResourceRepository, RoleRepository, TransactionScope,
    UnitOfWork, UserRepository,
};

#[derive(Debug)]
struct Table<K, V> {
    rows: Mutex<HashMap<K, V>>,
}

impl<K, V> Default for Table<K, V> {
    fn default() -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
        }
    }
}

impl<K, V> Table<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn get(&self, key: &K) -> RepositoryResult<Option<V>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn add(&self, key: K, value: V) -> RepositoryResult<()> {
        let mut rows = self.lock()?;
        if rows.contains_key(&key) {
            return Err(RepositoryError::Storage("duplicate key on add".into()));
        }
        rows.insert(key, value);
        Ok(())
    }

    fn save(&self, key: K, value: V) -> RepositoryResult<()> {
        self.lock()?.insert(key, value);
        Ok(())
    }

    fn lock(&self) -> RepositoryResult<std::sync::MutexGuard<'_, HashMap<K, V>>> {
        self.rows
            .lock()
            .map_err(|_| RepositoryError::Storage("table lock poisoned".into()))
    }
}

macro_rules! in_memory_repository {
    ($repo:ident, $trait:ident, $id:ty, $aggregate:ty, $key:expr) => {
        #[derive(Debug, Default)]
        pub struct $repo {
            table: Table<$id, $aggregate>,
        }

        #[async_trait]
        impl $trait for $repo {
            async fn get(&self, id: &$id) -> RepositoryResult<Option<$aggregate>> {
                self.table.get(id)
            }

            async fn add(&self, aggregate: $aggregate) -> RepositoryResult<()> {
                self.table.add(($key)(&aggregate), aggregate)
            }

            async fn save(&self, aggregate: $aggregate) -> RepositoryResult<()> {
                self.table.save(($key)(&aggregate), aggregate)
            }
        }
    };
}

in_memory_repository!(InMemoryUsers, UserRepository, UserId, User, |u: &User| {
    *authforge_core::Entity::id(u)
});
in_memory_repository!(InMemoryRoles, RoleRepository, RoleId, Role, |r: &Role| {
    *authforge_core::Entity::id(r)
});
in_memory_repository!(
    InMemoryResources,
    ResourceRepository,
    ResourceId,
    Resource,
    |r: &Resource| authforge_core::Entity::id(r).clone()
);
in_memory_repository!(
    InMemoryAuthorizationCodes,
    AuthorizationCodeRepository,
    AuthorizationCodeId,
    AuthorizationCode,
    |c: &AuthorizationCode| *authforge_core::Entity::id(c)
);

#[derive(Debug, Default)]
pub struct InMemoryPermissions {
    table: Table<PermissionId, Permission>,
}

#[async_trait]
impl PermissionRepository for InMemoryPermissions {
    async fn get(&self, id: &PermissionId) -> RepositoryResult<Option<Permission>> {
        self.table.get(id)
    }

    async fn add(&self, permission: Permission) -> RepositoryResult<()> {
        self.table
            .add(authforge_core::Entity::id(&permission).clone(), permission)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryApplications {
    table: Table<ApplicationId, Application>,
}

#[async_trait]
impl ApplicationRepository for InMemoryApplications {
    async fn get(&self, id: &ApplicationId) -> RepositoryResult<Option<Application>> {
        self.table.get(id)
    }

    async fn add(&self, application: Application) -> RepositoryResult<()> {
        self.table
            .add(*authforge_core::Entity::id(&application), application)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryRefreshTokens {
    table: Table<EncryptedTokenValue, RefreshToken>,
}

#[async_trait]
impl RefreshTokenRepository for InMemoryRefreshTokens {
    async fn get(&self, value: &EncryptedTokenValue) -> RepositoryResult<Option<RefreshToken>> {
        self.table.get(value)
    }

    async fn add(&self, token: RefreshToken) -> RepositoryResult<()> {
        self.table.add(token.token_id().value().clone(), token)
    }

    async fn save(&self, token: RefreshToken) -> RepositoryResult<()> {
        self.table.save(token.token_id().value().clone(), token)
    }
}

struct AutocommitScope;

impl TransactionScope for AutocommitScope {
    fn commit(self: Box<Self>) -> RepositoryResult<()> {
        Ok(())
    }
}

/// All in-memory repositories behind one unit-of-work facade.
#[derive(Debug, Default)]
pub struct InMemoryUnitOfWork {
    users: InMemoryUsers,
    roles: InMemoryRoles,
    resources: InMemoryResources,
    permissions: InMemoryPermissions,
    applications: InMemoryApplications,
    authorization_codes: InMemoryAuthorizationCodes,
    refresh_tokens: InMemoryRefreshTokens,
}

impl InMemoryUnitOfWork {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UnitOfWork for InMemoryUnitOfWork {
    fn users(&self) -> &dyn UserRepository {
        &self.users
    }

    fn roles(&self) -> &dyn RoleRepository {
        &self.roles
    }

    fn resources(&self) -> &dyn ResourceRepository {
        &self.resources
    }

    fn permissions(&self) -> &dyn PermissionRepository {
        &self.permissions
    }

    fn applications(&self) -> &dyn ApplicationRepository {
        &self.applications
    }

    fn authorization_codes(&self) -> &dyn AuthorizationCodeRepository {
        &self.authorization_codes
    }

    fn refresh_tokens(&self) -> &dyn RefreshTokenRepository {
        &self.refresh_tokens
    }

    fn begin(&self) -> Box<dyn TransactionScope> {
        Box::new(AutocommitScope)
    }
}
