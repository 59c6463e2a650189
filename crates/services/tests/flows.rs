//! End-to-end service flows over the in-memory adapters.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use chrono::{Duration, Utc};

use authforge_core::Entity;
use authforge_events::{EventScopeFactory, InMemoryDispatcher};
use authforge_identity::{
    AbsoluteUrl, EmailAddress, HashedPassword, PermissionName, ResourceId, User, system,
};
use authforge_services::{
    ApplicationService, AuthorizationCodeService, PermissionService, ResourceService,
    RoleService, ServiceError, TokenService, UnitOfWork, UserService,
    memory::InMemoryUnitOfWork,
};
use authforge_tokens::{
    AesGcmTokenCodec, SecretKeyCipher, Sha256CodeHasher, TokenType, TokenVerificationError,
};

struct Harness {
    uow: Arc<InMemoryUnitOfWork>,
    dispatcher: Arc<InMemoryDispatcher>,
    users: UserService,
    roles: RoleService,
    resources: ResourceService,
    permissions: PermissionService,
    applications: ApplicationService,
    codes: AuthorizationCodeService,
    tokens: TokenService,
}

impl Harness {
    fn new() -> Self {
        let uow: Arc<InMemoryUnitOfWork> = Arc::new(InMemoryUnitOfWork::new());
        let dispatcher = Arc::new(InMemoryDispatcher::new());
        let scopes = EventScopeFactory::new(dispatcher.clone());

        let uow_dyn: Arc<dyn UnitOfWork> = uow.clone();
        let key = AesGcmTokenCodec::generate_key();

        Self {
            users: UserService::new(uow_dyn.clone(), scopes.clone()),
            roles: RoleService::new(uow_dyn.clone(), scopes.clone()),
            resources: ResourceService::new(uow_dyn.clone(), scopes.clone()),
            permissions: PermissionService::new(uow_dyn.clone(), scopes.clone()),
            applications: ApplicationService::new(
                uow_dyn.clone(),
                scopes.clone(),
                Arc::new(SecretKeyCipher::new(key)),
            ),
            codes: AuthorizationCodeService::new(uow_dyn.clone(), Arc::new(Sha256CodeHasher)),
            tokens: TokenService::new(uow_dyn, Arc::new(AesGcmTokenCodec::new(key))),
            uow,
            dispatcher,
        }
    }

    async fn register_user(&self, email: &str) -> User {
        self.users
            .register(
                EmailAddress::new(email).unwrap(),
                HashedPassword::new("$argon2id$v=19$stub").unwrap(),
            )
            .await
            .unwrap()
    }

    async fn register_admin(&self, email: &str) -> User {
        let user = self.register_user(email).await;
        self.users
            .grant_permission(*user.id(), system::create_resource_permission())
            .await
            .unwrap();
        user
    }

    fn published(&self, event_type: &str) -> usize {
        self.dispatcher
            .dispatched()
            .iter()
            .filter(|e| e.event_type() == event_type)
            .count()
    }
}

#[tokio::test]
async fn unauthorized_resource_creation_writes_nothing() {
    let h = Harness::new();
    let user = h.register_user("plain@example.com").await;

    let id = ResourceId::new("Billing").unwrap();
    let err = h
        .resources
        .create_resource(*user.id(), id.clone(), "billing resources")
        .await
        .unwrap_err();

    assert!(err.is_unauthorized());
    assert!(h.uow.resources().get(&id).await.unwrap().is_none());
    assert_eq!(h.published("identity.resource.created"), 0);
}

#[tokio::test]
async fn authorized_resource_creation_publishes_one_event() {
    let h = Harness::new();
    let admin = h.register_admin("admin@example.com").await;

    let id = ResourceId::new("Billing").unwrap();
    let resource = h
        .resources
        .create_resource(*admin.id(), id.clone(), "billing resources")
        .await
        .unwrap();

    assert_eq!(*resource.id(), id);
    assert!(h.uow.resources().get(&id).await.unwrap().is_some());
    assert_eq!(h.published("identity.resource.created"), 1);
}

#[tokio::test]
async fn role_held_permission_authorizes_resource_creation() {
    let h = Harness::new();
    let user = h.register_user("operator@example.com").await;

    // The permission reaches the user only through the role.
    let role = h.roles.create_role("Operators", "resource admins").await.unwrap();
    h.roles
        .grant_permission(*role.id(), system::create_resource_permission())
        .await
        .unwrap();
    h.users.assign_role(*user.id(), *role.id()).await.unwrap();

    let id = ResourceId::new("Billing").unwrap();
    h.resources
        .create_resource(*user.id(), id.clone(), "billing resources")
        .await
        .unwrap();

    assert!(h.uow.resources().get(&id).await.unwrap().is_some());
    assert_eq!(h.published("identity.resource.created"), 1);
}

#[tokio::test]
async fn duplicate_resource_id_is_a_conflict() {
    let h = Harness::new();
    let admin = h.register_admin("admin@example.com").await;

    let id = ResourceId::new("Billing").unwrap();
    h.resources
        .create_resource(*admin.id(), id.clone(), "billing resources")
        .await
        .unwrap();

    let err = h
        .resources
        .create_resource(*admin.id(), id, "again")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Domain(authforge_core::DomainError::Conflict(_))
    ));
    assert_eq!(h.published("identity.resource.created"), 1);
}

#[tokio::test]
async fn permission_is_minted_under_its_resource() {
    let h = Harness::new();
    let admin = h.register_admin("admin@example.com").await;

    let id = ResourceId::new("Billing").unwrap();
    h.resources
        .create_resource(*admin.id(), id.clone(), "billing resources")
        .await
        .unwrap();

    let permission = h
        .permissions
        .create_permission(&id, PermissionName::new("Charge").unwrap(), "charge cards")
        .await
        .unwrap();

    assert_eq!(permission.id().to_string(), "Billing.Charge");
    assert_eq!(h.published("identity.resource.permission_created"), 1);
    assert!(
        h.uow
            .permissions()
            .get(permission.id())
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn code_grant_flows_into_a_verified_access_token() {
    let h = Harness::new();
    let admin = h.register_admin("admin@example.com").await;

    let resource_id = ResourceId::new("Billing").unwrap();
    h.resources
        .create_resource(*admin.id(), resource_id.clone(), "billing resources")
        .await
        .unwrap();
    let permission = h
        .permissions
        .create_permission(
            &resource_id,
            PermissionName::new("Charge").unwrap(),
            "charge cards",
        )
        .await
        .unwrap();

    let (application, _secret) = h
        .applications
        .register(
            *admin.id(),
            "Acme Console",
            AbsoluteUrl::new("https://acme.example").unwrap(),
            AbsoluteUrl::new("https://acme.example/callback").unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(h.published("identity.application.registered"), 1);

    let now = Utc::now();
    let wanted: HashSet<_> = [permission.id().clone()].into();
    let code = h
        .codes
        .issue(*application.id(), wanted.clone(), now)
        .await
        .unwrap();

    let granted = h.codes.redeem(&code, *application.id(), now).await.unwrap();
    assert_eq!(granted, wanted);

    let pair = h
        .tokens
        .issue(*application.id(), granted.into_iter().collect(), now, None)
        .await
        .unwrap();

    let claims = h.tokens.verify_access(pair.access, now).await.unwrap();
    assert_eq!(claims.application_id, *application.id());
    assert_eq!(claims.token_type, TokenType::Access);
    assert!(claims.permissions.contains(permission.id()));
}

#[tokio::test]
async fn authorization_code_is_single_use() {
    let h = Harness::new();
    let admin = h.register_admin("admin@example.com").await;
    let (application, _) = h
        .applications
        .register(
            *admin.id(),
            "Acme Console",
            AbsoluteUrl::new("https://acme.example").unwrap(),
            AbsoluteUrl::new("https://acme.example/callback").unwrap(),
        )
        .await
        .unwrap();

    let now = Utc::now();
    let permissions: HashSet<_> = [system::create_resource_permission()].into();
    let code = h
        .codes
        .issue(*application.id(), permissions, now)
        .await
        .unwrap();

    h.codes.redeem(&code, *application.id(), now).await.unwrap();
    let err = h
        .codes
        .redeem(&code, *application.id(), now)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::AuthorizationCode(_)));
}

#[tokio::test]
async fn expired_authorization_code_is_rejected() {
    let h = Harness::new();
    let admin = h.register_admin("admin@example.com").await;
    let (application, _) = h
        .applications
        .register(
            *admin.id(),
            "Acme Console",
            AbsoluteUrl::new("https://acme.example").unwrap(),
            AbsoluteUrl::new("https://acme.example/callback").unwrap(),
        )
        .await
        .unwrap();

    let issued_at = Utc::now();
    let permissions: HashSet<_> = [system::create_resource_permission()].into();
    let code = h
        .codes
        .issue(*application.id(), permissions, issued_at)
        .await
        .unwrap();

    let err = h
        .codes
        .redeem(&code, *application.id(), issued_at + Duration::seconds(61))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::AuthorizationCode(
            authforge_tokens::AuthorizationCodeError::Expired
        )
    ));
}

#[tokio::test]
async fn refresh_rotates_the_pair_and_burns_the_old_token() {
    let h = Harness::new();
    let admin = h.register_admin("admin@example.com").await;
    let (application, _) = h
        .applications
        .register(
            *admin.id(),
            "Acme Console",
            AbsoluteUrl::new("https://acme.example").unwrap(),
            AbsoluteUrl::new("https://acme.example/callback").unwrap(),
        )
        .await
        .unwrap();

    let now = Utc::now();
    let permissions: BTreeSet<_> = [system::create_resource_permission()].into();
    let pair = h
        .tokens
        .issue(*application.id(), permissions, now, None)
        .await
        .unwrap();

    let rotated = h
        .tokens
        .refresh(pair.refresh.clone(), now)
        .await
        .unwrap();
    assert_ne!(rotated.refresh, pair.refresh);

    let claims = h
        .tokens
        .verify_access(rotated.access, now)
        .await
        .unwrap();
    assert_eq!(claims.application_id, *application.id());

    let err = h.tokens.refresh(pair.refresh, now).await.unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Verification(TokenVerificationError::AlreadyUsed)
    ));
}

#[tokio::test]
async fn expired_access_token_fails_verification() {
    let h = Harness::new();
    let admin = h.register_admin("admin@example.com").await;
    let (application, _) = h
        .applications
        .register(
            *admin.id(),
            "Acme Console",
            AbsoluteUrl::new("https://acme.example").unwrap(),
            AbsoluteUrl::new("https://acme.example/callback").unwrap(),
        )
        .await
        .unwrap();

    let issued_at = Utc::now();
    let permissions: BTreeSet<_> = [system::create_resource_permission()].into();
    let pair = h
        .tokens
        .issue(*application.id(), permissions, issued_at, None)
        .await
        .unwrap();

    let err = h
        .tokens
        .verify_access(pair.access, issued_at + Duration::hours(2))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Verification(TokenVerificationError::Expired)
    ));
}
