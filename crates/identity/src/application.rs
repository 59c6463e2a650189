//! Application aggregate: an OAuth-style client registered by a user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use authforge_core::{AggregateRoot, DomainError, DomainResult, Entity, impl_uuid_id};
use authforge_events::Event;

use crate::user::UserId;
use crate::values::{AbsoluteUrl, EncryptedSecretKey};

/// Unique identifier for a registered application.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(Uuid);

impl_uuid_id!(ApplicationId, "ApplicationId");

/// A client application registered by a user.
///
/// The secret key is held encrypted at rest; the plaintext is handed to
/// the registering user exactly once, by the registration service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    id: ApplicationId,
    owner: UserId,
    name: String,
    homepage_url: AbsoluteUrl,
    callback_url: AbsoluteUrl,
    secret_key: EncryptedSecretKey,
}

impl Application {
    /// Register a new application, returning it together with the event it raises.
    pub fn create(
        id: ApplicationId,
        owner: UserId,
        name: impl Into<String>,
        homepage_url: AbsoluteUrl,
        callback_url: AbsoluteUrl,
        secret_key: EncryptedSecretKey,
        now: DateTime<Utc>,
    ) -> DomainResult<(Self, ApplicationEvent)> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("application name cannot be empty"));
        }

        let application = Self {
            id,
            owner,
            name: name.clone(),
            homepage_url: homepage_url.clone(),
            callback_url,
            secret_key,
        };
        let event = ApplicationEvent::Registered(ApplicationRegistered {
            application_id: id,
            owner,
            name,
            homepage_url,
            occurred_at: now,
        });
        Ok((application, event))
    }

    pub fn owner(&self) -> UserId {
        self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn homepage_url(&self) -> &AbsoluteUrl {
        &self.homepage_url
    }

    pub fn callback_url(&self) -> &AbsoluteUrl {
        &self.callback_url
    }

    pub fn secret_key(&self) -> &EncryptedSecretKey {
        &self.secret_key
    }
}

impl Entity for Application {
    type Id = ApplicationId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl AggregateRoot for Application {}

/// Event emitted when an application is registered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationRegistered {
    pub application_id: ApplicationId,
    pub owner: UserId,
    pub name: String,
    pub homepage_url: AbsoluteUrl,
    pub occurred_at: DateTime<Utc>,
}

/// All application events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ApplicationEvent {
    Registered(ApplicationRegistered),
}

impl Event for ApplicationEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ApplicationEvent::Registered(_) => "identity.application.registered",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ApplicationEvent::Registered(e) => e.occurred_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_application_emits_registered_event() {
        let id = ApplicationId::new();
        let owner = UserId::new();
        let (app, event) = Application::create(
            id,
            owner,
            "Billing Dashboard",
            AbsoluteUrl::new("https://billing.example.com").unwrap(),
            AbsoluteUrl::new("https://billing.example.com/oauth/callback").unwrap(),
            EncryptedSecretKey::new("agv1.c2VhbGVk").unwrap(),
            Utc::now(),
        )
        .unwrap();

        assert_eq!(app.owner(), owner);
        let ApplicationEvent::Registered(e) = &event;
        assert_eq!(e.application_id, id);
        assert_eq!(e.name, "Billing Dashboard");
    }

    #[test]
    fn create_application_rejects_blank_name() {
        let result = Application::create(
            ApplicationId::new(),
            UserId::new(),
            "  ",
            AbsoluteUrl::new("https://example.com").unwrap(),
            AbsoluteUrl::new("https://example.com/cb").unwrap(),
            EncryptedSecretKey::new("agv1.c2VhbGVk").unwrap(),
            Utc::now(),
        );
        assert!(result.is_err());
    }
}
