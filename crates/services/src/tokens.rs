//! Token issuance, verification, and refresh.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use authforge_core::DomainError;
use authforge_identity::{ApplicationId, PermissionId};
use authforge_tokens::{
    AccessToken, RefreshToken, Token, TokenClaims, TokenCodec, TokenId, TokenType,
    EncryptedTokenValue,
};

use crate::error::ServiceError;
use crate::repository::UnitOfWork;

pub const ACCESS_TOKEN_TTL_SECS: i64 = 3600;
pub const REFRESH_TOKEN_TTL_SECS: i64 = 30 * 24 * 3600;

/// The pair handed to a client after a grant: a short-lived access token
/// and the single-use refresh token that renews it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access: EncryptedTokenValue,
    pub refresh: EncryptedTokenValue,
}

/// Issues and verifies bearer tokens for an application.
pub struct TokenService {
    uow: Arc<dyn UnitOfWork>,
    codec: Arc<dyn TokenCodec>,
}

impl TokenService {
    pub fn new(uow: Arc<dyn UnitOfWork>, codec: Arc<dyn TokenCodec>) -> Self {
        Self { uow, codec }
    }

    /// Issue a fresh access/refresh pair carrying `permissions`.
    ///
    /// `refresh_expires_at` overrides the default refresh lifetime; a
    /// refresh rotation passes the old token's deadline through so the
    /// grant never outlives its original window.
    pub async fn issue(
        &self,
        application_id: ApplicationId,
        permissions: BTreeSet<PermissionId>,
        now: DateTime<Utc>,
        refresh_expires_at: Option<DateTime<Utc>>,
    ) -> Result<TokenPair, ServiceError> {
        let access_claims = TokenClaims::new(
            application_id,
            TokenType::Access,
            now + Duration::seconds(ACCESS_TOKEN_TTL_SECS),
            permissions.clone(),
        );
        let refresh_claims = TokenClaims::new(
            application_id,
            TokenType::Refresh,
            refresh_expires_at.unwrap_or(now + Duration::seconds(REFRESH_TOKEN_TTL_SECS)),
            permissions,
        );

        let access_id = TokenId::issue(access_claims, self.codec.as_ref())?;
        let refresh_id = TokenId::issue(refresh_claims, self.codec.as_ref())?;
        let refresh = RefreshToken::new(refresh_id)?;

        let pair = TokenPair {
            access: access_id.value().clone(),
            refresh: refresh.token_id().value().clone(),
        };

        let tx = self.uow.begin();
        self.uow.refresh_tokens().add(refresh).await?;
        tx.commit()?;

        tracing::info!(application_id = %application_id, "token pair issued");
        Ok(pair)
    }

    /// Verify an access token value and return the claims it carries.
    pub async fn verify_access(
        &self,
        value: EncryptedTokenValue,
        now: DateTime<Utc>,
    ) -> Result<TokenClaims, ServiceError> {
        let id = TokenId::decode(value, self.codec.as_ref())?;
        let token: Token = AccessToken::new(id)?.into();
        token.verify(now)?;
        Ok(token.token_id().claims().clone())
    }

    /// Exchange a refresh token for a new pair, consuming it.
    ///
    /// The replacement refresh token inherits the consumed token's
    /// expiry, so refreshing cannot extend the grant.
    pub async fn refresh(
        &self,
        value: EncryptedTokenValue,
        now: DateTime<Utc>,
    ) -> Result<TokenPair, ServiceError> {
        let id = TokenId::decode(value, self.codec.as_ref())?;
        let mut stored = self
            .uow
            .refresh_tokens()
            .get(id.value())
            .await?
            .ok_or_else(|| DomainError::not_found("refresh token".to_string()))?;

        Token::from(stored.clone()).verify(now)?;
        stored.redeem()?;

        let application_id = id.application_id();
        let permissions = id.permissions().clone();
        let expires_at = id.expires_at();

        let tx = self.uow.begin();
        self.uow.refresh_tokens().save(stored).await?;
        tx.commit()?;

        self.issue(application_id, permissions, now, Some(expires_at))
            .await
    }
}
