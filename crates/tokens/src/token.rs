//! Token aggregate: access/refresh tokens whose identity is an encrypted
//! claims blob.
//!
//! A [`TokenId`] is "parse-on-construct": building one decrypts the value,
//! so a `TokenId` in hand always carries verifiable claims. Tampering or
//! an unknown scheme fails construction with a [`CodecError`].

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use thiserror::Error;

use authforge_core::{AggregateRoot, DomainError, DomainResult, Entity};
use authforge_identity::{ApplicationId, PermissionId};

use crate::claims::{TokenClaims, TokenType};
use crate::codec::{CodecError, EncryptedTokenValue, TokenCodec};

/// Self-describing token identifier: the encrypted value plus the claims
/// recovered from it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenId {
    value: EncryptedTokenValue,
    claims: TokenClaims,
}

impl TokenId {
    /// Parse an externally supplied token value.
    pub fn decode(
        value: EncryptedTokenValue,
        codec: &dyn TokenCodec,
    ) -> Result<Self, CodecError> {
        let claims = codec.decode(&value)?;
        Ok(Self { value, claims })
    }

    /// Encode freshly issued claims into a new token identity.
    pub fn issue(claims: TokenClaims, codec: &dyn TokenCodec) -> Result<Self, CodecError> {
        let value = codec.encode(&claims)?;
        Ok(Self { value, claims })
    }

    pub fn value(&self) -> &EncryptedTokenValue {
        &self.value
    }

    pub fn claims(&self) -> &TokenClaims {
        &self.claims
    }

    pub fn token_type(&self) -> TokenType {
        self.claims.token_type
    }

    pub fn application_id(&self) -> ApplicationId {
        self.claims.application_id
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.claims.expires_at
    }

    pub fn permissions(&self) -> &BTreeSet<PermissionId> {
        &self.claims.permissions
    }
}

/// Verification failure.
///
/// The two reasons drive different client remediation: an expired access
/// token is refreshed, a reused refresh token means the grant is revoked.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenVerificationError {
    #[error("token has already been used")]
    AlreadyUsed,

    #[error("token has expired")]
    Expired,
}

/// An access token. Construction rejects a refresh-typed identity, so a
/// refresh token can never pass where an access token is expected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    id: TokenId,
}

impl AccessToken {
    pub fn new(id: TokenId) -> DomainResult<Self> {
        if id.token_type() != TokenType::Access {
            return Err(DomainError::validation(format!(
                "expected an access token, got {}",
                id.token_type()
            )));
        }
        Ok(Self { id })
    }

    pub fn token_id(&self) -> &TokenId {
        &self.id
    }
}

/// A refresh token: single-use, with the `used` flag kept server-side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshToken {
    id: TokenId,
    used: bool,
}

impl RefreshToken {
    pub fn new(id: TokenId) -> DomainResult<Self> {
        Self::restore(id, false)
    }

    /// Rehydrate a persisted refresh token with its stored `used` flag.
    pub fn restore(id: TokenId, used: bool) -> DomainResult<Self> {
        if id.token_type() != TokenType::Refresh {
            return Err(DomainError::validation(format!(
                "expected a refresh token, got {}",
                id.token_type()
            )));
        }
        Ok(Self { id, used })
    }

    /// Consume the token. Fails on the second call.
    pub fn redeem(&mut self) -> Result<(), TokenVerificationError> {
        if self.used {
            return Err(TokenVerificationError::AlreadyUsed);
        }
        self.used = true;
        Ok(())
    }

    pub fn token_id(&self) -> &TokenId {
        &self.id
    }

    pub fn used(&self) -> bool {
        self.used
    }
}

/// A bearer token of either kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Access(AccessToken),
    Refresh(RefreshToken),
}

impl Token {
    /// Verify the token against `now`.
    ///
    /// The variant-specific check runs first and short-circuits: a reused
    /// refresh token reports [`TokenVerificationError::AlreadyUsed`] even
    /// when it is also expired, because the two failures drive different
    /// client remediation.
    pub fn verify(&self, now: DateTime<Utc>) -> Result<(), TokenVerificationError> {
        self.extra_verification()?;
        if self.token_id().expires_at() < now {
            return Err(TokenVerificationError::Expired);
        }
        Ok(())
    }

    fn extra_verification(&self) -> Result<(), TokenVerificationError> {
        match self {
            Token::Access(_) => Ok(()),
            Token::Refresh(token) if token.used() => Err(TokenVerificationError::AlreadyUsed),
            Token::Refresh(_) => Ok(()),
        }
    }

    pub fn token_id(&self) -> &TokenId {
        match self {
            Token::Access(token) => token.token_id(),
            Token::Refresh(token) => token.token_id(),
        }
    }
}

impl From<AccessToken> for Token {
    fn from(token: AccessToken) -> Self {
        Token::Access(token)
    }
}

impl From<RefreshToken> for Token {
    fn from(token: RefreshToken) -> Self {
        Token::Refresh(token)
    }
}

impl Entity for Token {
    type Id = EncryptedTokenValue;

    fn id(&self) -> &Self::Id {
        self.token_id().value()
    }
}

impl AggregateRoot for Token {}
