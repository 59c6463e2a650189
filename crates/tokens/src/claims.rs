//! Token claims: the structured payload a bearer token carries.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use authforge_identity::{ApplicationId, PermissionId};

/// Kind of a bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenType {
    Access,
    Refresh,
}

impl core::fmt::Display for TokenType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TokenType::Access => f.write_str("Access"),
            TokenType::Refresh => f.write_str("Refresh"),
        }
    }
}

/// The claims embedded in a token's encrypted identity.
///
/// A token is self-contained: decrypting its value recovers everything
/// needed for verification, with no server-side lookup (except the
/// single-use record kept for refresh tokens).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Unique id of this token issuance.
    pub id: Uuid,
    pub application_id: ApplicationId,
    pub token_type: TokenType,
    pub expires_at: DateTime<Utc>,
    pub permissions: BTreeSet<PermissionId>,
}

impl TokenClaims {
    pub fn new(
        application_id: ApplicationId,
        token_type: TokenType,
        expires_at: DateTime<Utc>,
        permissions: BTreeSet<PermissionId>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            application_id,
            token_type,
            expires_at,
            permissions,
        }
    }
}
