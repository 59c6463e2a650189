//! Validated value primitives shared by the identity aggregates.

use serde::{Deserialize, Serialize};

use authforge_core::{DomainError, DomainResult, ValueObject};

/// A normalized email address (trimmed, lowercased).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    pub fn new(value: impl AsRef<str>) -> DomainResult<Self> {
        let value = value.as_ref().trim().to_lowercase();
        if value.is_empty() || !value.contains('@') {
            return Err(DomainError::validation("invalid email format"));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl ValueObject for EmailAddress {}

/// An already-hashed password digest.
///
/// Password hashing itself happens at the application boundary; the domain
/// only refuses to hold an empty digest. The `Debug` impl is redacted so a
/// digest never lands in logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HashedPassword(String);

impl HashedPassword {
    pub fn new(digest: impl Into<String>) -> DomainResult<Self> {
        let digest = digest.into();
        if digest.trim().is_empty() {
            return Err(DomainError::validation("password digest cannot be empty"));
        }
        Ok(Self(digest))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("HashedPassword(..)")
    }
}

impl ValueObject for HashedPassword {}

/// An absolute http(s) URL (application homepage / OAuth callback).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AbsoluteUrl(String);

impl AbsoluteUrl {
    pub fn new(value: impl AsRef<str>) -> DomainResult<Self> {
        let value = value.as_ref().trim().to_string();
        let rest = value
            .strip_prefix("https://")
            .or_else(|| value.strip_prefix("http://"));
        match rest {
            Some(rest) if !rest.is_empty() => Ok(Self(value)),
            _ => Err(DomainError::validation(format!(
                "not an absolute http(s) url: '{value}'"
            ))),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for AbsoluteUrl {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl ValueObject for AbsoluteUrl {}

/// An application secret key at rest (AEAD ciphertext, base64).
///
/// Minted by the token crate's cipher; the identity layer stores it
/// without interpreting it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncryptedSecretKey(String);

impl EncryptedSecretKey {
    pub fn new(ciphertext: impl Into<String>) -> DomainResult<Self> {
        let ciphertext = ciphertext.into();
        if ciphertext.is_empty() {
            return Err(DomainError::validation("encrypted secret key cannot be empty"));
        }
        Ok(Self(ciphertext))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for EncryptedSecretKey {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_normalized() {
        let email = EmailAddress::new("  Alice@Example.COM ").unwrap();
        assert_eq!(email.as_str(), "alice@example.com");
    }

    #[test]
    fn email_requires_at_sign() {
        assert!(EmailAddress::new("alice.example.com").is_err());
        assert!(EmailAddress::new("   ").is_err());
    }

    #[test]
    fn url_requires_http_scheme() {
        assert!(AbsoluteUrl::new("https://example.com/cb").is_ok());
        assert!(AbsoluteUrl::new("http://localhost:8080").is_ok());
        assert!(AbsoluteUrl::new("ftp://example.com").is_err());
        assert!(AbsoluteUrl::new("https://").is_err());
        assert!(AbsoluteUrl::new("").is_err());
    }

    #[test]
    fn hashed_password_rejects_empty_and_redacts_debug() {
        assert!(HashedPassword::new("").is_err());
        let digest = HashedPassword::new("$argon2id$v=19$...").unwrap();
        assert_eq!(format!("{digest:?}"), "HashedPassword(..)");
    }
}
