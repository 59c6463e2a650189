//! Token value encoding: claims ⇄ opaque encrypted string.
//!
//! The encoded string *is* the distributed bearer token. The scheme is
//! versioned by prefix so a value produced under a different (or tampered)
//! scheme is rejected as [`CodecError::UnknownScheme`], never silently
//! decoded with a fallback.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD as BASE64_URL;
use rand::RngCore;
use rand::rngs::OsRng;
use thiserror::Error;

use crate::claims::TokenClaims;

/// Scheme prefix for AES-256-GCM, version 1.
const SCHEME_PREFIX: &str = "agv1.";

const NONCE_LENGTH: usize = 12;

/// An encoded token value: the opaque string handed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EncryptedTokenValue(String);

impl EncryptedTokenValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for EncryptedTokenValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Encoding/decoding failure.
///
/// Decode failures are treated as tampering or corruption by callers;
/// there is no recovery path.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The value does not carry a recognized scheme prefix.
    #[error("unknown token encryption scheme: '{0}'")]
    UnknownScheme(String),

    /// The value is structurally broken (bad base64, truncated nonce, ...).
    #[error("malformed token value: {0}")]
    Malformed(String),

    #[error("token encryption failed")]
    Encrypt,

    /// Authentication failed during decryption (wrong key or tampered data).
    #[error("token decryption failed")]
    Decrypt,

    #[error("claims serialization failed: {0}")]
    Serialization(String),
}

/// Pluggable claims codec, so the encryption primitive is swappable.
pub trait TokenCodec: Send + Sync {
    fn encode(&self, claims: &TokenClaims) -> Result<EncryptedTokenValue, CodecError>;

    fn decode(&self, value: &EncryptedTokenValue) -> Result<TokenClaims, CodecError>;

    /// Check a value decodes without keeping the claims.
    fn validate(&self, value: &EncryptedTokenValue) -> Result<(), CodecError> {
        self.decode(value).map(|_| ())
    }
}

/// Default codec: serde_json claims sealed with AES-256-GCM.
///
/// Wire format: `agv1.` + base64url(nonce || ciphertext), random 96-bit
/// nonce per encode.
pub struct AesGcmTokenCodec {
    key: [u8; 32],
}

impl AesGcmTokenCodec {
    pub fn new(key: [u8; 32]) -> Self {
        Self { key }
    }

    /// Generate a fresh random key (dev/test convenience; production keys
    /// come from configuration).
    pub fn generate_key() -> [u8; 32] {
        let mut key = [0u8; 32];
        OsRng.fill_bytes(&mut key);
        key
    }
}

impl TokenCodec for AesGcmTokenCodec {
    fn encode(&self, claims: &TokenClaims) -> Result<EncryptedTokenValue, CodecError> {
        let plaintext = serde_json::to_vec(claims)
            .map_err(|e| CodecError::Serialization(e.to_string()))?;
        let sealed = seal(&self.key, &plaintext)?;
        Ok(EncryptedTokenValue::new(format!("{SCHEME_PREFIX}{sealed}")))
    }

    fn decode(&self, value: &EncryptedTokenValue) -> Result<TokenClaims, CodecError> {
        let sealed = value
            .as_str()
            .strip_prefix(SCHEME_PREFIX)
            .ok_or_else(|| {
                let scheme = value.as_str().split('.').next().unwrap_or_default();
                CodecError::UnknownScheme(scheme.to_string())
            })?;
        let plaintext = open(&self.key, sealed)?;
        serde_json::from_slice(&plaintext).map_err(|e| CodecError::Serialization(e.to_string()))
    }
}

/// Seal plaintext under the key: base64url(nonce || ciphertext).
pub(crate) fn seal(key: &[u8; 32], plaintext: &[u8]) -> Result<String, CodecError> {
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| CodecError::Encrypt)?;

    let mut nonce_bytes = [0u8; NONCE_LENGTH];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from(nonce_bytes);

    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|_| CodecError::Encrypt)?;

    let mut sealed = nonce_bytes.to_vec();
    sealed.extend_from_slice(&ciphertext);
    Ok(BASE64_URL.encode(sealed))
}

/// Open a sealed value produced by [`seal`].
pub(crate) fn open(key: &[u8; 32], sealed: &str) -> Result<Vec<u8>, CodecError> {
    let sealed = BASE64_URL
        .decode(sealed)
        .map_err(|e| CodecError::Malformed(format!("invalid base64: {e}")))?;
    if sealed.len() < NONCE_LENGTH {
        return Err(CodecError::Malformed("value shorter than nonce".into()));
    }

    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| CodecError::Decrypt)?;
    let nonce_bytes: [u8; NONCE_LENGTH] = sealed[..NONCE_LENGTH]
        .try_into()
        .map_err(|_| CodecError::Malformed("invalid nonce".into()))?;
    let nonce = Nonce::from(nonce_bytes);

    cipher
        .decrypt(&nonce, &sealed[NONCE_LENGTH..])
        .map_err(|_| CodecError::Decrypt)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::{Duration, TimeZone, Utc};
    use proptest::prelude::*;

    use authforge_identity::{
        ApplicationId, PermissionId, PermissionName, ResourceId,
    };

    use super::*;
    use crate::claims::{TokenClaims, TokenType};

    fn codec() -> AesGcmTokenCodec {
        AesGcmTokenCodec::new(AesGcmTokenCodec::generate_key())
    }

    fn claims(permissions: BTreeSet<PermissionId>) -> TokenClaims {
        TokenClaims::new(
            ApplicationId::new(),
            TokenType::Access,
            Utc::now() + Duration::hours(1),
            permissions,
        )
    }

    fn perm(resource: &str, name: &str) -> PermissionId {
        PermissionId::new(
            ResourceId::new(resource).unwrap(),
            PermissionName::new(name).unwrap(),
        )
    }

    #[test]
    fn encode_decode_round_trips_claims() {
        let codec = codec();
        let claims = claims([perm("Billing", "Charge"), perm("Billing", "Refund")].into());

        let value = codec.encode(&claims).unwrap();
        assert!(value.as_str().starts_with("agv1."));

        let decoded = codec.decode(&value).unwrap();
        assert_eq!(decoded, claims);
    }

    #[test]
    fn unknown_scheme_prefix_is_rejected() {
        let codec = codec();
        let value = EncryptedTokenValue::new("xyz9.AAAA");

        let err = codec.decode(&value).unwrap_err();
        assert_eq!(err, CodecError::UnknownScheme("xyz9".to_string()));
    }

    #[test]
    fn tampered_ciphertext_fails_decryption() {
        let codec = codec();
        let value = codec.encode(&claims([perm("Billing", "Charge")].into())).unwrap();

        // Flip one character deep in the sealed payload.
        let mut chars: Vec<char> = value.as_str().chars().collect();
        let last = chars.len() - 1;
        chars[last] = if chars[last] == 'A' { 'B' } else { 'A' };
        let tampered = EncryptedTokenValue::new(chars.into_iter().collect::<String>());

        let err = codec.decode(&tampered).unwrap_err();
        assert!(matches!(err, CodecError::Decrypt | CodecError::Malformed(_)));
    }

    #[test]
    fn value_encrypted_under_other_key_is_rejected() {
        let value = codec().encode(&claims([perm("Billing", "Charge")].into())).unwrap();
        assert_eq!(codec().decode(&value).unwrap_err(), CodecError::Decrypt);
    }

    proptest! {
        #[test]
        fn round_trip_holds_for_arbitrary_claims(
            resource in "[A-Za-z0-9]{1,12}",
            names in prop::collection::btree_set("[A-Za-z0-9]{1,12}", 1..6),
            expires_secs in 0i64..4_000_000_000,
            refresh in any::<bool>(),
        ) {
            let codec = codec();
            let permissions: BTreeSet<PermissionId> = names
                .iter()
                .map(|n| perm(&resource, n))
                .collect();
            let claims = TokenClaims::new(
                ApplicationId::new(),
                if refresh { TokenType::Refresh } else { TokenType::Access },
                Utc.timestamp_opt(expires_secs, 0).unwrap(),
                permissions,
            );

            let decoded = codec.decode(&codec.encode(&claims).unwrap()).unwrap();
            prop_assert_eq!(decoded, claims);
        }
    }
}
