//! Authorization codes and their one-way hashes.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

use authforge_core::{DomainError, DomainResult, ValueObject};

/// Length of a plaintext code, in characters.
pub const CODE_LENGTH: usize = 32;

/// Size of a hashed code digest, in bytes.
pub const DIGEST_LENGTH: usize = 32;

const ALPHABET: &[u8; 62] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// A plaintext one-time code: exactly 32 alphanumeric characters.
///
/// Handed to the client once at issuance and never stored; persistence
/// works with [`HashedCode`] instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Code(String);

impl Code {
    /// Validate an externally supplied code string.
    pub fn new(value: impl Into<String>) -> DomainResult<Self> {
        let value = value.into();
        if value.len() != CODE_LENGTH {
            return Err(DomainError::validation(format!(
                "code must be exactly {CODE_LENGTH} characters"
            )));
        }
        if !value.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(DomainError::validation("code must be alphanumeric"));
        }
        Ok(Self(value))
    }

    /// Generate a fresh random code from the OS CSPRNG.
    ///
    /// Each call draws independently from `OsRng`; there is no shared
    /// generator state, so concurrent issuances never interfere.
    pub fn generate() -> Self {
        let mut bytes = [0u8; CODE_LENGTH];
        OsRng.fill_bytes(&mut bytes);

        let value = bytes
            .iter()
            .map(|b| ALPHABET[*b as usize % ALPHABET.len()] as char)
            .collect();
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for Code {}

/// SHA-256 digest of a [`Code`].
///
/// Equality is byte-wise over the raw digest. `Display` and
/// [`HashedCode::from_base64`] are inverses for any valid digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct HashedCode([u8; DIGEST_LENGTH]);

impl HashedCode {
    /// Validate raw digest bytes (must be exactly 32 bytes).
    pub fn from_bytes(bytes: &[u8]) -> DomainResult<Self> {
        let digest: [u8; DIGEST_LENGTH] = bytes.try_into().map_err(|_| {
            DomainError::validation(format!(
                "hashed code must be exactly {DIGEST_LENGTH} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(digest))
    }

    pub fn from_base64(encoded: &str) -> DomainResult<Self> {
        let bytes = BASE64
            .decode(encoded)
            .map_err(|e| DomainError::validation(format!("invalid base64 digest: {e}")))?;
        Self::from_bytes(&bytes)
    }

    pub fn to_base64(&self) -> String {
        BASE64.encode(self.0)
    }

    pub fn as_bytes(&self) -> &[u8; DIGEST_LENGTH] {
        &self.0
    }
}

impl core::fmt::Display for HashedCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.to_base64())
    }
}

impl core::fmt::Debug for HashedCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "HashedCode({})", self.to_base64())
    }
}

impl ValueObject for HashedCode {}

/// One-way code hashing, pluggable so the primitive is swappable.
pub trait CodeHasher: Send + Sync {
    fn hash(&self, code: &Code) -> HashedCode;

    /// Validate externally supplied digest bytes.
    fn validate(&self, bytes: &[u8]) -> DomainResult<()> {
        HashedCode::from_bytes(bytes).map(|_| ())
    }
}

/// Default [`CodeHasher`]: SHA-256.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256CodeHasher;

impl CodeHasher for Sha256CodeHasher {
    fn hash(&self, code: &Code) -> HashedCode {
        let digest = Sha256::digest(code.as_str().as_bytes());
        HashedCode(digest.into())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use proptest::prelude::*;

    use super::*;

    #[test]
    fn generated_codes_are_well_formed() {
        let code = Code::generate();
        assert_eq!(code.as_str().len(), CODE_LENGTH);
        assert!(code.as_str().chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn generated_codes_are_distinct() {
        // Birthday bound over a 62^32 space makes a collision here
        // astronomically unlikely.
        let codes: HashSet<String> = (0..1000)
            .map(|_| Code::generate().as_str().to_string())
            .collect();
        assert_eq!(codes.len(), 1000);
    }

    #[test]
    fn code_validation_rejects_bad_lengths_and_charsets() {
        assert!(Code::new("").is_err());
        assert!(Code::new("short").is_err());
        assert!(Code::new("a".repeat(33)).is_err());
        assert!(Code::new(format!("{}!", "a".repeat(31))).is_err());
        assert!(Code::new("a".repeat(32)).is_ok());
    }

    #[test]
    fn hashing_is_deterministic_and_input_sensitive() {
        let hasher = Sha256CodeHasher;
        let c1 = Code::generate();
        let c2 = Code::generate();

        assert_eq!(hasher.hash(&c1), hasher.hash(&c1));
        assert_ne!(hasher.hash(&c1), hasher.hash(&c2));
    }

    #[test]
    fn digest_validation_rejects_wrong_lengths() {
        let hasher = Sha256CodeHasher;
        assert!(hasher.validate(&[]).is_err());
        assert!(hasher.validate(&[0u8; 31]).is_err());
        assert!(hasher.validate(&[0u8; 33]).is_err());
        assert!(hasher.validate(&[0u8; 32]).is_ok());
    }

    proptest! {
        #[test]
        fn base64_round_trips_any_digest(bytes in prop::array::uniform32(any::<u8>())) {
            let digest = HashedCode::from_bytes(&bytes).unwrap();
            let restored = HashedCode::from_base64(&digest.to_base64()).unwrap();
            prop_assert_eq!(digest, restored);
        }
    }
}
