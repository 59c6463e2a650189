//! Application secret keys at rest.

use authforge_identity::EncryptedSecretKey;

use crate::code::Code;
use crate::codec::{CodecError, open, seal};

/// Seals application secret keys with the same AEAD used for tokens.
///
/// The plaintext secret is a generated [`Code`]; only the sealed form is
/// stored on the application aggregate.
pub struct SecretKeyCipher {
    key: [u8; 32],
}

impl SecretKeyCipher {
    pub fn new(key: [u8; 32]) -> Self {
        Self { key }
    }

    pub fn encrypt(&self, secret: &Code) -> Result<EncryptedSecretKey, CodecError> {
        let sealed = seal(&self.key, secret.as_str().as_bytes())?;
        EncryptedSecretKey::new(sealed).map_err(|e| CodecError::Malformed(e.to_string()))
    }

    pub fn decrypt(&self, sealed: &EncryptedSecretKey) -> Result<Code, CodecError> {
        let plaintext = open(&self.key, sealed.as_str())?;
        let value = String::from_utf8(plaintext)
            .map_err(|_| CodecError::Malformed("secret is not valid utf-8".into()))?;
        Code::new(value).map_err(|e| CodecError::Malformed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::AesGcmTokenCodec;

    #[test]
    fn secret_round_trips() {
        let cipher = SecretKeyCipher::new(AesGcmTokenCodec::generate_key());
        let secret = Code::generate();

        let sealed = cipher.encrypt(&secret).unwrap();
        assert_ne!(sealed.as_str(), secret.as_str());

        let recovered = cipher.decrypt(&sealed).unwrap();
        assert_eq!(recovered, secret);
    }

    #[test]
    fn wrong_key_fails_to_open() {
        let secret = Code::generate();
        let sealed = SecretKeyCipher::new(AesGcmTokenCodec::generate_key())
            .encrypt(&secret)
            .unwrap();

        let other = SecretKeyCipher::new(AesGcmTokenCodec::generate_key());
        assert!(other.decrypt(&sealed).is_err());
    }
}
