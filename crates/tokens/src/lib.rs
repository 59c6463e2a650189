//! `authforge-tokens` — codes, tokens and the crypto behind them.
//!
//! The security-sensitive core of the identity platform:
//!
//! - random authorization [`code::Code`]s from the OS CSPRNG, stored only
//!   as SHA-256 [`code::HashedCode`]s;
//! - self-describing bearer tokens whose identity is an AES-256-GCM
//!   encrypted claims blob ([`codec`]);
//! - the single-use/expiry state machines for [`authorization_code`] and
//!   [`token`] verification.

pub mod authorization_code;
pub mod claims;
pub mod code;
pub mod codec;
pub mod secret;
pub mod token;

pub use authorization_code::{
    AUTHORIZATION_CODE_TTL_SECS, AuthorizationCode, AuthorizationCodeError, AuthorizationCodeId,
};
pub use claims::{TokenClaims, TokenType};
pub use code::{Code, CodeHasher, HashedCode, Sha256CodeHasher};
pub use codec::{AesGcmTokenCodec, CodecError, EncryptedTokenValue, TokenCodec};
pub use secret::SecretKeyCipher;
pub use token::{AccessToken, RefreshToken, Token, TokenId, TokenVerificationError};
