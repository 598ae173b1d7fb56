use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use rand::{TryRngCore, rngs::OsRng};
use thiserror::Error;

use super::crypto::{AuthCrypto, AuthCryptoError};

/// Lifetime of a password reset token, in seconds.
pub const RESET_TOKEN_LIFETIME_SECS: i64 = 60 * 60;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token generation failed")]
    GenerationFailed,

    #[error(transparent)]
    Crypto(#[from] AuthCryptoError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenPurpose {
    Session,
    PasswordReset,
}

impl TokenPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenPurpose::Session => "session",
            TokenPurpose::PasswordReset => "password_reset",
        }
    }
}

/// A freshly minted token. `secret` is handed to the client once; only
/// `digest` is persisted.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub secret: String,
    pub digest: String,
    pub purpose: TokenPurpose,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl IssuedToken {
    pub fn generate(
        crypto: &AuthCrypto,
        purpose: TokenPurpose,
        lifetime: Duration,
    ) -> Result<Self, TokenError> {
        let mut token_bytes = [0u8; 32];
        OsRng
            .try_fill_bytes(&mut token_bytes)
            .map_err(|_| TokenError::GenerationFailed)?;

        let secret = URL_SAFE_NO_PAD.encode(token_bytes);
        let digest = crypto.hash_token(&secret)?;
        let created_at = Utc::now();

        Ok(Self {
            secret,
            digest,
            purpose,
            created_at,
            expires_at: created_at + lifetime,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_unique_and_digest_matches() {
        let crypto = AuthCrypto::insecure_fast("pepper", "key").unwrap();
        let a = IssuedToken::generate(&crypto, TokenPurpose::Session, Duration::days(1)).unwrap();
        let b = IssuedToken::generate(&crypto, TokenPurpose::Session, Duration::days(1)).unwrap();

        assert_ne!(a.secret, b.secret);
        assert_eq!(URL_SAFE_NO_PAD.decode(&a.secret).unwrap().len(), 32);
        assert_eq!(a.digest, crypto.hash_token(&a.secret).unwrap());
        assert_eq!(a.expires_at - a.created_at, Duration::days(1));
    }
}
