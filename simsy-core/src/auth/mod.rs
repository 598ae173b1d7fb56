//! Password hashing and opaque bearer tokens.

pub mod crypto;
pub mod tokens;

pub use crypto::{AuthCrypto, AuthCryptoError};
pub use tokens::{IssuedToken, TokenError, TokenPurpose};
