use simsy_model::ModelError;
use thiserror::Error;

use crate::auth::crypto::AuthCryptoError;
use crate::auth::TokenError;
use crate::progress::ProgressError;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error(transparent)]
    Progress(#[from] ProgressError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("Crypto error: {0}")]
    Crypto(#[from] AuthCryptoError),

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn not_found(what: impl Into<String>) -> Self {
        CoreError::NotFound(what.into())
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        CoreError::InvalidInput(reason.into())
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
