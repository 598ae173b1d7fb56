use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::auth::{IssuedToken, TokenPurpose};
use crate::error::Result;

/// Hashed bearer and reset tokens.
#[async_trait]
pub trait SessionsRepository: Send + Sync {
    async fn store(&self, user_id: Uuid, token: &IssuedToken) -> Result<()>;

    /// Owner of an unexpired token with this digest.
    async fn find_user(
        &self,
        digest: &str,
        purpose: TokenPurpose,
        now: DateTime<Utc>,
    ) -> Result<Option<Uuid>>;

    /// Like [`Self::find_user`] but deletes the token, so it works once.
    async fn consume(
        &self,
        digest: &str,
        purpose: TokenPurpose,
        now: DateTime<Utc>,
    ) -> Result<Option<Uuid>>;

    async fn revoke(&self, digest: &str) -> Result<()>;
    async fn revoke_all(&self, user_id: Uuid, purpose: TokenPurpose) -> Result<u64>;
}
