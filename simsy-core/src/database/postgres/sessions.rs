use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::db_err;
use crate::auth::{IssuedToken, TokenPurpose};
use crate::database::ports::sessions::SessionsRepository;
use crate::error::Result;

#[derive(Clone, Debug)]
pub struct PostgresSessionsRepository {
    pool: PgPool,
}

impl PostgresSessionsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl SessionsRepository for PostgresSessionsRepository {
    async fn store(&self, user_id: Uuid, token: &IssuedToken) -> Result<()> {
        sqlx::query(
            "INSERT INTO auth_tokens (digest, user_id, purpose, created_at, expires_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&token.digest)
        .bind(user_id)
        .bind(token.purpose.as_str())
        .bind(token.created_at)
        .bind(token.expires_at)
        .execute(self.pool())
        .await
        .map_err(db_err("Failed to store token"))?;
        Ok(())
    }

    async fn find_user(
        &self,
        digest: &str,
        purpose: TokenPurpose,
        now: DateTime<Utc>,
    ) -> Result<Option<Uuid>> {
        sqlx::query_scalar(
            "SELECT user_id FROM auth_tokens \
             WHERE digest = $1 AND purpose = $2 AND expires_at > $3",
        )
        .bind(digest)
        .bind(purpose.as_str())
        .bind(now)
        .fetch_optional(self.pool())
        .await
        .map_err(db_err("Failed to look up token"))
    }

    async fn consume(
        &self,
        digest: &str,
        purpose: TokenPurpose,
        now: DateTime<Utc>,
    ) -> Result<Option<Uuid>> {
        let row: Option<(Uuid, DateTime<Utc>)> = sqlx::query_as(
            "DELETE FROM auth_tokens WHERE digest = $1 AND purpose = $2 \
             RETURNING user_id, expires_at",
        )
        .bind(digest)
        .bind(purpose.as_str())
        .fetch_optional(self.pool())
        .await
        .map_err(db_err("Failed to consume token"))?;
        Ok(row.and_then(|(user_id, expires_at)| (expires_at > now).then_some(user_id)))
    }

    async fn revoke(&self, digest: &str) -> Result<()> {
        sqlx::query("DELETE FROM auth_tokens WHERE digest = $1")
            .bind(digest)
            .execute(self.pool())
            .await
            .map_err(db_err("Failed to revoke token"))?;
        Ok(())
    }

    async fn revoke_all(&self, user_id: Uuid, purpose: TokenPurpose) -> Result<u64> {
        let result =
            sqlx::query("DELETE FROM auth_tokens WHERE user_id = $1 AND purpose = $2")
                .bind(user_id)
                .bind(purpose.as_str())
                .execute(self.pool())
                .await
                .map_err(db_err("Failed to revoke tokens"))?;
        Ok(result.rows_affected())
    }
}
