use async_trait::async_trait;
use chrono::{DateTime, Utc};
use simsy_model::{HistoryEntry, ShowID};
use sqlx::{PgPool, types::Json};
use uuid::Uuid;

use super::db_err;
use crate::database::ports::progress::{ProgressEdit, ProgressRepository};
use crate::error::Result;
use crate::progress::ShowProgress;

#[derive(Clone, Debug)]
pub struct PostgresProgressRepository {
    pool: PgPool,
}

impl PostgresProgressRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ProgressRepository for PostgresProgressRepository {
    async fn get(&self, user_id: Uuid, show_id: ShowID) -> Result<Option<ShowProgress>> {
        let reached: Option<Json<ShowProgress>> = sqlx::query_scalar(
            "SELECT reached FROM show_progress WHERE user_id = $1 AND show_id = $2",
        )
        .bind(user_id)
        .bind(show_id.get())
        .fetch_optional(self.pool())
        .await
        .map_err(db_err("Failed to load progress"))?;
        Ok(reached.map(|json| json.0))
    }

    async fn modify(
        &self,
        user_id: Uuid,
        show_id: ShowID,
        watched_at: DateTime<Utc>,
        edit: &mut ProgressEdit<'_>,
    ) -> Result<ShowProgress> {
        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(db_err("Failed to start transaction"))?;

        let next = loop {
            let stored: Option<Json<ShowProgress>> = sqlx::query_scalar(
                "SELECT reached FROM show_progress \
                 WHERE user_id = $1 AND show_id = $2 FOR UPDATE",
            )
            .bind(user_id)
            .bind(show_id.get())
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_err("Failed to load progress"))?;

            match stored {
                Some(Json(stored)) => {
                    let next = edit(Some(stored))?;
                    sqlx::query(
                        "UPDATE show_progress SET reached = $3, updated_at = $4 \
                         WHERE user_id = $1 AND show_id = $2",
                    )
                    .bind(user_id)
                    .bind(show_id.get())
                    .bind(Json(&next))
                    .bind(watched_at)
                    .execute(&mut *tx)
                    .await
                    .map_err(db_err("Failed to save progress"))?;
                    break next;
                }
                None => {
                    let next = edit(None)?;
                    let inserted = sqlx::query(
                        r#"
                        INSERT INTO show_progress (user_id, show_id, reached, updated_at)
                        VALUES ($1, $2, $3, $4)
                        ON CONFLICT (user_id, show_id) DO NOTHING
                        "#,
                    )
                    .bind(user_id)
                    .bind(show_id.get())
                    .bind(Json(&next))
                    .bind(watched_at)
                    .execute(&mut *tx)
                    .await
                    .map_err(db_err("Failed to save progress"))?;
                    // Lost the insert race; lock the winner's row and edit that.
                    if inserted.rows_affected() == 1 {
                        break next;
                    }
                }
            }
        };

        sqlx::query(
            r#"
            INSERT INTO watch_history (user_id, show_id, watched_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, show_id)
            DO UPDATE SET watched_at = GREATEST(watch_history.watched_at, EXCLUDED.watched_at)
            "#,
        )
        .bind(user_id)
        .bind(show_id.get())
        .bind(watched_at)
        .execute(&mut *tx)
        .await
        .map_err(db_err("Failed to record history"))?;

        tx.commit()
            .await
            .map_err(db_err("Failed to commit transaction"))?;
        Ok(next)
    }

    async fn history(&self, user_id: Uuid, limit: usize) -> Result<Vec<HistoryEntry>> {
        let rows: Vec<(i64, DateTime<Utc>)> = sqlx::query_as(
            "SELECT show_id, watched_at FROM watch_history \
             WHERE user_id = $1 ORDER BY watched_at DESC LIMIT $2",
        )
        .bind(user_id)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(self.pool())
        .await
        .map_err(db_err("Failed to load history"))?;
        Ok(rows
            .into_iter()
            .map(|(show_id, watched_at)| HistoryEntry::new(ShowID(show_id), watched_at))
            .collect())
    }
}
