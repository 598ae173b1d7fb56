use async_trait::async_trait;
use simsy_model::{ShowID, UserList};
use sqlx::PgPool;
use uuid::Uuid;

use super::db_err;
use crate::database::ports::user_lists::UserListsRepository;
use crate::error::Result;

#[derive(Clone, Debug)]
pub struct PostgresUserListsRepository {
    pool: PgPool,
}

fn table(list: UserList) -> &'static str {
    match list {
        UserList::Favorites => "user_favorites",
        UserList::Watchlist => "user_watchlist",
    }
}

impl PostgresUserListsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UserListsRepository for PostgresUserListsRepository {
    async fn toggle(&self, user_id: Uuid, show_id: ShowID, list: UserList) -> Result<bool> {
        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(db_err("Failed to start transaction"))?;

        let removed = sqlx::query(&format!(
            "DELETE FROM {} WHERE user_id = $1 AND show_id = $2",
            table(list)
        ))
        .bind(user_id)
        .bind(show_id.get())
        .execute(&mut *tx)
        .await
        .map_err(db_err("Failed to update user list"))?;

        let now_member = if removed.rows_affected() > 0 {
            false
        } else {
            sqlx::query(&format!(
                "INSERT INTO {} (user_id, show_id) VALUES ($1, $2)",
                table(list)
            ))
            .bind(user_id)
            .bind(show_id.get())
            .execute(&mut *tx)
            .await
            .map_err(db_err("Failed to update user list"))?;
            true
        };

        tx.commit()
            .await
            .map_err(db_err("Failed to commit transaction"))?;
        Ok(now_member)
    }

    async fn contains(&self, user_id: Uuid, show_id: ShowID, list: UserList) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(&format!(
            "SELECT EXISTS (SELECT 1 FROM {} WHERE user_id = $1 AND show_id = $2)",
            table(list)
        ))
        .bind(user_id)
        .bind(show_id.get())
        .fetch_one(self.pool())
        .await
        .map_err(db_err("Failed to check user list"))?;
        Ok(exists)
    }

    async fn show_ids(&self, user_id: Uuid, list: UserList) -> Result<Vec<ShowID>> {
        let ids: Vec<i64> = sqlx::query_scalar(&format!(
            "SELECT show_id FROM {} WHERE user_id = $1 ORDER BY added_at, show_id",
            table(list)
        ))
        .bind(user_id)
        .fetch_all(self.pool())
        .await
        .map_err(db_err("Failed to load user list"))?;
        Ok(ids.into_iter().map(ShowID).collect())
    }
}
