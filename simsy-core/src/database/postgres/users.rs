use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use simsy_model::{User, UserPreferences};
use sqlx::{PgPool, types::Json};
use tracing::info;
use uuid::Uuid;

use super::db_err;
use crate::database::ports::users::UsersRepository;
use crate::error::{CoreError, Result};

/// PostgreSQL-backed implementation of the `UsersRepository` port.
#[derive(Clone, Debug)]
pub struct PostgresUsersRepository {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    email: String,
    first_name: String,
    last_name: String,
    nickname: String,
    birthday: Option<NaiveDate>,
    bio: Option<String>,
    is_staff: bool,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(r: UserRow) -> Self {
        User {
            id: r.id,
            username: r.username,
            email: r.email,
            first_name: r.first_name,
            last_name: r.last_name,
            nickname: r.nickname,
            birthday: r.birthday,
            bio: r.bio,
            is_staff: r.is_staff,
            created_at: r.created_at,
        }
    }
}

const USER_COLUMNS: &str = "id, username, email, first_name, last_name, nickname, \
                            birthday, bio, is_staff, created_at";

impl PostgresUsersRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn fetch_one_by(&self, column: &str, value: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = $1");
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(value)
            .fetch_optional(self.pool())
            .await
            .map_err(db_err("Failed to get user"))?;
        Ok(row.map(User::from))
    }
}

#[async_trait]
impl UsersRepository for PostgresUsersRepository {
    async fn create_user_with_password(&self, user: &User, password_hash: &str) -> Result<()> {
        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(db_err("Failed to start transaction"))?;

        sqlx::query(
            r#"
            INSERT INTO users (
                id, username, email, first_name, last_name, nickname,
                birthday, bio, is_staff, preferences, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.nickname)
        .bind(user.birthday)
        .bind(&user.bio)
        .bind(user.is_staff)
        .bind(Json(UserPreferences::default()))
        .bind(user.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if let Some(db) = e.as_database_error()
                && db.constraint() == Some("users_username_key")
            {
                return CoreError::Conflict("Username already exists".to_string());
            }
            CoreError::Internal(format!("Failed to create user: {e}"))
        })?;

        sqlx::query("INSERT INTO user_credentials (user_id, password_hash) VALUES ($1, $2)")
            .bind(user.id)
            .bind(password_hash)
            .execute(&mut *tx)
            .await
            .map_err(db_err("Failed to store password"))?;

        tx.commit()
            .await
            .map_err(db_err("Failed to commit transaction"))?;

        info!(username = %user.username, user_id = %user.id, "created user");
        Ok(())
    }

    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(db_err("Failed to get user by id"))?;
        Ok(row.map(User::from))
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.fetch_one_by("username", username).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1) \
             ORDER BY created_at LIMIT 1"
        );
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(email)
            .fetch_optional(self.pool())
            .await
            .map_err(db_err("Failed to get user by email"))?;
        Ok(row.map(User::from))
    }

    async fn count_users(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool())
            .await
            .map_err(db_err("Failed to count users"))?;
        Ok(count.max(0) as u64)
    }

    async fn update_user(&self, user: &User) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                email = $2, first_name = $3, last_name = $4, nickname = $5,
                birthday = $6, bio = $7, is_staff = $8
            WHERE id = $1
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.nickname)
        .bind(user.birthday)
        .bind(&user.bio)
        .bind(user.is_staff)
        .execute(self.pool())
        .await
        .map_err(db_err("Failed to update user"))?;

        if result.rows_affected() == 0 {
            return Err(CoreError::not_found("User not found"));
        }
        Ok(())
    }

    async fn get_user_password_hash(&self, user_id: Uuid) -> Result<Option<String>> {
        sqlx::query_scalar("SELECT password_hash FROM user_credentials WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(self.pool())
            .await
            .map_err(db_err("Failed to get password hash"))
    }

    async fn update_user_password(&self, user_id: Uuid, password_hash: &str) -> Result<()> {
        let result = sqlx::query(
            "UPDATE user_credentials SET password_hash = $2, updated_at = NOW() \
             WHERE user_id = $1",
        )
        .bind(user_id)
        .bind(password_hash)
        .execute(self.pool())
        .await
        .map_err(db_err("Failed to update password"))?;

        if result.rows_affected() == 0 {
            return Err(CoreError::not_found("User not found"));
        }
        Ok(())
    }

    async fn get_preferences(&self, user_id: Uuid) -> Result<UserPreferences> {
        let prefs: Option<Json<serde_json::Value>> =
            sqlx::query_scalar("SELECT preferences FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(self.pool())
                .await
                .map_err(db_err("Failed to load preferences"))?;
        let Some(Json(value)) = prefs else {
            return Err(CoreError::not_found("User not found"));
        };
        Ok(serde_json::from_value(value).unwrap_or_default())
    }

    async fn save_preferences(&self, user_id: Uuid, prefs: &UserPreferences) -> Result<()> {
        let result = sqlx::query("UPDATE users SET preferences = $2 WHERE id = $1")
            .bind(user_id)
            .bind(Json(prefs))
            .execute(self.pool())
            .await
            .map_err(db_err("Failed to save preferences"))?;
        if result.rows_affected() == 0 {
            return Err(CoreError::not_found("User not found"));
        }
        Ok(())
    }
}
