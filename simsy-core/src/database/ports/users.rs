use async_trait::async_trait;
use simsy_model::{User, UserPreferences};
use uuid::Uuid;

use crate::error::Result;

#[async_trait]
pub trait UsersRepository: Send + Sync {
    /// Fails with `CoreError::Conflict` when the username is taken.
    async fn create_user_with_password(&self, user: &User, password_hash: &str) -> Result<()>;
    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>>;
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn count_users(&self) -> Result<u64>;
    async fn update_user(&self, user: &User) -> Result<()>;

    async fn get_user_password_hash(&self, user_id: Uuid) -> Result<Option<String>>;
    async fn update_user_password(&self, user_id: Uuid, password_hash: &str) -> Result<()>;

    async fn get_preferences(&self, user_id: Uuid) -> Result<UserPreferences>;
    async fn save_preferences(&self, user_id: Uuid, prefs: &UserPreferences) -> Result<()>;
}
