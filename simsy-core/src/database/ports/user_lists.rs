use async_trait::async_trait;
use simsy_model::{ShowID, UserList};
use uuid::Uuid;

use crate::error::Result;

/// Favorites and watchlist membership.
#[async_trait]
pub trait UserListsRepository: Send + Sync {
    /// Flip membership and return whether the show is now in the list.
    async fn toggle(&self, user_id: Uuid, show_id: ShowID, list: UserList) -> Result<bool>;
    async fn contains(&self, user_id: Uuid, show_id: ShowID, list: UserList) -> Result<bool>;
    /// Show ids in the order they were added.
    async fn show_ids(&self, user_id: Uuid, list: UserList) -> Result<Vec<ShowID>>;
}
