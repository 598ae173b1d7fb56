use async_trait::async_trait;
use chrono::{DateTime, Utc};
use simsy_model::{HistoryEntry, ShowID, UserList};
use uuid::Uuid;

use super::InMemoryDatabase;
use crate::database::ports::{
    progress::{ProgressEdit, ProgressRepository},
    user_lists::UserListsRepository,
};
use crate::error::{CoreError, Result};
use crate::progress::ShowProgress;

#[async_trait]
impl UserListsRepository for InMemoryDatabase {
    async fn toggle(&self, user_id: Uuid, show_id: ShowID, list: UserList) -> Result<bool> {
        let mut state = self.state.write();
        if !state.shows.contains_key(&show_id) {
            return Err(CoreError::not_found("Show not found!"));
        }
        let members = state.lists.entry((user_id, list)).or_default();
        if let Some(pos) = members.iter().position(|id| *id == show_id) {
            members.remove(pos);
            Ok(false)
        } else {
            members.push(show_id);
            Ok(true)
        }
    }

    async fn contains(&self, user_id: Uuid, show_id: ShowID, list: UserList) -> Result<bool> {
        Ok(self
            .state
            .read()
            .lists
            .get(&(user_id, list))
            .is_some_and(|members| members.contains(&show_id)))
    }

    async fn show_ids(&self, user_id: Uuid, list: UserList) -> Result<Vec<ShowID>> {
        Ok(self
            .state
            .read()
            .lists
            .get(&(user_id, list))
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl ProgressRepository for InMemoryDatabase {
    async fn get(&self, user_id: Uuid, show_id: ShowID) -> Result<Option<ShowProgress>> {
        Ok(self.state.read().progress.get(&(user_id, show_id)).cloned())
    }

    async fn modify(
        &self,
        user_id: Uuid,
        show_id: ShowID,
        watched_at: DateTime<Utc>,
        edit: &mut ProgressEdit<'_>,
    ) -> Result<ShowProgress> {
        let mut state = self.state.write();
        let next = edit(state.progress.get(&(user_id, show_id)).cloned())?;
        state.progress.insert((user_id, show_id), next.clone());
        state.history.insert((user_id, show_id), watched_at);
        Ok(next)
    }

    async fn history(&self, user_id: Uuid, limit: usize) -> Result<Vec<HistoryEntry>> {
        let state = self.state.read();
        let mut entries: Vec<HistoryEntry> = state
            .history
            .iter()
            .filter(|((owner, _), _)| *owner == user_id)
            .map(|((_, show_id), watched_at)| HistoryEntry::new(*show_id, *watched_at))
            .collect();
        entries.sort_by(|a, b| b.watched_at.cmp(&a.watched_at));
        entries.truncate(limit);
        Ok(entries)
    }
}
