use async_trait::async_trait;
use chrono::{DateTime, Utc};
use simsy_model::{HistoryEntry, ShowID};
use uuid::Uuid;

use crate::error::Result;
use crate::progress::ShowProgress;

/// Produces the next document from the stored one. May run more than once
/// when a concurrent writer creates the row first.
pub type ProgressEdit<'a> = dyn FnMut(Option<ShowProgress>) -> Result<ShowProgress> + Send + 'a;

/// Reached positions and the viewing history they produce.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    async fn get(&self, user_id: Uuid, show_id: ShowID) -> Result<Option<ShowProgress>>;

    /// Read, edit and store the document as one atomic step, then mark the
    /// show as watched at `watched_at`. An edit error leaves storage as it
    /// was.
    async fn modify(
        &self,
        user_id: Uuid,
        show_id: ShowID,
        watched_at: DateTime<Utc>,
        edit: &mut ProgressEdit<'_>,
    ) -> Result<ShowProgress>;

    /// Latest watch per show, newest first, at most `limit` shows.
    async fn history(&self, user_id: Uuid, limit: usize) -> Result<Vec<HistoryEntry>>;
}
