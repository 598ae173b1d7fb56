use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::ShowID;

/// Latest time a user wrote progress on a show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub show_id: ShowID,
    pub watched_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(show_id: ShowID, watched_at: DateTime<Utc>) -> Self {
        Self {
            show_id,
            watched_at,
        }
    }
}
