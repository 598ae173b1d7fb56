//! In-memory adapters implementing every repository port.
//!
//! Used by tests and `--in-memory` development runs. All state sits behind a
//! single lock so cross-table effects (cascading deletes, relation checks)
//! stay consistent.

mod accounts;
mod catalog;
mod tracking;

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use simsy_model::{
    Artist, ArtistID, Country, CountryID, Show, ShowID, Taxonomy,
    TaxonomyID, TaxonomyKind, User, UserList, UserPreferences,
};
use uuid::Uuid;

use crate::auth::TokenPurpose;
use crate::progress::ShowProgress;

#[derive(Clone, Default)]
pub struct InMemoryDatabase {
    state: Arc<RwLock<MemoryState>>,
}

impl fmt::Debug for InMemoryDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("InMemoryDatabase")
            .field("shows", &state.shows.len())
            .field("users", &state.users.len())
            .finish()
    }
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }
}

struct StoredUser {
    user: User,
    password_hash: String,
    preferences: UserPreferences,
}

struct StoredToken {
    user_id: Uuid,
    purpose: TokenPurpose,
    expires_at: DateTime<Utc>,
}

#[derive(Default)]
struct MemoryState {
    last_id: i64,
    taxonomy: HashMap<TaxonomyKind, BTreeMap<TaxonomyID, Taxonomy>>,
    countries: BTreeMap<CountryID, Country>,
    artists: BTreeMap<ArtistID, Artist>,
    shows: BTreeMap<ShowID, Show>,
    users: HashMap<Uuid, StoredUser>,
    tokens: HashMap<String, StoredToken>,
    lists: HashMap<(Uuid, UserList), Vec<ShowID>>,
    progress: HashMap<(Uuid, ShowID), ShowProgress>,
    history: HashMap<(Uuid, ShowID), DateTime<Utc>>,
}

impl MemoryState {
    /// Ids are unique across tables; only uniqueness within a table matters.
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn taxonomy_exists(&self, kind: TaxonomyKind, id: TaxonomyID) -> bool {
        self.taxonomy
            .get(&kind)
            .is_some_and(|entries| entries.contains_key(&id))
    }
}
