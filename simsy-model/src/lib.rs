//! Core data model definitions shared across Simsy crates.
#![allow(missing_docs)]

pub mod catalog;
pub mod error;
pub mod history;
pub mod ids;
pub mod show;
pub mod user;

// Intentionally curated re-exports for downstream consumers.
pub use catalog::{
    Artist, ArtistDraft, Country, CountryDraft, ImageSlot, Taxonomy,
    TaxonomyDraft, TaxonomyKind,
};
pub use error::{ModelError, Result as ModelResult};
pub use history::HistoryEntry;
pub use ids::{ArtistID, CountryID, ShowID, TaxonomyID};
pub use show::{
    EpisodeCounts, SeasonEpisode, Show, ShowCard, ShowDraft, ShowKind,
    UserList,
};
pub use user::{
    PreferencesUpdate, ProfileUpdate, User, UserPreferences,
};

/// Current calendar year, used by the derived `age` fields.
pub fn current_year() -> i32 {
    use chrono::Datelike;
    chrono::Utc::now().year()
}
