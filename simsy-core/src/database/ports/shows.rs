use async_trait::async_trait;
use simsy_model::{
    ArtistID, CountryID, Show, ShowDraft, ShowID, TaxonomyID, TaxonomyKind,
};

use crate::error::Result;

/// Which relation a show listing is filtered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowFilter {
    Artist(ArtistID),
    Country(CountryID),
    Taxonomy(TaxonomyKind, TaxonomyID),
}

#[async_trait]
pub trait ShowsRepository: Send + Sync {
    /// All shows, newest `year` first, then by name.
    async fn list(&self) -> Result<Vec<Show>>;
    async fn list_filtered(&self, filter: ShowFilter) -> Result<Vec<Show>>;
    async fn get(&self, id: ShowID) -> Result<Option<Show>>;
    /// Shows for `ids`, in no particular order; unknown ids are skipped.
    async fn get_many(&self, ids: &[ShowID]) -> Result<Vec<Show>>;
    async fn create(&self, draft: &ShowDraft) -> Result<Show>;
    async fn update(&self, id: ShowID, draft: &ShowDraft) -> Result<Option<Show>>;
    async fn delete(&self, id: ShowID) -> Result<bool>;
    async fn set_image(&self, id: ShowID, path: Option<&str>) -> Result<bool>;

    /// Most recently updated shows.
    async fn newest(&self, limit: usize) -> Result<Vec<Show>>;
    async fn random(&self, limit: usize) -> Result<Vec<Show>>;
    /// Case-insensitive substring match on name or description.
    async fn search(&self, query: &str) -> Result<Vec<Show>>;
}
