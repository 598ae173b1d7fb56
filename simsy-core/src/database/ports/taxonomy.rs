use async_trait::async_trait;
use simsy_model::{Taxonomy, TaxonomyDraft, TaxonomyID, TaxonomyKind};

use crate::error::Result;

/// Languages, genres, ratings and labels share one port keyed by kind.
#[async_trait]
pub trait TaxonomyRepository: Send + Sync {
    /// Languages and genres by name, ratings and labels by id.
    async fn list(&self, kind: TaxonomyKind) -> Result<Vec<Taxonomy>>;
    async fn get(&self, kind: TaxonomyKind, id: TaxonomyID) -> Result<Option<Taxonomy>>;
    async fn get_many(
        &self,
        kind: TaxonomyKind,
        ids: &[TaxonomyID],
    ) -> Result<Vec<Taxonomy>>;
    async fn create(&self, kind: TaxonomyKind, draft: &TaxonomyDraft) -> Result<Taxonomy>;
    async fn update(
        &self,
        kind: TaxonomyKind,
        id: TaxonomyID,
        draft: &TaxonomyDraft,
    ) -> Result<Option<Taxonomy>>;
    async fn delete(&self, kind: TaxonomyKind, id: TaxonomyID) -> Result<bool>;
    async fn set_image(
        &self,
        kind: TaxonomyKind,
        id: TaxonomyID,
        path: Option<&str>,
    ) -> Result<bool>;
}
