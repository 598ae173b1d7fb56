use async_trait::async_trait;
use simsy_model::{Country, CountryDraft, CountryID, ImageSlot, TaxonomyID};

use crate::error::Result;

#[async_trait]
pub trait CountriesRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Country>>;
    async fn get(&self, id: CountryID) -> Result<Option<Country>>;
    async fn get_many(&self, ids: &[CountryID]) -> Result<Vec<Country>>;
    async fn speaking(&self, language: TaxonomyID) -> Result<Vec<Country>>;
    async fn create(&self, draft: &CountryDraft) -> Result<Country>;
    async fn update(&self, id: CountryID, draft: &CountryDraft) -> Result<Option<Country>>;
    async fn delete(&self, id: CountryID) -> Result<bool>;
    /// `slot` is either [`ImageSlot::CountryFlag`] or [`ImageSlot::CountryImage`].
    async fn set_image(
        &self,
        id: CountryID,
        slot: ImageSlot,
        path: Option<&str>,
    ) -> Result<bool>;
}
