use async_trait::async_trait;
use simsy_model::{Artist, ArtistDraft, ArtistID, CountryID};

use crate::error::Result;

#[async_trait]
pub trait ArtistsRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Artist>>;
    async fn get(&self, id: ArtistID) -> Result<Option<Artist>>;
    async fn get_many(&self, ids: &[ArtistID]) -> Result<Vec<Artist>>;
    async fn by_nationality(&self, country: CountryID) -> Result<Vec<Artist>>;
    async fn create(&self, draft: &ArtistDraft) -> Result<Artist>;
    async fn update(&self, id: ArtistID, draft: &ArtistDraft) -> Result<Option<Artist>>;
    async fn delete(&self, id: ArtistID) -> Result<bool>;
    async fn set_image(&self, id: ArtistID, path: Option<&str>) -> Result<bool>;
}
