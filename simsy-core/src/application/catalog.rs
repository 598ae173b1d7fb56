//! Read models and write paths for the public catalog.

use std::collections::{BTreeSet, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use simsy_model::{
    Artist, ArtistDraft, ArtistID, Country, CountryDraft, CountryID,
    EpisodeCounts, ImageSlot, Show, ShowCard, ShowDraft, ShowID, ShowKind,
    Taxonomy, TaxonomyDraft, TaxonomyID, TaxonomyKind, UserList,
};
use tracing::{debug, info};
use uuid::Uuid;

use super::unit_of_work::AppUnitOfWork;
use crate::database::ports::shows::ShowFilter;
use crate::error::{CoreError, Result};
use crate::history::{DEFAULT_HISTORY_LIMIT, latest_unique};

pub const FEED_LIMIT: usize = 10;
pub const SEARCH_DESCRIPTION_MAX: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistView {
    #[serde(flatten)]
    pub artist: Artist,
    pub age: i32,
}

impl From<Artist> for ArtistView {
    fn from(artist: Artist) -> Self {
        let age = artist.age();
        Self { artist, age }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowDetail {
    pub id: ShowID,
    pub name: String,
    pub year: String,
    pub age: Option<i32>,
    pub kind: ShowKind,
    pub sample: bool,
    pub captions: bool,
    pub image: Option<String>,
    pub imdb: String,
    pub description: String,
    pub countries: Vec<Country>,
    pub languages: Vec<Taxonomy>,
    pub genres: Vec<Taxonomy>,
    pub labels: Vec<Taxonomy>,
    pub rating: Option<Taxonomy>,
    pub artists: Vec<ArtistView>,
    pub episodes: EpisodeCounts,
    pub finalized: bool,
    pub popup: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub in_favorites: bool,
    pub in_watchlist: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtistDetail {
    #[serde(flatten)]
    pub artist: ArtistView,
    pub nationality_detail: Option<Country>,
    pub shows: Vec<ShowCard>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryDetail {
    #[serde(flatten)]
    pub country: Country,
    pub languages: Vec<Taxonomy>,
    pub artists: Vec<ArtistView>,
    pub shows: Vec<ShowCard>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxonomyDetail {
    #[serde(flatten)]
    pub taxonomy: Taxonomy,
    /// Only populated for languages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub countries: Option<Vec<Country>>,
    pub shows: Vec<ShowCard>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub kind: ShowKind,
    pub id: ShowID,
    pub name: String,
    pub description: String,
}

/// Cut a description to [`SEARCH_DESCRIPTION_MAX`] characters, marking the
/// cut with `...`.
pub fn truncate_description(description: &str) -> String {
    if description.chars().count() > SEARCH_DESCRIPTION_MAX {
        let mut cut: String = description.chars().take(SEARCH_DESCRIPTION_MAX).collect();
        cut.push_str("...");
        cut
    } else {
        description.to_string()
    }
}

fn unique<T: Ord + Copy>(ids: &[T]) -> Vec<T> {
    ids.iter().copied().collect::<BTreeSet<_>>().into_iter().collect()
}

#[derive(Debug, Clone)]
pub struct CatalogService {
    uow: AppUnitOfWork,
}

impl CatalogService {
    pub fn new(uow: AppUnitOfWork) -> Self {
        Self { uow }
    }

    async fn require_show(&self, id: ShowID) -> Result<Show> {
        self.uow
            .shows
            .get(id)
            .await?
            .ok_or_else(|| CoreError::not_found("Show not found!"))
    }

    async fn list_membership(
        &self,
        viewer: Option<Uuid>,
    ) -> Result<(HashSet<ShowID>, HashSet<ShowID>)> {
        let Some(user) = viewer else {
            return Ok((HashSet::new(), HashSet::new()));
        };
        let favorites = self.uow.user_lists.show_ids(user, UserList::Favorites).await?;
        let watchlist = self.uow.user_lists.show_ids(user, UserList::Watchlist).await?;
        Ok((favorites.into_iter().collect(), watchlist.into_iter().collect()))
    }

    /// Project shows into cards, flagging the viewer's list membership.
    pub async fn cards(&self, viewer: Option<Uuid>, shows: &[Show]) -> Result<Vec<ShowCard>> {
        let (favorites, watchlist) = self.list_membership(viewer).await?;
        Ok(shows
            .iter()
            .map(|show| {
                ShowCard::new(
                    show,
                    favorites.contains(&show.id),
                    watchlist.contains(&show.id),
                )
            })
            .collect())
    }

    /// Cards for `ids` in the given order, skipping shows that no longer exist.
    async fn ordered_cards(&self, viewer: Option<Uuid>, ids: &[ShowID]) -> Result<Vec<ShowCard>> {
        let found = self.uow.shows.get_many(ids).await?;
        let ordered: Vec<Show> = ids
            .iter()
            .filter_map(|id| found.iter().find(|show| show.id == *id).cloned())
            .collect();
        self.cards(viewer, &ordered).await
    }

    // Shows

    pub async fn list_shows(&self, viewer: Option<Uuid>) -> Result<Vec<ShowCard>> {
        let shows = self.uow.shows.list().await?;
        self.cards(viewer, &shows).await
    }

    pub async fn show_detail(&self, id: ShowID, viewer: Option<Uuid>) -> Result<ShowDetail> {
        let show = self.require_show(id).await?;
        let (in_favorites, in_watchlist) = match viewer {
            Some(user) => (
                self.uow.user_lists.contains(user, id, UserList::Favorites).await?,
                self.uow.user_lists.contains(user, id, UserList::Watchlist).await?,
            ),
            None => (false, false),
        };

        let taxonomy = &self.uow.taxonomy;
        let rating = match show.rating_id {
            Some(rating) => taxonomy.get(TaxonomyKind::Rating, rating).await?,
            None => None,
        };

        Ok(ShowDetail {
            countries: self.uow.countries.get_many(&show.country_ids).await?,
            languages: taxonomy
                .get_many(TaxonomyKind::Language, &show.language_ids)
                .await?,
            genres: taxonomy.get_many(TaxonomyKind::Genre, &show.genre_ids).await?,
            labels: taxonomy.get_many(TaxonomyKind::Label, &show.label_ids).await?,
            rating,
            artists: self
                .uow
                .artists
                .get_many(&show.artist_ids)
                .await?
                .into_iter()
                .map(ArtistView::from)
                .collect(),
            age: show.age(),
            id: show.id,
            name: show.name,
            year: show.year,
            kind: show.kind,
            sample: show.sample,
            captions: show.captions,
            image: show.image,
            imdb: show.imdb,
            description: show.description,
            episodes: show.episodes,
            finalized: show.finalized,
            popup: show.popup,
            created: show.created,
            updated: show.updated,
            in_favorites,
            in_watchlist,
        })
    }

    async fn ensure_show_relations(&self, draft: &ShowDraft) -> Result<()> {
        let countries = unique(&draft.country_ids);
        if self.uow.countries.get_many(&countries).await?.len() != countries.len() {
            return Err(CoreError::invalid("Unknown country in show"));
        }
        let artists = unique(&draft.artist_ids);
        if self.uow.artists.get_many(&artists).await?.len() != artists.len() {
            return Err(CoreError::invalid("Unknown artist in show"));
        }
        let rating: Vec<TaxonomyID> = draft.rating_id.into_iter().collect();
        for (kind, ids) in [
            (TaxonomyKind::Language, unique(&draft.language_ids)),
            (TaxonomyKind::Genre, unique(&draft.genre_ids)),
            (TaxonomyKind::Label, unique(&draft.label_ids)),
            (TaxonomyKind::Rating, rating),
        ] {
            if self.uow.taxonomy.get_many(kind, &ids).await?.len() != ids.len() {
                return Err(CoreError::invalid(format!("Unknown {kind} in show")));
            }
        }
        Ok(())
    }

    pub async fn create_show(&self, draft: ShowDraft) -> Result<Show> {
        draft.validate()?;
        self.ensure_show_relations(&draft).await?;
        let show = self.uow.shows.create(&draft).await?;
        info!(show_id = %show.id, name = %show.name, kind = %show.kind, "created show");
        Ok(show)
    }

    pub async fn update_show(&self, id: ShowID, draft: ShowDraft) -> Result<Show> {
        draft.validate()?;
        self.ensure_show_relations(&draft).await?;
        let show = self
            .uow
            .shows
            .update(id, &draft)
            .await?
            .ok_or_else(|| CoreError::not_found("Show not found!"))?;
        info!(show_id = %show.id, "updated show");
        Ok(show)
    }

    pub async fn delete_show(&self, id: ShowID) -> Result<()> {
        if !self.uow.shows.delete(id).await? {
            return Err(CoreError::not_found("Show not found!"));
        }
        info!(show_id = %id, "deleted show");
        Ok(())
    }

    // Feeds

    pub async fn newest(&self, viewer: Option<Uuid>) -> Result<Vec<ShowCard>> {
        let shows = self.uow.shows.newest(FEED_LIMIT).await?;
        self.cards(viewer, &shows).await
    }

    pub async fn random(&self, viewer: Option<Uuid>) -> Result<Vec<ShowCard>> {
        let shows = self.uow.shows.random(FEED_LIMIT).await?;
        self.cards(viewer, &shows).await
    }

    pub async fn user_list(&self, user: Uuid, list: UserList) -> Result<Vec<ShowCard>> {
        let ids = self.uow.user_lists.show_ids(user, list).await?;
        self.ordered_cards(Some(user), &ids).await
    }

    pub async fn history(&self, user: Uuid) -> Result<Vec<ShowCard>> {
        let entries = self.uow.progress.history(user, DEFAULT_HISTORY_LIMIT).await?;
        let ids = latest_unique(&entries, DEFAULT_HISTORY_LIMIT);
        debug!(user_id = %user, entries = entries.len(), unique = ids.len(), "resolved history");
        self.ordered_cards(Some(user), &ids).await
    }

    pub async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(CoreError::invalid("No search query provided"));
        }
        let shows = self.uow.shows.search(query).await?;
        Ok(shows
            .into_iter()
            .map(|show| SearchHit {
                kind: show.kind,
                id: show.id,
                description: truncate_description(&show.description),
                name: show.name,
            })
            .collect())
    }

    // Artists

    pub async fn list_artists(&self) -> Result<Vec<ArtistView>> {
        Ok(self
            .uow
            .artists
            .list()
            .await?
            .into_iter()
            .map(ArtistView::from)
            .collect())
    }

    pub async fn artist_detail(&self, id: ArtistID, viewer: Option<Uuid>) -> Result<ArtistDetail> {
        let artist = self
            .uow
            .artists
            .get(id)
            .await?
            .ok_or_else(|| CoreError::not_found("Artist not found"))?;
        let nationality_detail = match artist.nationality {
            Some(country) => self.uow.countries.get(country).await?,
            None => None,
        };
        let shows = self.uow.shows.list_filtered(ShowFilter::Artist(id)).await?;
        Ok(ArtistDetail {
            artist: artist.into(),
            nationality_detail,
            shows: self.cards(viewer, &shows).await?,
        })
    }

    async fn ensure_nationality(&self, draft: &ArtistDraft) -> Result<()> {
        if let Some(country) = draft.nationality
            && self.uow.countries.get(country).await?.is_none()
        {
            return Err(CoreError::invalid("Unknown nationality"));
        }
        Ok(())
    }

    pub async fn create_artist(&self, draft: ArtistDraft) -> Result<Artist> {
        draft.validate()?;
        self.ensure_nationality(&draft).await?;
        let artist = self.uow.artists.create(&draft).await?;
        info!(artist_id = %artist.id, name = %artist.name, "created artist");
        Ok(artist)
    }

    pub async fn update_artist(&self, id: ArtistID, draft: ArtistDraft) -> Result<Artist> {
        draft.validate()?;
        self.ensure_nationality(&draft).await?;
        self.uow
            .artists
            .update(id, &draft)
            .await?
            .ok_or_else(|| CoreError::not_found("Artist not found"))
    }

    pub async fn delete_artist(&self, id: ArtistID) -> Result<()> {
        if !self.uow.artists.delete(id).await? {
            return Err(CoreError::not_found("Artist not found"));
        }
        info!(artist_id = %id, "deleted artist");
        Ok(())
    }

    // Countries

    pub async fn list_countries(&self) -> Result<Vec<Country>> {
        self.uow.countries.list().await
    }

    pub async fn country_detail(&self, id: CountryID, viewer: Option<Uuid>) -> Result<CountryDetail> {
        let country = self
            .uow
            .countries
            .get(id)
            .await?
            .ok_or_else(|| CoreError::not_found("Country not found"))?;
        let languages = self
            .uow
            .taxonomy
            .get_many(TaxonomyKind::Language, &country.language_ids)
            .await?;
        let artists = self.uow.artists.by_nationality(id).await?;
        let shows = self.uow.shows.list_filtered(ShowFilter::Country(id)).await?;
        Ok(CountryDetail {
            country,
            languages,
            artists: artists.into_iter().map(ArtistView::from).collect(),
            shows: self.cards(viewer, &shows).await?,
        })
    }

    async fn ensure_languages(&self, draft: &CountryDraft) -> Result<()> {
        let ids = unique(&draft.language_ids);
        let found = self
            .uow
            .taxonomy
            .get_many(TaxonomyKind::Language, &ids)
            .await?;
        if found.len() != ids.len() {
            return Err(CoreError::invalid("Unknown language in country"));
        }
        Ok(())
    }

    pub async fn create_country(&self, draft: CountryDraft) -> Result<Country> {
        draft.validate()?;
        self.ensure_languages(&draft).await?;
        let country = self.uow.countries.create(&draft).await?;
        info!(country_id = %country.id, name = %country.name, "created country");
        Ok(country)
    }

    pub async fn update_country(&self, id: CountryID, draft: CountryDraft) -> Result<Country> {
        draft.validate()?;
        self.ensure_languages(&draft).await?;
        self.uow
            .countries
            .update(id, &draft)
            .await?
            .ok_or_else(|| CoreError::not_found("Country not found"))
    }

    pub async fn delete_country(&self, id: CountryID) -> Result<()> {
        if !self.uow.countries.delete(id).await? {
            return Err(CoreError::not_found("Country not found"));
        }
        info!(country_id = %id, "deleted country");
        Ok(())
    }

    // Languages, genres, ratings, labels

    pub async fn list_taxonomy(&self, kind: TaxonomyKind) -> Result<Vec<Taxonomy>> {
        self.uow.taxonomy.list(kind).await
    }

    pub async fn taxonomy_detail(
        &self,
        kind: TaxonomyKind,
        id: TaxonomyID,
        viewer: Option<Uuid>,
    ) -> Result<TaxonomyDetail> {
        let taxonomy = self
            .uow
            .taxonomy
            .get(kind, id)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("{} not found", capitalize(kind.as_str()))))?;
        let countries = match kind {
            TaxonomyKind::Language => Some(self.uow.countries.speaking(id).await?),
            _ => None,
        };
        let shows = self
            .uow
            .shows
            .list_filtered(ShowFilter::Taxonomy(kind, id))
            .await?;
        Ok(TaxonomyDetail {
            taxonomy,
            countries,
            shows: self.cards(viewer, &shows).await?,
        })
    }

    pub async fn create_taxonomy(&self, kind: TaxonomyKind, draft: TaxonomyDraft) -> Result<Taxonomy> {
        draft.validate()?;
        let entry = self.uow.taxonomy.create(kind, &draft).await?;
        info!(kind = %kind, id = %entry.id, name = %entry.name, "created taxonomy entry");
        Ok(entry)
    }

    pub async fn update_taxonomy(
        &self,
        kind: TaxonomyKind,
        id: TaxonomyID,
        draft: TaxonomyDraft,
    ) -> Result<Taxonomy> {
        draft.validate()?;
        self.uow
            .taxonomy
            .update(kind, id, &draft)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("{} not found", capitalize(kind.as_str()))))
    }

    pub async fn delete_taxonomy(&self, kind: TaxonomyKind, id: TaxonomyID) -> Result<()> {
        if !self.uow.taxonomy.delete(kind, id).await? {
            return Err(CoreError::not_found(format!("{} not found", capitalize(kind.as_str()))));
        }
        info!(kind = %kind, id = %id, "deleted taxonomy entry");
        Ok(())
    }

    // Images

    /// Point an entity's image slot at a stored media path. Fails with
    /// `NotFound` when the entity does not exist.
    pub async fn set_image(&self, slot: ImageSlot, id: i64, path: Option<&str>) -> Result<()> {
        let updated = match slot {
            ImageSlot::Show => self.uow.shows.set_image(ShowID(id), path).await?,
            ImageSlot::Artist => self.uow.artists.set_image(ArtistID(id), path).await?,
            ImageSlot::CountryFlag | ImageSlot::CountryImage => {
                self.uow.countries.set_image(CountryID(id), slot, path).await?
            }
            ImageSlot::Taxonomy(kind) => {
                self.uow.taxonomy.set_image(kind, TaxonomyID(id), path).await?
            }
        };
        if !updated {
            return Err(CoreError::not_found(format!(
                "No {} with id {id}",
                slot.collection()
            )));
        }
        Ok(())
    }

    /// Whether the entity owning `slot` exists.
    pub async fn image_owner_exists(&self, slot: ImageSlot, id: i64) -> Result<bool> {
        Ok(match slot {
            ImageSlot::Show => self.uow.shows.get(ShowID(id)).await?.is_some(),
            ImageSlot::Artist => self.uow.artists.get(ArtistID(id)).await?.is_some(),
            ImageSlot::CountryFlag | ImageSlot::CountryImage => {
                self.uow.countries.get(CountryID(id)).await?.is_some()
            }
            ImageSlot::Taxonomy(kind) => {
                self.uow.taxonomy.get(kind, TaxonomyID(id)).await?.is_some()
            }
        })
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_only_applies_past_the_limit() {
        let exact = "a".repeat(100);
        assert_eq!(truncate_description(&exact), exact);

        let long = "é".repeat(101);
        let cut = truncate_description(&long);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), 103);
    }

    #[test]
    fn capitalize_first_letter() {
        assert_eq!(capitalize("genre"), "Genre");
        assert_eq!(capitalize(""), "");
    }
}
