use async_trait::async_trait;
use chrono::Utc;
use rand::seq::SliceRandom;
use simsy_model::{
    Artist, ArtistDraft, ArtistID, Country, CountryDraft, CountryID, ImageSlot,
    Show, ShowDraft, ShowID, Taxonomy, TaxonomyDraft, TaxonomyID, TaxonomyKind,
};

use super::{InMemoryDatabase, MemoryState};
use crate::database::ports::{
    artists::ArtistsRepository,
    countries::CountriesRepository,
    shows::{ShowFilter, ShowsRepository},
    taxonomy::TaxonomyRepository,
};
use crate::error::{CoreError, Result};

fn missing(what: &str) -> CoreError {
    CoreError::invalid(format!("{what}: referenced record does not exist"))
}

fn check_show_relations(state: &MemoryState, draft: &ShowDraft) -> Result<()> {
    if !draft.country_ids.iter().all(|id| state.countries.contains_key(id)) {
        return Err(missing("countries"));
    }
    if !draft.artist_ids.iter().all(|id| state.artists.contains_key(id)) {
        return Err(missing("artists"));
    }
    let taxonomy = [
        (TaxonomyKind::Language, &draft.language_ids),
        (TaxonomyKind::Genre, &draft.genre_ids),
        (TaxonomyKind::Label, &draft.label_ids),
    ];
    for (kind, ids) in taxonomy {
        if !ids.iter().all(|id| state.taxonomy_exists(kind, *id)) {
            return Err(missing(kind.collection()));
        }
    }
    if let Some(rating) = draft.rating_id
        && !state.taxonomy_exists(TaxonomyKind::Rating, rating)
    {
        return Err(missing("ratings"));
    }
    Ok(())
}

fn normalize(mut draft: ShowDraft) -> ShowDraft {
    draft.name = draft.name.trim().to_string();
    draft.year = draft.year.trim().to_string();
    for ids in [
        &mut draft.language_ids,
        &mut draft.genre_ids,
        &mut draft.label_ids,
    ] {
        ids.sort();
        ids.dedup();
    }
    draft.country_ids.sort();
    draft.country_ids.dedup();
    draft.artist_ids.sort();
    draft.artist_ids.dedup();
    draft
}

fn catalog_order(shows: &mut [Show]) {
    shows.sort_by(|a, b| {
        b.year
            .cmp(&a.year)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.id.cmp(&b.id))
    });
}

#[async_trait]
impl TaxonomyRepository for InMemoryDatabase {
    async fn list(&self, kind: TaxonomyKind) -> Result<Vec<Taxonomy>> {
        let state = self.state.read();
        let mut entries: Vec<Taxonomy> = state
            .taxonomy
            .get(&kind)
            .map(|entries| entries.values().cloned().collect())
            .unwrap_or_default();
        if kind.orders_by_name() {
            entries.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        }
        Ok(entries)
    }

    async fn get(&self, kind: TaxonomyKind, id: TaxonomyID) -> Result<Option<Taxonomy>> {
        let state = self.state.read();
        Ok(state
            .taxonomy
            .get(&kind)
            .and_then(|entries| entries.get(&id))
            .cloned())
    }

    async fn get_many(
        &self,
        kind: TaxonomyKind,
        ids: &[TaxonomyID],
    ) -> Result<Vec<Taxonomy>> {
        let all = TaxonomyRepository::list(self, kind).await?;
        Ok(all.into_iter().filter(|t| ids.contains(&t.id)).collect())
    }

    async fn create(&self, kind: TaxonomyKind, draft: &TaxonomyDraft) -> Result<Taxonomy> {
        let mut state = self.state.write();
        let entry = Taxonomy {
            id: TaxonomyID(state.next_id()),
            kind,
            name: draft.name.trim().to_string(),
            image: None,
            description: draft.description.clone(),
        };
        state
            .taxonomy
            .entry(kind)
            .or_default()
            .insert(entry.id, entry.clone());
        Ok(entry)
    }

    async fn update(
        &self,
        kind: TaxonomyKind,
        id: TaxonomyID,
        draft: &TaxonomyDraft,
    ) -> Result<Option<Taxonomy>> {
        let mut state = self.state.write();
        let Some(entry) = state
            .taxonomy
            .get_mut(&kind)
            .and_then(|entries| entries.get_mut(&id))
        else {
            return Ok(None);
        };
        entry.name = draft.name.trim().to_string();
        entry.description = draft.description.clone();
        Ok(Some(entry.clone()))
    }

    async fn delete(&self, kind: TaxonomyKind, id: TaxonomyID) -> Result<bool> {
        let mut state = self.state.write();
        let removed = state
            .taxonomy
            .get_mut(&kind)
            .and_then(|entries| entries.remove(&id))
            .is_some();
        if !removed {
            return Ok(false);
        }

        for show in state.shows.values_mut() {
            match kind {
                TaxonomyKind::Language => show.language_ids.retain(|x| *x != id),
                TaxonomyKind::Genre => show.genre_ids.retain(|x| *x != id),
                TaxonomyKind::Label => show.label_ids.retain(|x| *x != id),
                TaxonomyKind::Rating => {
                    if show.rating_id == Some(id) {
                        show.rating_id = None;
                    }
                }
            }
        }
        if kind == TaxonomyKind::Language {
            for country in state.countries.values_mut() {
                country.language_ids.retain(|x| *x != id);
            }
        }
        Ok(true)
    }

    async fn set_image(
        &self,
        kind: TaxonomyKind,
        id: TaxonomyID,
        path: Option<&str>,
    ) -> Result<bool> {
        let mut state = self.state.write();
        let Some(entry) = state
            .taxonomy
            .get_mut(&kind)
            .and_then(|entries| entries.get_mut(&id))
        else {
            return Ok(false);
        };
        entry.image = path.map(str::to_string);
        Ok(true)
    }
}

#[async_trait]
impl CountriesRepository for InMemoryDatabase {
    async fn list(&self) -> Result<Vec<Country>> {
        let state = self.state.read();
        let mut countries: Vec<Country> = state.countries.values().cloned().collect();
        countries.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(countries)
    }

    async fn get(&self, id: CountryID) -> Result<Option<Country>> {
        Ok(self.state.read().countries.get(&id).cloned())
    }

    async fn get_many(&self, ids: &[CountryID]) -> Result<Vec<Country>> {
        let all = CountriesRepository::list(self).await?;
        Ok(all.into_iter().filter(|c| ids.contains(&c.id)).collect())
    }

    async fn speaking(&self, language: TaxonomyID) -> Result<Vec<Country>> {
        let all = CountriesRepository::list(self).await?;
        Ok(all
            .into_iter()
            .filter(|c| c.language_ids.contains(&language))
            .collect())
    }

    async fn create(&self, draft: &CountryDraft) -> Result<Country> {
        let mut state = self.state.write();
        if !draft
            .language_ids
            .iter()
            .all(|id| state.taxonomy_exists(TaxonomyKind::Language, *id))
        {
            return Err(missing("languages"));
        }
        let mut language_ids = draft.language_ids.clone();
        language_ids.sort();
        language_ids.dedup();

        let country = Country {
            id: CountryID(state.next_id()),
            name: draft.name.trim().to_string(),
            language_ids,
            flag: None,
            image: None,
            description: draft.description.clone(),
        };
        state.countries.insert(country.id, country.clone());
        Ok(country)
    }

    async fn update(&self, id: CountryID, draft: &CountryDraft) -> Result<Option<Country>> {
        let mut state = self.state.write();
        if !draft
            .language_ids
            .iter()
            .all(|lang| state.taxonomy_exists(TaxonomyKind::Language, *lang))
        {
            return Err(missing("languages"));
        }
        let Some(country) = state.countries.get_mut(&id) else {
            return Ok(None);
        };
        country.name = draft.name.trim().to_string();
        country.description = draft.description.clone();
        country.language_ids = draft.language_ids.clone();
        country.language_ids.sort();
        country.language_ids.dedup();
        Ok(Some(country.clone()))
    }

    async fn delete(&self, id: CountryID) -> Result<bool> {
        let mut state = self.state.write();
        if state.countries.remove(&id).is_none() {
            return Ok(false);
        }
        for artist in state.artists.values_mut() {
            if artist.nationality == Some(id) {
                artist.nationality = None;
            }
        }
        for show in state.shows.values_mut() {
            show.country_ids.retain(|x| *x != id);
        }
        Ok(true)
    }

    async fn set_image(
        &self,
        id: CountryID,
        slot: ImageSlot,
        path: Option<&str>,
    ) -> Result<bool> {
        let mut state = self.state.write();
        let Some(country) = state.countries.get_mut(&id) else {
            return Ok(false);
        };
        let target = match slot {
            ImageSlot::CountryFlag => &mut country.flag,
            ImageSlot::CountryImage => &mut country.image,
            other => {
                return Err(CoreError::invalid(format!(
                    "countries have no {} image",
                    other.slot()
                )));
            }
        };
        *target = path.map(str::to_string);
        Ok(true)
    }
}

#[async_trait]
impl ArtistsRepository for InMemoryDatabase {
    async fn list(&self) -> Result<Vec<Artist>> {
        let state = self.state.read();
        let mut artists: Vec<Artist> = state.artists.values().cloned().collect();
        artists.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(artists)
    }

    async fn get(&self, id: ArtistID) -> Result<Option<Artist>> {
        Ok(self.state.read().artists.get(&id).cloned())
    }

    async fn get_many(&self, ids: &[ArtistID]) -> Result<Vec<Artist>> {
        let all = ArtistsRepository::list(self).await?;
        Ok(all.into_iter().filter(|a| ids.contains(&a.id)).collect())
    }

    async fn by_nationality(&self, country: CountryID) -> Result<Vec<Artist>> {
        let all = ArtistsRepository::list(self).await?;
        Ok(all
            .into_iter()
            .filter(|a| a.nationality == Some(country))
            .collect())
    }

    async fn create(&self, draft: &ArtistDraft) -> Result<Artist> {
        let mut state = self.state.write();
        if let Some(country) = draft.nationality
            && !state.countries.contains_key(&country)
        {
            return Err(missing("nationality"));
        }
        let artist = Artist {
            id: ArtistID(state.next_id()),
            name: draft.name.trim().to_string(),
            birth_year: draft.birth_year,
            nationality: draft.nationality,
            image: None,
            description: draft.description.clone(),
        };
        state.artists.insert(artist.id, artist.clone());
        Ok(artist)
    }

    async fn update(&self, id: ArtistID, draft: &ArtistDraft) -> Result<Option<Artist>> {
        let mut state = self.state.write();
        if let Some(country) = draft.nationality
            && !state.countries.contains_key(&country)
        {
            return Err(missing("nationality"));
        }
        let Some(artist) = state.artists.get_mut(&id) else {
            return Ok(None);
        };
        artist.name = draft.name.trim().to_string();
        artist.birth_year = draft.birth_year;
        artist.nationality = draft.nationality;
        artist.description = draft.description.clone();
        Ok(Some(artist.clone()))
    }

    async fn delete(&self, id: ArtistID) -> Result<bool> {
        let mut state = self.state.write();
        if state.artists.remove(&id).is_none() {
            return Ok(false);
        }
        for show in state.shows.values_mut() {
            show.artist_ids.retain(|x| *x != id);
        }
        Ok(true)
    }

    async fn set_image(&self, id: ArtistID, path: Option<&str>) -> Result<bool> {
        let mut state = self.state.write();
        let Some(artist) = state.artists.get_mut(&id) else {
            return Ok(false);
        };
        artist.image = path.map(str::to_string);
        Ok(true)
    }
}

#[async_trait]
impl ShowsRepository for InMemoryDatabase {
    async fn list(&self) -> Result<Vec<Show>> {
        let mut shows: Vec<Show> = self.state.read().shows.values().cloned().collect();
        catalog_order(&mut shows);
        Ok(shows)
    }

    async fn list_filtered(&self, filter: ShowFilter) -> Result<Vec<Show>> {
        let all = ShowsRepository::list(self).await?;
        Ok(all
            .into_iter()
            .filter(|show| match filter {
                ShowFilter::Artist(id) => show.artist_ids.contains(&id),
                ShowFilter::Country(id) => show.country_ids.contains(&id),
                ShowFilter::Taxonomy(TaxonomyKind::Language, id) => {
                    show.language_ids.contains(&id)
                }
                ShowFilter::Taxonomy(TaxonomyKind::Genre, id) => {
                    show.genre_ids.contains(&id)
                }
                ShowFilter::Taxonomy(TaxonomyKind::Label, id) => {
                    show.label_ids.contains(&id)
                }
                ShowFilter::Taxonomy(TaxonomyKind::Rating, id) => {
                    show.rating_id == Some(id)
                }
            })
            .collect())
    }

    async fn get(&self, id: ShowID) -> Result<Option<Show>> {
        Ok(self.state.read().shows.get(&id).cloned())
    }

    async fn get_many(&self, ids: &[ShowID]) -> Result<Vec<Show>> {
        let state = self.state.read();
        Ok(ids
            .iter()
            .filter_map(|id| state.shows.get(id).cloned())
            .collect())
    }

    async fn create(&self, draft: &ShowDraft) -> Result<Show> {
        let mut state = self.state.write();
        check_show_relations(&state, draft)?;
        let id = ShowID(state.next_id());
        let show = Show::from_draft(id, normalize(draft.clone()), Utc::now());
        state.shows.insert(id, show.clone());
        Ok(show)
    }

    async fn update(&self, id: ShowID, draft: &ShowDraft) -> Result<Option<Show>> {
        let mut state = self.state.write();
        check_show_relations(&state, draft)?;
        let Some(show) = state.shows.get_mut(&id) else {
            return Ok(None);
        };
        show.apply_draft(normalize(draft.clone()), Utc::now());
        Ok(Some(show.clone()))
    }

    async fn delete(&self, id: ShowID) -> Result<bool> {
        let mut state = self.state.write();
        if state.shows.remove(&id).is_none() {
            return Ok(false);
        }
        for members in state.lists.values_mut() {
            members.retain(|x| *x != id);
        }
        state.progress.retain(|(_, show), _| *show != id);
        state.history.retain(|(_, show), _| *show != id);
        Ok(true)
    }

    async fn set_image(&self, id: ShowID, path: Option<&str>) -> Result<bool> {
        let mut state = self.state.write();
        let Some(show) = state.shows.get_mut(&id) else {
            return Ok(false);
        };
        show.image = path.map(str::to_string);
        show.updated = Utc::now();
        Ok(true)
    }

    async fn newest(&self, limit: usize) -> Result<Vec<Show>> {
        let mut shows: Vec<Show> = self.state.read().shows.values().cloned().collect();
        shows.sort_by(|a, b| b.updated.cmp(&a.updated).then_with(|| b.id.cmp(&a.id)));
        shows.truncate(limit);
        Ok(shows)
    }

    async fn random(&self, limit: usize) -> Result<Vec<Show>> {
        let mut shows: Vec<Show> = self.state.read().shows.values().cloned().collect();
        shows.shuffle(&mut rand::rng());
        shows.truncate(limit);
        Ok(shows)
    }

    async fn search(&self, query: &str) -> Result<Vec<Show>> {
        let needle = query.to_lowercase();
        let mut shows: Vec<Show> = self
            .state
            .read()
            .shows
            .values()
            .filter(|show| {
                show.name.to_lowercase().contains(&needle)
                    || show.description.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();
        catalog_order(&mut shows);
        Ok(shows)
    }
}
