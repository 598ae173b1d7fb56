#![allow(dead_code)]

use std::sync::Arc;

use chrono::Duration;
use simsy_core::application::{
    AccountService, AppUnitOfWork, CatalogService, RegisterRequest,
    TrackingService,
};
use simsy_core::auth::AuthCrypto;
use simsy_model::{
    ArtistDraft, CountryDraft, EpisodeCounts, Show, ShowDraft, ShowKind,
    TaxonomyDraft, TaxonomyKind, User,
};

pub struct Services {
    pub uow: AppUnitOfWork,
    pub catalog: CatalogService,
    pub tracking: TrackingService,
    pub accounts: AccountService,
}

impl Services {
    pub fn in_memory() -> Self {
        Self::over(AppUnitOfWork::in_memory())
    }

    pub fn over(uow: AppUnitOfWork) -> Self {
        let crypto = AuthCrypto::insecure_fast("test-pepper", "test-token-key")
            .expect("test crypto");
        Self {
            catalog: CatalogService::new(uow.clone()),
            tracking: TrackingService::new(uow.clone()),
            accounts: AccountService::new(uow.clone(), Arc::new(crypto), Duration::hours(1)),
            uow,
        }
    }

    pub async fn user(&self, username: &str) -> User {
        self.accounts
            .register(RegisterRequest {
                username: username.into(),
                password: "password123".into(),
                email: format!("{username}@example.com"),
                ..RegisterRequest::default()
            })
            .await
            .expect("register user")
    }

    pub async fn series(&self, name: &str, seasons: &[u32]) -> Show {
        let mut draft = ShowDraft::named(name);
        draft.kind = ShowKind::Series;
        draft.episodes = EpisodeCounts::from_seasons(seasons);
        self.catalog.create_show(draft).await.expect("create series")
    }

    pub async fn film(&self, name: &str) -> Show {
        self.catalog
            .create_show(ShowDraft::named(name))
            .await
            .expect("create film")
    }

    /// A small catalog: one language spoken in one country, an artist from
    /// there and a film tying them together with a genre and rating.
    pub async fn seeded_film(&self) -> Show {
        let language = self
            .catalog
            .create_taxonomy(TaxonomyKind::Language, TaxonomyDraft::named("Spanish"))
            .await
            .expect("language");
        let genre = self
            .catalog
            .create_taxonomy(TaxonomyKind::Genre, TaxonomyDraft::named("Drama"))
            .await
            .expect("genre");
        let rating = self
            .catalog
            .create_taxonomy(TaxonomyKind::Rating, TaxonomyDraft::named("PG-13"))
            .await
            .expect("rating");

        let mut country = CountryDraft::named("Mexico");
        country.language_ids = vec![language.id];
        let country = self.catalog.create_country(country).await.expect("country");

        let mut artist = ArtistDraft::named("Gael");
        artist.birth_year = 1978;
        artist.nationality = Some(country.id);
        let artist = self.catalog.create_artist(artist).await.expect("artist");

        let mut film = ShowDraft::named("Amores");
        film.year = "2000".into();
        film.description = "Three stories connected by a car crash".into();
        film.country_ids = vec![country.id];
        film.language_ids = vec![language.id];
        film.genre_ids = vec![genre.id];
        film.rating_id = Some(rating.id);
        film.artist_ids = vec![artist.id];
        self.catalog.create_show(film).await.expect("film")
    }
}
