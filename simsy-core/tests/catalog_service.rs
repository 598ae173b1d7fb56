//! Catalog composition over the in-memory adapters.

use anyhow::Result;
use simsy_core::CoreError;
use simsy_model::{
    ArtistDraft, ArtistID, ShowDraft, ShowID, TaxonomyDraft, TaxonomyID,
    TaxonomyKind, UserList,
};

#[path = "support/mod.rs"]
mod support;

use support::Services;

#[tokio::test]
async fn show_detail_nests_relations_and_membership() -> Result<()> {
    let services = Services::in_memory();
    let user = services.user("viewer").await;
    let film = services.seeded_film().await;

    services
        .tracking
        .toggle(user.id, film.id, UserList::Watchlist)
        .await?;

    let anonymous = services.catalog.show_detail(film.id, None).await?;
    assert!(!anonymous.in_watchlist);

    let detail = services.catalog.show_detail(film.id, Some(user.id)).await?;
    assert_eq!(detail.countries[0].name, "Mexico");
    assert_eq!(detail.languages[0].name, "Spanish");
    assert_eq!(detail.genres[0].name, "Drama");
    assert_eq!(detail.rating.as_ref().map(|r| r.name.as_str()), Some("PG-13"));
    assert_eq!(detail.artists[0].artist.name, "Gael");
    assert!(detail.in_watchlist);
    assert!(!detail.in_favorites);
    assert!(detail.age.is_some());
    Ok(())
}

#[tokio::test]
async fn related_details_list_show_cards() -> Result<()> {
    let services = Services::in_memory();
    let film = services.seeded_film().await;
    let detail = services.catalog.show_detail(film.id, None).await?;

    let artist = services
        .catalog
        .artist_detail(detail.artists[0].artist.id, None)
        .await?;
    assert_eq!(artist.shows.len(), 1);
    assert_eq!(
        artist.nationality_detail.map(|c| c.name),
        Some("Mexico".to_string())
    );

    let country = services
        .catalog
        .country_detail(detail.countries[0].id, None)
        .await?;
    assert_eq!(country.languages.len(), 1);
    assert_eq!(country.artists.len(), 1);
    assert_eq!(country.shows[0].id, film.id);

    let language = services
        .catalog
        .taxonomy_detail(TaxonomyKind::Language, detail.languages[0].id, None)
        .await?;
    assert_eq!(language.countries.as_ref().map(Vec::len), Some(1));
    assert_eq!(language.shows.len(), 1);

    let genre = services
        .catalog
        .taxonomy_detail(TaxonomyKind::Genre, detail.genres[0].id, None)
        .await?;
    assert!(genre.countries.is_none());
    Ok(())
}

#[tokio::test]
async fn unknown_relations_are_rejected() {
    let services = Services::in_memory();

    let mut draft = ShowDraft::named("Orphan");
    draft.artist_ids = vec![ArtistID(404)];
    let err = services.catalog.create_show(draft).await.unwrap_err();
    assert!(matches!(err, CoreError::InvalidInput(_)));

    let mut draft = ShowDraft::named("Orphan");
    draft.genre_ids = vec![TaxonomyID(9)];
    let err = services.catalog.create_show(draft).await.unwrap_err();
    assert!(matches!(err, CoreError::InvalidInput(_)));

    let mut artist = ArtistDraft::named("Nobody");
    artist.nationality = Some(simsy_model::CountryID(3));
    let err = services.catalog.create_artist(artist).await.unwrap_err();
    assert!(matches!(err, CoreError::InvalidInput(_)));
}

#[tokio::test]
async fn films_cannot_carry_episodes() {
    let services = Services::in_memory();
    let mut draft = ShowDraft::named("Film");
    draft.episodes = simsy_model::EpisodeCounts::from_seasons(&[3]);
    let err = services.catalog.create_show(draft).await.unwrap_err();
    assert!(matches!(err, CoreError::Model(_)));
}

#[tokio::test]
async fn search_matches_name_or_description_and_truncates() -> Result<()> {
    let services = Services::in_memory();
    let mut long = ShowDraft::named("Long Story");
    long.description = "x".repeat(150);
    services.catalog.create_show(long).await?;
    services.seeded_film().await;

    let hits = services.catalog.search("CAR CRASH").await?;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "Amores");

    let hits = services.catalog.search("long").await?;
    assert_eq!(hits[0].description.len(), 103);
    assert!(hits[0].description.ends_with("..."));

    let err = services.catalog.search("   ").await.unwrap_err();
    assert!(matches!(err, CoreError::InvalidInput(ref m) if m == "No search query provided"));
    Ok(())
}

#[tokio::test]
async fn feeds_follow_list_order_and_history() -> Result<()> {
    let services = Services::in_memory();
    let user = services.user("viewer").await;
    let first = services.film("First").await;
    let second = services.film("Second").await;

    let newest = services.catalog.newest(None).await?;
    assert_eq!(newest[0].id, second.id);
    assert!(services.catalog.random(None).await?.len() <= 10);

    services
        .tracking
        .toggle(user.id, second.id, UserList::Favorites)
        .await?;
    services
        .tracking
        .toggle(user.id, first.id, UserList::Favorites)
        .await?;
    let favorites = services.catalog.user_list(user.id, UserList::Favorites).await?;
    let ids: Vec<ShowID> = favorites.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
    assert!(favorites.iter().all(|c| c.in_favorites));

    for show in [first.id, second.id, first.id] {
        services
            .tracking
            .update_progress(user.id, show, Default::default())
            .await?;
    }
    let history = services.catalog.history(user.id).await?;
    let ids: Vec<ShowID> = history.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![first.id, second.id]);

    services.catalog.delete_show(second.id).await?;
    let history = services.catalog.history(user.id).await?;
    assert_eq!(history.len(), 1);
    Ok(())
}

#[tokio::test]
async fn taxonomy_crud_round() -> Result<()> {
    let services = Services::in_memory();
    let label = services
        .catalog
        .create_taxonomy(TaxonomyKind::Label, TaxonomyDraft::named("Classic"))
        .await?;
    let updated = services
        .catalog
        .update_taxonomy(TaxonomyKind::Label, label.id, TaxonomyDraft::named("Cult"))
        .await?;
    assert_eq!(updated.name, "Cult");

    services
        .catalog
        .delete_taxonomy(TaxonomyKind::Label, label.id)
        .await?;
    let err = services
        .catalog
        .delete_taxonomy(TaxonomyKind::Label, label.id)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound(ref m) if m == "Label not found"));
    Ok(())
}
