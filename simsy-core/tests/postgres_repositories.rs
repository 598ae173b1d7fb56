//! Repository behaviour against a live PostgreSQL. Run with
//! `--features pg-tests` and `DATABASE_URL` pointing at a scratch server.
#![cfg(feature = "pg-tests")]

use anyhow::Result;
use chrono::{Duration, Utc};
use simsy_core::application::{AppUnitOfWork, ProgressUpdate};
use simsy_core::auth::{AuthCrypto, IssuedToken, TokenPurpose};
use simsy_core::database::PostgresDatabase;
use simsy_core::progress::Navigation;
use simsy_core::{CoreError, application::EpisodeFrom};
use simsy_model::UserList;
use sqlx::PgPool;

#[path = "support/mod.rs"]
mod support;

use support::Services;

fn services(pool: PgPool) -> Result<Services> {
    let db = PostgresDatabase::from_pool(pool);
    let uow = AppUnitOfWork::from_postgres(&db).map_err(anyhow::Error::msg)?;
    Ok(Services::over(uow))
}

#[sqlx::test(migrator = "simsy_core::MIGRATOR")]
async fn show_relations_round_trip(pool: PgPool) -> Result<()> {
    let services = services(pool)?;
    let film = services.seeded_film().await;

    let detail = services.catalog.show_detail(film.id, None).await?;
    assert_eq!(detail.countries.len(), 1);
    assert_eq!(detail.languages.len(), 1);
    assert_eq!(detail.genres.len(), 1);
    assert!(detail.rating.is_some());
    assert_eq!(detail.artists.len(), 1);

    let hits = services.catalog.search("car crash").await?;
    assert_eq!(hits.len(), 1);
    Ok(())
}

#[sqlx::test(migrator = "simsy_core::MIGRATOR")]
async fn deleting_an_artist_detaches_it_from_shows(pool: PgPool) -> Result<()> {
    let services = services(pool)?;
    let film = services.seeded_film().await;
    let artist = services.catalog.show_detail(film.id, None).await?.artists[0]
        .artist
        .id;

    services.catalog.delete_artist(artist).await?;
    let detail = services.catalog.show_detail(film.id, None).await?;
    assert!(detail.artists.is_empty());

    let err = services.catalog.delete_artist(artist).await.unwrap_err();
    assert!(matches!(err, CoreError::NotFound(_)));
    Ok(())
}

#[sqlx::test(migrator = "simsy_core::MIGRATOR")]
async fn progress_documents_and_history_persist(pool: PgPool) -> Result<()> {
    let services = services(pool)?;
    let user = services.user("viewer").await;
    let series = services.series("Dark", &[2, 2]).await;

    services
        .tracking
        .update_progress(
            user.id,
            series.id,
            ProgressUpdate {
                season: Some(1),
                episode: Some(2),
                time_reached: Some(300),
            },
        )
        .await?;
    let change = services
        .tracking
        .change_episode(user.id, series.id, Navigation::Next, EpisodeFrom::default())
        .await?;
    assert_eq!((change.new_season, change.new_episode), (2, 1));

    let back = services
        .tracking
        .change_episode(user.id, series.id, Navigation::Previous, EpisodeFrom::default())
        .await?;
    assert_eq!(back.starting_time, 300);

    let state = services.tracking.user_state(user.id, series.id).await?;
    assert_eq!(state.time_reached, 300);

    let history = services.catalog.history(user.id).await?;
    assert_eq!(history.len(), 1);
    assert_eq!(services.uow.progress.history(user.id, 10).await?.len(), 1);
    Ok(())
}

#[sqlx::test(migrator = "simsy_core::MIGRATOR")]
async fn concurrent_progress_writes_do_not_drop_slots(pool: PgPool) -> Result<()> {
    let services = services(pool)?;
    let user = services.user("viewer").await;
    let series = services.series("Dark", &[12]).await;

    let (user_id, show_id) = (user.id, series.id);
    let mut tasks = Vec::new();
    for episode in 1..=12u32 {
        let tracking = services.tracking.clone();
        tasks.push(tokio::spawn(async move {
            tracking
                .update_progress(
                    user_id,
                    show_id,
                    ProgressUpdate {
                        season: Some(1),
                        episode: Some(episode),
                        time_reached: Some(u64::from(episode) * 10),
                    },
                )
                .await
        }));
    }
    for task in tasks {
        task.await??;
    }

    for episode in 1..=12u32 {
        let resumed = services
            .tracking
            .update_progress(
                user.id,
                series.id,
                ProgressUpdate {
                    season: Some(1),
                    episode: Some(episode),
                    time_reached: None,
                },
            )
            .await?;
        assert_eq!(resumed.new_time_reached, u64::from(episode) * 10);
    }
    Ok(())
}

#[sqlx::test(migrator = "simsy_core::MIGRATOR")]
async fn lists_keep_insertion_order(pool: PgPool) -> Result<()> {
    let services = services(pool)?;
    let user = services.user("viewer").await;
    let a = services.film("A").await;
    let b = services.film("B").await;

    for show in [b.id, a.id] {
        services
            .tracking
            .toggle(user.id, show, UserList::Watchlist)
            .await?;
    }
    let cards = services.catalog.user_list(user.id, UserList::Watchlist).await?;
    assert_eq!(cards.iter().map(|c| c.id).collect::<Vec<_>>(), vec![b.id, a.id]);
    Ok(())
}

#[sqlx::test(migrator = "simsy_core::MIGRATOR")]
async fn expired_tokens_do_not_authenticate(pool: PgPool) -> Result<()> {
    let services = services(pool.clone())?;
    let user = services.user("viewer").await;

    let db = PostgresDatabase::from_pool(pool);
    let uow = AppUnitOfWork::from_postgres(&db).map_err(anyhow::Error::msg)?;
    let crypto = AuthCrypto::insecure_fast("test-pepper", "test-token-key")?;
    let token = IssuedToken::generate(&crypto, TokenPurpose::Session, Duration::seconds(-1))?;
    uow.sessions.store(user.id, &token).await?;

    assert!(
        uow.sessions
            .find_user(&token.digest, TokenPurpose::Session, Utc::now())
            .await?
            .is_none()
    );
    assert!(services.accounts.authenticate(&token.secret).await.is_err());
    Ok(())
}
