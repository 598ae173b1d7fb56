//! Progress, episode navigation and list toggles over the in-memory
//! adapters.

use anyhow::Result;
use simsy_core::CoreError;
use simsy_core::application::{EpisodeFrom, ProgressUpdate};
use simsy_core::progress::{Navigation, ProgressError};
use simsy_model::{ShowID, UserList};

#[path = "support/mod.rs"]
mod support;

use support::Services;

#[tokio::test]
async fn fresh_state_reads_defaults_without_writing() -> Result<()> {
    let services = Services::in_memory();
    let user = services.user("viewer").await;
    let series = services.series("Dark", &[10, 8]).await;

    let state = services.tracking.user_state(user.id, series.id).await?;
    assert_eq!(state.season_reached, Some(1));
    assert_eq!(state.episode_reached, Some(1));
    assert_eq!(state.time_reached, 0);
    assert!(state.time_autosave);
    assert!(!state.view_captions);

    assert!(services.catalog.history(user.id).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn progress_update_message_and_time() -> Result<()> {
    let services = Services::in_memory();
    let user = services.user("viewer").await;
    let series = services.series("Dark", &[10, 8]).await;

    let updated = services
        .tracking
        .update_progress(
            user.id,
            series.id,
            ProgressUpdate {
                season: Some(2),
                episode: Some(3),
                time_reached: Some(845),
            },
        )
        .await?;
    assert_eq!(updated.new_time_reached, 845);
    assert_eq!(
        updated.message,
        "Updated time reached for the Series 'Dark' Season 2 Episode 3 to 845"
    );

    // Omitted fields keep the stored position and time.
    let again = services
        .tracking
        .update_progress(user.id, series.id, ProgressUpdate::default())
        .await?;
    assert_eq!(again.new_time_reached, 845);

    let state = services.tracking.user_state(user.id, series.id).await?;
    assert_eq!((state.season_reached, state.episode_reached), (Some(2), Some(3)));
    Ok(())
}

#[tokio::test]
async fn out_of_range_progress_is_rejected() {
    let services = Services::in_memory();
    let user = services.user("viewer").await;
    let series = services.series("Dark", &[10]).await;

    let err = services
        .tracking
        .update_progress(
            user.id,
            series.id,
            ProgressUpdate {
                season: Some(2),
                episode: Some(1),
                time_reached: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Progress(ProgressError::OutOfRange(_))));

    // A rejected write stores neither progress nor history.
    assert!(services.uow.progress.get(user.id, series.id).await.unwrap().is_none());
    assert!(services.catalog.history(user.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn autosaves_keep_one_history_entry_per_show() -> Result<()> {
    let services = Services::in_memory();
    let user = services.user("viewer").await;
    let series = services.series("Dark", &[10]).await;
    let film = services.film("Amores").await;

    for tick in 0..200u64 {
        services
            .tracking
            .update_progress(
                user.id,
                series.id,
                ProgressUpdate {
                    time_reached: Some(tick * 5),
                    ..ProgressUpdate::default()
                },
            )
            .await?;
    }
    services
        .tracking
        .update_progress(user.id, film.id, ProgressUpdate::default())
        .await?;

    let stored = services.uow.progress.history(user.id, 100).await?;
    let ids: Vec<ShowID> = stored.iter().map(|entry| entry.show_id).collect();
    assert_eq!(ids, vec![film.id, series.id]);

    assert_eq!(services.uow.progress.history(user.id, 1).await?.len(), 1);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_saves_keep_every_episode_slot() -> Result<()> {
    let services = Services::in_memory();
    let user = services.user("viewer").await;
    let series = services.series("Dark", &[40]).await;

    let (user_id, show_id) = (user.id, series.id);
    let mut tasks = Vec::new();
    for episode in 1..=40u32 {
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

    for episode in 1..=40u32 {
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

#[tokio::test]
async fn episode_moves_cross_seasons_and_resume() -> Result<()> {
    let services = Services::in_memory();
    let user = services.user("viewer").await;
    let series = services.series("Dark", &[2, 3]).await;

    services
        .tracking
        .update_progress(
            user.id,
            series.id,
            ProgressUpdate {
                season: Some(2),
                episode: Some(1),
                time_reached: Some(90),
            },
        )
        .await?;

    let back = services
        .tracking
        .change_episode(user.id, series.id, Navigation::Previous, EpisodeFrom::default())
        .await?;
    assert_eq!((back.new_season, back.new_episode), (1, 2));
    assert_eq!(back.message, "Back to the last episode of the previous season.");
    assert_eq!(back.starting_time, 0);

    let forward = services
        .tracking
        .change_episode(user.id, series.id, Navigation::Next, EpisodeFrom::default())
        .await?;
    assert_eq!((forward.new_season, forward.new_episode), (2, 1));
    assert_eq!(forward.starting_time, 90);

    let last = services
        .tracking
        .change_episode(user.id, series.id, Navigation::Last, EpisodeFrom::default())
        .await?;
    assert_eq!((last.new_season, last.new_episode), (2, 3));

    let stuck = services
        .tracking
        .change_episode(user.id, series.id, Navigation::Next, EpisodeFrom::default())
        .await?;
    assert!(!stuck.changed);
    assert_eq!(stuck.message, "Last episode of last season!");
    Ok(())
}

#[tokio::test]
async fn explicit_start_position_wins() -> Result<()> {
    let services = Services::in_memory();
    let user = services.user("viewer").await;
    let series = services.series("Dark", &[4]).await;

    let change = services
        .tracking
        .change_episode(
            user.id,
            series.id,
            Navigation::Next,
            EpisodeFrom {
                season: Some(1),
                episode: Some(3),
            },
        )
        .await?;
    assert_eq!((change.new_season, change.new_episode), (1, 4));
    Ok(())
}

#[tokio::test]
async fn films_have_no_episodes_to_change() -> Result<()> {
    let services = Services::in_memory();
    let user = services.user("viewer").await;
    let film = services.film("Heat").await;

    let err = services
        .tracking
        .change_episode(user.id, film.id, Navigation::Next, EpisodeFrom::default())
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Progress(ProgressError::NotEpisodic)));

    let updated = services
        .tracking
        .update_progress(
            user.id,
            film.id,
            ProgressUpdate {
                time_reached: Some(0),
                ..ProgressUpdate::default()
            },
        )
        .await?;
    assert_eq!(updated.new_time_reached, 0);
    assert!(updated.message.starts_with("Updated time reached for the Film 'Heat'"));
    Ok(())
}

#[tokio::test]
async fn toggles_flip_membership() -> Result<()> {
    let services = Services::in_memory();
    let user = services.user("viewer").await;
    let film = services.film("Heat").await;

    let added = services
        .tracking
        .toggle(user.id, film.id, UserList::Favorites)
        .await?;
    assert!(added.in_list);
    assert_eq!(added.message, "Show added to favorites successfully!");

    let removed = services
        .tracking
        .toggle(user.id, film.id, UserList::Favorites)
        .await?;
    assert!(!removed.in_list);
    assert_eq!(removed.message, "Show removed from favorites successfully!");

    let err = services
        .tracking
        .toggle(user.id, ShowID(999), UserList::Watchlist)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound(ref m) if m == "Show not found!"));
    Ok(())
}

#[tokio::test]
async fn unknown_show_is_not_found() {
    let services = Services::in_memory();
    let user = services.user("viewer").await;
    let err = services
        .tracking
        .user_state(user.id, ShowID(42))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound(_)));
}
