//! Per-user show state, progress, episode moves, lists and feeds.

use axum::http::StatusCode;
use serde_json::{Value, json};
use simsy_core::api::routes::{fill, v1};

#[path = "support/mod.rs"]
mod support;

use support::TestApp;

async fn seeded() -> (TestApp, String, i64) {
    let app = TestApp::new();
    let staff = app.sign_up("curator").await;
    let series = app
        .create_show(
            &staff,
            json!({ "name": "Dark", "kind": "series", "episodes": { "1": 2, "2": 3 } }),
        )
        .await;
    let viewer = app.sign_up("viewer").await;
    (app, viewer, series)
}

#[tokio::test]
async fn tracking_routes_need_a_user() {
    let (app, _, series) = seeded().await;
    let response = app
        .server
        .get(&fill(v1::shows::USER_STATE, &[("id", &series)]))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["error"]["status"], 401);
}

#[tokio::test]
async fn fresh_state_starts_at_the_first_episode() {
    let (app, viewer, series) = seeded().await;
    let state = app
        .server
        .get(&fill(v1::shows::USER_STATE, &[("id", &series)]))
        .authorization_bearer(&viewer)
        .await
        .json::<Value>();
    assert_eq!(state["data"]["season_reached"], 1);
    assert_eq!(state["data"]["episode_reached"], 1);
    assert_eq!(state["data"]["time_reached"], 0);
    assert_eq!(state["data"]["in_watchlist"], false);
}

#[tokio::test]
async fn progress_updates_report_and_persist() {
    let (app, viewer, series) = seeded().await;
    let response = app
        .server
        .post(&fill(v1::shows::PROGRESS, &[("id", &series)]))
        .authorization_bearer(&viewer)
        .json(&json!({ "season": 2, "episode": 1, "time_reached": 95 }))
        .await;
    response.assert_status_ok();
    let data = &response.json::<Value>()["data"];
    assert_eq!(
        data["message"],
        "Updated time reached for the Series 'Dark' Season 2 Episode 1 to 95"
    );
    assert_eq!(data["new_time_reached"], 95);

    let state = app
        .server
        .get(&fill(v1::shows::USER_STATE, &[("id", &series)]))
        .authorization_bearer(&viewer)
        .await
        .json::<Value>();
    assert_eq!(state["data"]["season_reached"], 2);
    assert_eq!(state["data"]["time_reached"], 95);

    app.server
        .post(&fill(v1::shows::PROGRESS, &[("id", &series)]))
        .authorization_bearer(&viewer)
        .json(&json!({ "season": 3, "episode": 1 }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn next_episode_crosses_seasons() {
    let (app, viewer, series) = seeded().await;
    let next = fill(v1::shows::EPISODES, &[("id", &series), ("nav", &"next")]);

    let response = app
        .server
        .post(&next)
        .authorization_bearer(&viewer)
        .json(&json!({ "season": 1, "episode": 2 }))
        .await;
    response.assert_status_ok();
    let data = &response.json::<Value>()["data"];
    assert_eq!(data["new_season"], 2);
    assert_eq!(data["new_episode"], 1);
    assert_eq!(data["changed"], true);

    // Without a body the move starts from the stored position.
    let data = app
        .server
        .post(&next)
        .authorization_bearer(&viewer)
        .await
        .json::<Value>();
    assert_eq!(data["data"]["new_season"], 2);
    assert_eq!(data["data"]["new_episode"], 2);
}

#[tokio::test]
async fn episode_routes_reject_films_and_unknown_moves() {
    let app = TestApp::new();
    let staff = app.sign_up("curator").await;
    let film = app.create_show(&staff, json!({ "name": "Heat" })).await;

    app.server
        .post(&fill(v1::shows::EPISODES, &[("id", &film), ("nav", &"next")]))
        .authorization_bearer(&staff)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    app.server
        .post(&fill(v1::shows::EPISODES, &[("id", &film), ("nav", &"sideways")]))
        .authorization_bearer(&staff)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    app.server
        .post(&fill(v1::shows::EPISODES, &[("id", &999), ("nav", &"next")]))
        .authorization_bearer(&staff)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn favorite_toggle_reports_membership() {
    let (app, viewer, series) = seeded().await;
    let favorite = fill(v1::shows::FAVORITE, &[("id", &series)]);

    let added = app
        .server
        .post(&favorite)
        .authorization_bearer(&viewer)
        .await
        .json::<Value>();
    assert_eq!(added["data"]["in_favorites"], true);
    assert_eq!(added["data"]["message"], "Show added to favorites successfully!");

    let feed = app
        .server
        .get(v1::home::FAVORITES)
        .authorization_bearer(&viewer)
        .await
        .json::<Value>();
    assert_eq!(feed["data"][0]["id"], series);
    assert_eq!(feed["data"][0]["in_favorites"], true);

    let removed = app
        .server
        .post(&favorite)
        .authorization_bearer(&viewer)
        .await
        .json::<Value>();
    assert_eq!(removed["data"]["in_favorites"], false);

    app.server
        .post(&fill(v1::shows::WATCHLIST, &[("id", &999)]))
        .authorization_bearer(&viewer)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn browsing_marks_lists_for_signed_in_viewers() {
    let (app, viewer, series) = seeded().await;
    app.server
        .post(&fill(v1::shows::WATCHLIST, &[("id", &series)]))
        .authorization_bearer(&viewer)
        .await
        .assert_status_ok();

    let signed_in = app
        .server
        .get(v1::home::NEWEST)
        .authorization_bearer(&viewer)
        .await
        .json::<Value>();
    assert_eq!(signed_in["data"][0]["in_watchlist"], true);

    let anonymous = app.server.get(v1::home::NEWEST).await.json::<Value>();
    assert_eq!(anonymous["data"][0]["in_watchlist"], false);
}

#[tokio::test]
async fn history_lists_watched_shows() {
    let (app, viewer, series) = seeded().await;
    app.server
        .post(&fill(v1::shows::PROGRESS, &[("id", &series)]))
        .authorization_bearer(&viewer)
        .json(&json!({ "time_reached": 10 }))
        .await
        .assert_status_ok();

    let history = app
        .server
        .get(v1::home::HISTORY)
        .authorization_bearer(&viewer)
        .await
        .json::<Value>();
    let entries = history["data"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["name"], "Dark");
}
