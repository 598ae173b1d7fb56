use axum::{
    Extension, Json,
    body::Bytes,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde_json::{Map, Value};
use simsy_core::api::types::ApiResponse;
use simsy_core::application::{
    EpisodeFrom, ProgressUpdate, ProgressUpdated, ShowDetail, ShowUserState,
};
use simsy_core::progress::{EpisodeChange, Navigation};
use simsy_model::{Show, ShowCard, ShowDraft, ShowID, User, UserList};

use super::json_or_default;
use crate::infra::app_state::AppState;
use crate::infra::errors::AppResult;

pub async fn list_shows(
    State(state): State<AppState>,
    viewer: Option<Extension<User>>,
) -> AppResult<Json<ApiResponse<Vec<ShowCard>>>> {
    let viewer = viewer.map(|Extension(user)| user.id);
    Ok(Json(ApiResponse::success(
        state.catalog.list_shows(viewer).await?,
    )))
}

pub async fn show_detail(
    State(state): State<AppState>,
    Path(id): Path<ShowID>,
    viewer: Option<Extension<User>>,
) -> AppResult<Json<ApiResponse<ShowDetail>>> {
    let viewer = viewer.map(|Extension(user)| user.id);
    Ok(Json(ApiResponse::success(
        state.catalog.show_detail(id, viewer).await?,
    )))
}

pub async fn create_show(
    State(state): State<AppState>,
    payload: Result<Json<ShowDraft>, JsonRejection>,
) -> AppResult<(StatusCode, Json<ApiResponse<Show>>)> {
    let Json(draft) = payload?;
    let show = state.catalog.create_show(draft).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(show))))
}

pub async fn update_show(
    State(state): State<AppState>,
    Path(id): Path<ShowID>,
    payload: Result<Json<ShowDraft>, JsonRejection>,
) -> AppResult<Json<ApiResponse<Show>>> {
    let Json(draft) = payload?;
    Ok(Json(ApiResponse::success(
        state.catalog.update_show(id, draft).await?,
    )))
}

pub async fn delete_show(
    State(state): State<AppState>,
    Path(id): Path<ShowID>,
) -> AppResult<StatusCode> {
    state.catalog.delete_show(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn user_state(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<ShowID>,
) -> AppResult<Json<ApiResponse<ShowUserState>>> {
    Ok(Json(ApiResponse::success(
        state.tracking.user_state(user.id, id).await?,
    )))
}

pub async fn update_progress(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<ShowID>,
    body: Bytes,
) -> AppResult<Json<ApiResponse<ProgressUpdated>>> {
    let update: ProgressUpdate = json_or_default(&body)?;
    Ok(Json(ApiResponse::success(
        state.tracking.update_progress(user.id, id, update).await?,
    )))
}

pub async fn change_episode(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path((id, nav)): Path<(ShowID, String)>,
    body: Bytes,
) -> AppResult<Json<ApiResponse<EpisodeChange>>> {
    let nav: Navigation = nav.parse()?;
    let from: EpisodeFrom = json_or_default(&body)?;
    Ok(Json(ApiResponse::success(
        state.tracking.change_episode(user.id, id, nav, from).await?,
    )))
}

pub async fn toggle_favorite(
    state: State<AppState>,
    user: Extension<User>,
    id: Path<ShowID>,
) -> AppResult<Json<ApiResponse<Value>>> {
    toggle(state, user, id, UserList::Favorites).await
}

pub async fn toggle_watchlist(
    state: State<AppState>,
    user: Extension<User>,
    id: Path<ShowID>,
) -> AppResult<Json<ApiResponse<Value>>> {
    toggle(state, user, id, UserList::Watchlist).await
}

/// Responds with `{message, in_<list>}`.
async fn toggle(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<ShowID>,
    list: UserList,
) -> AppResult<Json<ApiResponse<Value>>> {
    let toggled = state.tracking.toggle(user.id, id, list).await?;

    let mut body = Map::new();
    body.insert("message".into(), Value::from(toggled.message.clone()));
    body.insert(format!("in_{}", toggled.list), Value::from(toggled.in_list));
    Ok(Json(
        ApiResponse::success(Value::Object(body)).with_message(toggled.message),
    ))
}
