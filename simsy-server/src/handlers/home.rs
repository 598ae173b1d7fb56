//! Home page feeds. Newest and random are public; the rest need a user.

use axum::{Extension, Json, extract::State};
use simsy_core::api::types::ApiResponse;
use simsy_model::{ShowCard, User, UserList};

use crate::infra::app_state::AppState;
use crate::infra::errors::AppResult;

type Feed = AppResult<Json<ApiResponse<Vec<ShowCard>>>>;

pub async fn newest(State(state): State<AppState>, viewer: Option<Extension<User>>) -> Feed {
    let viewer = viewer.map(|Extension(user)| user.id);
    Ok(Json(ApiResponse::success(state.catalog.newest(viewer).await?)))
}

pub async fn random(State(state): State<AppState>, viewer: Option<Extension<User>>) -> Feed {
    let viewer = viewer.map(|Extension(user)| user.id);
    Ok(Json(ApiResponse::success(state.catalog.random(viewer).await?)))
}

pub async fn favorites(State(state): State<AppState>, Extension(user): Extension<User>) -> Feed {
    Ok(Json(ApiResponse::success(
        state.catalog.user_list(user.id, UserList::Favorites).await?,
    )))
}

pub async fn watchlist(State(state): State<AppState>, Extension(user): Extension<User>) -> Feed {
    Ok(Json(ApiResponse::success(
        state.catalog.user_list(user.id, UserList::Watchlist).await?,
    )))
}

pub async fn history(State(state): State<AppState>, Extension(user): Extension<User>) -> Feed {
    Ok(Json(ApiResponse::success(state.catalog.history(user.id).await?)))
}
