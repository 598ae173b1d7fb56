use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
};
use simsy_core::api::types::{ApiResponse, ChangePasswordRequest};
use simsy_model::{PreferencesUpdate, ProfileUpdate, User, UserPreferences};

use crate::infra::app_state::AppState;
use crate::infra::errors::AppResult;

pub async fn current_user(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> AppResult<Json<ApiResponse<User>>> {
    let profile = state.accounts.profile(user.id).await?;
    Ok(Json(ApiResponse::success(profile)))
}

pub async fn update_current_user(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    payload: Result<Json<ProfileUpdate>, JsonRejection>,
) -> AppResult<Json<ApiResponse<User>>> {
    let Json(update) = payload?;
    let profile = state.accounts.update_profile(user.id, update).await?;
    Ok(Json(ApiResponse::success(profile).with_message("Profile updated")))
}

pub async fn preferences(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> AppResult<Json<ApiResponse<UserPreferences>>> {
    let prefs = state.accounts.preferences(user.id).await?;
    Ok(Json(ApiResponse::success(prefs)))
}

pub async fn update_preferences(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    payload: Result<Json<PreferencesUpdate>, JsonRejection>,
) -> AppResult<Json<ApiResponse<UserPreferences>>> {
    let Json(update) = payload?;
    let prefs = state.accounts.update_preferences(user.id, update).await?;
    Ok(Json(ApiResponse::success(prefs).with_message("Preferences updated")))
}

/// Every session, including the caller's, is revoked on success.
pub async fn change_password(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    payload: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<()>>> {
    let Json(request) = payload?;
    state
        .accounts
        .change_password(user.id, &request.current_password, &request.new_password)
        .await?;
    Ok(Json(
        ApiResponse::success(()).with_message("Password changed; please log in again"),
    ))
}
