use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde_json::{Value, json};
use simsy_core::api::types::{
    ApiResponse, LoginRequest, PasswordResetConfirm, PasswordResetRequest,
};
use simsy_core::application::{RegisterRequest, Session};
use simsy_model::User;

use crate::infra::app_state::AppState;
use crate::infra::errors::AppResult;
use crate::middleware::auth::BearerToken;

const RESET_REQUESTED: &str =
    "If an account uses that email, a password reset token has been issued";

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<ApiResponse<User>>)> {
    let Json(request) = payload?;
    let user = state.accounts.register(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(user).with_message("User registered successfully")),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<Session>>> {
    let Json(request) = payload?;
    let session = state
        .accounts
        .login(&request.username, &request.password)
        .await?;
    Ok(Json(ApiResponse::success(session)))
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(BearerToken(token)): Extension<BearerToken>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.accounts.logout(&token).await?;
    Ok(Json(ApiResponse::success(()).with_message("Logged out")))
}

pub async fn logout_all(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> AppResult<Json<ApiResponse<Value>>> {
    let revoked = state.accounts.logout_all(user.id).await?;
    Ok(Json(
        ApiResponse::success(json!({ "revoked": revoked }))
            .with_message("Logged out of all sessions"),
    ))
}

/// Always answers with the same message so callers cannot learn which
/// emails are registered.
pub async fn request_password_reset(
    State(state): State<AppState>,
    payload: Result<Json<PasswordResetRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<()>>> {
    let Json(request) = payload?;
    state.accounts.request_password_reset(&request.email).await?;
    Ok(Json(ApiResponse::success(()).with_message(RESET_REQUESTED)))
}

pub async fn confirm_password_reset(
    State(state): State<AppState>,
    payload: Result<Json<PasswordResetConfirm>, JsonRejection>,
) -> AppResult<Json<ApiResponse<()>>> {
    let Json(request) = payload?;
    state
        .accounts
        .confirm_password_reset(&request.token, &request.new_password)
        .await?;
    Ok(Json(ApiResponse::success(()).with_message("Password has been reset")))
}
