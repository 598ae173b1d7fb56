use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use simsy_model::User;

use crate::infra::app_state::AppState;
use crate::infra::errors::AppError;

/// The raw bearer token of an authenticated request. Logout revokes it.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(&request)
        .ok_or_else(|| AppError::unauthorized("Authentication required"))?;
    let user = state.accounts.authenticate(&token).await?;

    request.extensions_mut().insert(user);
    request.extensions_mut().insert(BearerToken(token));
    Ok(next.run(request).await)
}

/// Attach the user when a valid token is present; anonymous requests pass
/// through untouched.
pub async fn optional_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = extract_bearer_token(&request)
        && let Ok(user) = state.accounts.authenticate(&token).await
    {
        request.extensions_mut().insert(user);
        request.extensions_mut().insert(BearerToken(token));
    }

    next.run(request).await
}

/// Must run after [`auth_middleware`].
pub async fn staff_middleware(request: Request, next: Next) -> Response {
    match request.extensions().get::<User>() {
        None => AppError::unauthorized("Authentication required").into_response(),
        Some(user) if !user.is_staff => {
            AppError::forbidden("Staff access required").into_response()
        }
        Some(_) => next.run(request).await,
    }
}

fn extract_bearer_token(request: &Request) -> Option<String> {
    let value = request
        .headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_string())
}
