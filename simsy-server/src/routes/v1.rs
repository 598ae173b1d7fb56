use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
};
use simsy_core::api::routes::v1;

use crate::handlers::{auth, catalog, health, home, images, search, shows, users};
use crate::infra::app_state::AppState;
use crate::media::MAX_IMAGE_BYTES;
use crate::middleware::auth::{auth_middleware, optional_auth_middleware, staff_middleware};

/// Create all v1 API routes
pub fn create_v1_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route(v1::HEALTH, get(health::health_handler))
        .route(v1::SEARCH, get(search::search))
        .route(v1::auth::REGISTER, post(auth::register))
        .route(v1::auth::LOGIN, post(auth::login))
        .route(v1::auth::PASSWORD_RESET, post(auth::request_password_reset))
        .route(
            v1::auth::PASSWORD_RESET_CONFIRM,
            post(auth::confirm_password_reset),
        )
        .route(v1::artists::COLLECTION, get(catalog::list_artists))
        .route(v1::countries::COLLECTION, get(catalog::list_countries))
        .route(v1::taxonomy::COLLECTION, get(catalog::list_taxonomy))
        .merge(create_browse_routes(state.clone()))
        .merge(create_protected_routes(state.clone()))
        .merge(create_staff_routes(state))
}

/// Public reads that mark list membership when the caller is signed in.
fn create_browse_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(v1::shows::COLLECTION, get(shows::list_shows))
        .route(v1::shows::ITEM, get(shows::show_detail))
        .route(v1::artists::ITEM, get(catalog::artist_detail))
        .route(v1::countries::ITEM, get(catalog::country_detail))
        .route(v1::taxonomy::ITEM, get(catalog::taxonomy_detail))
        .route(v1::home::NEWEST, get(home::newest))
        .route(v1::home::RANDOM, get(home::random))
        .route_layer(middleware::from_fn_with_state(
            state,
            optional_auth_middleware,
        ))
}

fn create_protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(v1::auth::LOGOUT, post(auth::logout))
        .route(v1::auth::LOGOUT_ALL, post(auth::logout_all))
        .route(
            v1::users::CURRENT,
            get(users::current_user).patch(users::update_current_user),
        )
        .route(
            v1::users::CURRENT_PREFERENCES,
            get(users::preferences).patch(users::update_preferences),
        )
        .route(v1::users::CHANGE_PASSWORD, post(users::change_password))
        .route(v1::home::FAVORITES, get(home::favorites))
        .route(v1::home::WATCHLIST, get(home::watchlist))
        .route(v1::home::HISTORY, get(home::history))
        .route(v1::shows::USER_STATE, get(shows::user_state))
        .route(v1::shows::PROGRESS, post(shows::update_progress))
        .route(v1::shows::EPISODES, post(shows::change_episode))
        .route(v1::shows::FAVORITE, post(shows::toggle_favorite))
        .route(v1::shows::WATCHLIST, post(shows::toggle_watchlist))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Catalog writes and image uploads.
fn create_staff_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(v1::shows::COLLECTION, post(shows::create_show))
        .route(
            v1::shows::ITEM,
            put(shows::update_show).delete(shows::delete_show),
        )
        .route(v1::artists::COLLECTION, post(catalog::create_artist))
        .route(
            v1::artists::ITEM,
            put(catalog::update_artist).delete(catalog::delete_artist),
        )
        .route(v1::countries::COLLECTION, post(catalog::create_country))
        .route(
            v1::countries::ITEM,
            put(catalog::update_country).delete(catalog::delete_country),
        )
        .route(v1::taxonomy::COLLECTION, post(catalog::create_taxonomy))
        .route(
            v1::taxonomy::ITEM,
            put(catalog::update_taxonomy).delete(catalog::delete_taxonomy),
        )
        .route(
            v1::images::UPLOAD,
            put(images::upload_image).layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES)),
        )
        .route_layer(middleware::from_fn(staff_middleware))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
