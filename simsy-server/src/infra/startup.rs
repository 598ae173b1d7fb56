//! Router assembly shared by the binary and the HTTP tests.

use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method},
};
use simsy_config::CorsConfig;
use simsy_core::api::routes::v1;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::infra::app_state::AppState;
use crate::routes;

pub fn create_app(state: AppState) -> Router {
    let cors_layer = if state.config().dev_mode {
        CorsLayer::permissive()
    } else {
        cors_layer(&state.config().cors)
    };
    let media = ServeDir::new(state.images.root());

    Router::new()
        .merge(routes::create_api_router(state.clone()))
        .nest_service(v1::MEDIA, media)
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Methods and headers were validated while loading config; anything that
/// still fails to parse is skipped.
fn cors_layer(cors: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = cors
        .allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    let methods: Vec<Method> = cors
        .allowed_methods
        .iter()
        .filter_map(|method| Method::from_bytes(method.as_bytes()).ok())
        .collect();
    let headers: Vec<HeaderName> = cors
        .allowed_headers
        .iter()
        .filter_map(|name| HeaderName::from_bytes(name.as_bytes()).ok())
        .collect();

    let layer = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::list(methods))
        .allow_headers(AllowHeaders::list(headers));
    if cors.allow_credentials {
        layer.allow_credentials(true)
    } else {
        layer
    }
}
