use axum::{Json, extract::State};
use simsy_core::api::types::HealthResponse;

use crate::infra::app_state::AppState;

pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage: state.storage_label().to_string(),
    })
}
