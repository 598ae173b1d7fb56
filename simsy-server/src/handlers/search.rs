use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use simsy_core::api::types::{ApiResponse, SearchQuery, SearchResponse};
use simsy_core::application::SearchHit;
use tracing::debug;

use crate::infra::app_state::AppState;
use crate::infra::errors::AppResult;

pub async fn search(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> AppResult<Json<ApiResponse<SearchResponse<SearchHit>>>> {
    let Query(SearchQuery { q }) = query?;
    let results = state.catalog.search(&q).await?;
    debug!(query = %q, hits = results.len(), "search");

    Ok(Json(ApiResponse::success(SearchResponse {
        message: "Search Complete".to_string(),
        query: q,
        results,
    })))
}
