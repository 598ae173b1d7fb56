//! Artists, countries and the four taxonomy collections.

use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use simsy_core::api::types::ApiResponse;
use simsy_core::application::{ArtistDetail, ArtistView, CountryDetail, TaxonomyDetail};
use simsy_model::{
    Artist, ArtistDraft, ArtistID, Country, CountryDraft, CountryID, Taxonomy,
    TaxonomyDraft, TaxonomyID, TaxonomyKind, User,
};

use crate::infra::app_state::AppState;
use crate::infra::errors::{AppError, AppResult};

fn viewer_id(viewer: Option<Extension<User>>) -> Option<uuid::Uuid> {
    viewer.map(|Extension(user)| user.id)
}

/// Unknown collections are treated as missing routes.
fn taxonomy_kind(collection: &str) -> AppResult<TaxonomyKind> {
    TaxonomyKind::ALL
        .into_iter()
        .find(|kind| kind.collection() == collection)
        .ok_or_else(|| AppError::not_found(format!("Unknown catalog collection '{collection}'")))
}

pub async fn list_artists(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<ArtistView>>>> {
    Ok(Json(ApiResponse::success(state.catalog.list_artists().await?)))
}

pub async fn artist_detail(
    State(state): State<AppState>,
    Path(id): Path<ArtistID>,
    viewer: Option<Extension<User>>,
) -> AppResult<Json<ApiResponse<ArtistDetail>>> {
    Ok(Json(ApiResponse::success(
        state.catalog.artist_detail(id, viewer_id(viewer)).await?,
    )))
}

pub async fn create_artist(
    State(state): State<AppState>,
    payload: Result<Json<ArtistDraft>, JsonRejection>,
) -> AppResult<(StatusCode, Json<ApiResponse<Artist>>)> {
    let Json(draft) = payload?;
    let artist = state.catalog.create_artist(draft).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(artist))))
}

pub async fn update_artist(
    State(state): State<AppState>,
    Path(id): Path<ArtistID>,
    payload: Result<Json<ArtistDraft>, JsonRejection>,
) -> AppResult<Json<ApiResponse<Artist>>> {
    let Json(draft) = payload?;
    Ok(Json(ApiResponse::success(
        state.catalog.update_artist(id, draft).await?,
    )))
}

pub async fn delete_artist(
    State(state): State<AppState>,
    Path(id): Path<ArtistID>,
) -> AppResult<StatusCode> {
    state.catalog.delete_artist(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_countries(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<Country>>>> {
    Ok(Json(ApiResponse::success(state.catalog.list_countries().await?)))
}

pub async fn country_detail(
    State(state): State<AppState>,
    Path(id): Path<CountryID>,
    viewer: Option<Extension<User>>,
) -> AppResult<Json<ApiResponse<CountryDetail>>> {
    Ok(Json(ApiResponse::success(
        state.catalog.country_detail(id, viewer_id(viewer)).await?,
    )))
}

pub async fn create_country(
    State(state): State<AppState>,
    payload: Result<Json<CountryDraft>, JsonRejection>,
) -> AppResult<(StatusCode, Json<ApiResponse<Country>>)> {
    let Json(draft) = payload?;
    let country = state.catalog.create_country(draft).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(country))))
}

pub async fn update_country(
    State(state): State<AppState>,
    Path(id): Path<CountryID>,
    payload: Result<Json<CountryDraft>, JsonRejection>,
) -> AppResult<Json<ApiResponse<Country>>> {
    let Json(draft) = payload?;
    Ok(Json(ApiResponse::success(
        state.catalog.update_country(id, draft).await?,
    )))
}

pub async fn delete_country(
    State(state): State<AppState>,
    Path(id): Path<CountryID>,
) -> AppResult<StatusCode> {
    state.catalog.delete_country(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_taxonomy(
    State(state): State<AppState>,
    Path(collection): Path<String>,
) -> AppResult<Json<ApiResponse<Vec<Taxonomy>>>> {
    let kind = taxonomy_kind(&collection)?;
    Ok(Json(ApiResponse::success(state.catalog.list_taxonomy(kind).await?)))
}

pub async fn taxonomy_detail(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, TaxonomyID)>,
    viewer: Option<Extension<User>>,
) -> AppResult<Json<ApiResponse<TaxonomyDetail>>> {
    let kind = taxonomy_kind(&collection)?;
    Ok(Json(ApiResponse::success(
        state
            .catalog
            .taxonomy_detail(kind, id, viewer_id(viewer))
            .await?,
    )))
}

pub async fn create_taxonomy(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    payload: Result<Json<TaxonomyDraft>, JsonRejection>,
) -> AppResult<(StatusCode, Json<ApiResponse<Taxonomy>>)> {
    let kind = taxonomy_kind(&collection)?;
    let Json(draft) = payload?;
    let entry = state.catalog.create_taxonomy(kind, draft).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(entry))))
}

pub async fn update_taxonomy(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, TaxonomyID)>,
    payload: Result<Json<TaxonomyDraft>, JsonRejection>,
) -> AppResult<Json<ApiResponse<Taxonomy>>> {
    let kind = taxonomy_kind(&collection)?;
    let Json(draft) = payload?;
    Ok(Json(ApiResponse::success(
        state.catalog.update_taxonomy(kind, id, draft).await?,
    )))
}

pub async fn delete_taxonomy(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, TaxonomyID)>,
) -> AppResult<StatusCode> {
    let kind = taxonomy_kind(&collection)?;
    state.catalog.delete_taxonomy(kind, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collections_are_plural_only() {
        assert_eq!(taxonomy_kind("genres").unwrap(), TaxonomyKind::Genre);
        assert_eq!(
            taxonomy_kind("genre").unwrap_err().status,
            StatusCode::NOT_FOUND
        );
    }
}
