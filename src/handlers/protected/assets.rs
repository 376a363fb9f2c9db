// handlers/protected/assets.rs - Device CRUD under /api/assets
//
// Read and create are open to every signed-in caller (scoped to their own
// devices for USER tokens). Update and delete sit behind `require_admin`.

use axum::{
    extract::{Path, Query, State},
    Extension,
};

use crate::app::AppState;
use crate::database::models::Asset;
use crate::handlers::parse_id;
use crate::middleware::{ApiJson, ApiResponse, ApiResult, AuthUser};
use crate::reports::AssetFilter;
use crate::services::AssetInput;

/// GET /api/assets - Visible devices, optionally filtered
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(filter): Query<AssetFilter>,
) -> ApiResult<Vec<Asset>> {
    let assets = state.assets().list(&user, &filter).await?;
    Ok(ApiResponse::success(assets))
}

/// GET /api/assets/:id
pub async fn show(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Asset> {
    let id = parse_id("id", &id)?;
    let asset = state.assets().get(&user, id).await?;
    Ok(ApiResponse::success(asset))
}

/// POST /api/assets - 201 with the stored asset
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(input): ApiJson<AssetInput>,
) -> ApiResult<Asset> {
    let asset = state.assets().create(&user, input).await?;
    Ok(ApiResponse::created(asset))
}

/// PUT /api/assets/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<AssetInput>,
) -> ApiResult<Asset> {
    let id = parse_id("id", &id)?;
    let asset = state.assets().update(&user, id, input).await?;
    Ok(ApiResponse::success(asset))
}

/// DELETE /api/assets/:id - 204 whether or not the asset still existed
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let id = parse_id("id", &id)?;
    state.assets().delete(&user, id).await?;
    Ok(ApiResponse::no_content())
}
