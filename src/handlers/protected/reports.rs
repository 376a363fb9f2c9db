use axum::{
    extract::{Query, State},
    Extension,
};

use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::reports::{AssetFilter, AssetStats};

/// GET /api/reports/stats - Device counts per department and division, by type
pub async fn stats_get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(filter): Query<AssetFilter>,
) -> ApiResult<AssetStats> {
    let stats = state.assets().stats(&user, &filter).await?;
    Ok(ApiResponse::success(stats))
}
