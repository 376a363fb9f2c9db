// handlers/public/service_tags.rs - Leased device lookup for data entry

use axum::extract::{Query, State};
use serde::Deserialize;

use crate::app::AppState;
use crate::catalog::LeasedDevice;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceTagQuery {
    pub device_type: Option<String>,
    pub q: Option<String>,
}

/// GET /api/service-tags?deviceType=&q= - Catalog rows for a leased device type
pub async fn service_tags_get(
    State(state): State<AppState>,
    Query(query): Query<ServiceTagQuery>,
) -> ApiResult<Vec<LeasedDevice>> {
    let rows = state
        .catalog
        .search(query.device_type.as_deref(), query.q.as_deref())
        .into_iter()
        .cloned()
        .collect();
    Ok(ApiResponse::success(rows))
}
