// handlers/public/ips.rs - IP pool listing and dashboard counters

use std::collections::HashMap;

use axum::extract::{Query, State};
use serde::Deserialize;

use crate::app::AppState;
use crate::database::models::{IpAddress, IpStats, IpStatus, IpWithDevice};
use crate::database::repository::{asset, ip_address};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct IpQuery {
    pub status: Option<String>,
}

/// `all` and an absent status both mean no filter
fn status_filter(status: Option<&str>) -> Result<Option<IpStatus>, ApiError> {
    match status.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) if s.eq_ignore_ascii_case("all") => Ok(None),
        Some(s) => s
            .parse::<IpStatus>()
            .map(Some)
            .map_err(|_| ApiError::bad_request("Invalid status. Use all, Assigned or Available.")),
    }
}

/// GET /api/ips?status=all|Assigned|Available - Addresses with the device bound to each
pub async fn ips_get(State(state): State<AppState>, Query(query): Query<IpQuery>) -> ApiResult<Vec<IpWithDevice>> {
    let status = status_filter(query.status.as_deref())?;
    let ips = ip_address::list(&state.pool, status).await?;

    let mut devices: HashMap<_, _> = asset::list(&state.pool, None)
        .await?
        .into_iter()
        .map(|device| (device.ip_address_id, device))
        .collect();

    let rows = ips
        .into_iter()
        .map(|ip| IpWithDevice {
            device: devices.remove(&ip.id),
            ip,
        })
        .collect();

    Ok(ApiResponse::success(rows))
}

/// GET /api/ips/available
pub async fn available_get(State(state): State<AppState>) -> ApiResult<Vec<IpAddress>> {
    let ips = ip_address::list(&state.pool, Some(IpStatus::Available)).await?;
    Ok(ApiResponse::success(ips))
}

/// GET /api/ips/stats - `{ total, assigned, available }`
pub async fn stats_get(State(state): State<AppState>) -> ApiResult<IpStats> {
    let stats = ip_address::stats(&state.pool).await?;
    Ok(ApiResponse::success(stats))
}
