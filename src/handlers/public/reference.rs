// handlers/public/reference.rs - Departments and divisions for pick lists

use axum::extract::{Path, Query, State};
use serde::Deserialize;

use crate::app::AppState;
use crate::database::models::{DepartmentWithDivisions, Division, IpAddress, IpStatus};
use crate::database::repository::{department, ip_address};
use crate::error::ApiError;
use crate::handlers::{optional_id, parse_id};
use crate::middleware::{ApiResponse, ApiResult};

/// GET /api/departments - Every department with its divisions, ordered by name
pub async fn departments_get(State(state): State<AppState>) -> ApiResult<Vec<DepartmentWithDivisions>> {
    let departments = department::list_departments(&state.pool).await?;
    let divisions = department::list_divisions(&state.pool, None).await?;
    Ok(ApiResponse::success(department::group_divisions(departments, divisions)))
}

/// GET /api/departments/:id/available-ips - Free addresses inside the department's ranges
pub async fn department_available_ips_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Vec<IpAddress>> {
    let id = parse_id("id", &id)?;
    let department = department::find_department(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Department not found."))?;

    let available = ip_address::list(&state.pool, Some(IpStatus::Available)).await?;
    let allowed: Vec<IpAddress> = available
        .into_iter()
        .filter(|ip| department.allows(&ip.ip_address))
        .collect();

    Ok(ApiResponse::success(allowed))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DivisionQuery {
    pub department_id: Option<String>,
}

/// GET /api/divisions[?departmentId=] - Divisions, optionally of one department
pub async fn divisions_get(
    State(state): State<AppState>,
    Query(query): Query<DivisionQuery>,
) -> ApiResult<Vec<Division>> {
    let department_id = optional_id("departmentId", query.department_id.as_deref())?;
    let divisions = department::list_divisions(&state.pool, department_id).await?;
    Ok(ApiResponse::success(divisions))
}
