// handlers/public/auth/login.rs - POST /api/auth/login

use axum::extract::State;

use crate::app::AppState;
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::services::auth_service::{LoginRequest, LoginResponse};

/**
 * POST /api/auth/login - Exchange a username and password for a JWT
 *
 * Input: `{ "username": "string", "password": "string" }`
 *
 * Output: `{ "token": "...", "user": { "id", "username", "role", ... } }`.
 * Admin accounts are checked first, then personnel accounts.
 *
 * Errors: 400 when a field is missing, 401 `Invalid credentials.` otherwise.
 */
pub async fn login_post(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let response = state.auth().login(request).await?;
    Ok(ApiResponse::success(response))
}
