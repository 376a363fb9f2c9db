use axum::{extract::State, Extension};

use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::auth_service::SessionUser;

/// GET /api/auth/me - Profile of the account the token was issued to
///
/// Admins get `{ id, username, role }`; personnel accounts also carry rank,
/// names and contact number. The password hash is never included.
pub async fn me_get(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> ApiResult<SessionUser> {
    let session = state.auth().me(&user).await?;
    Ok(ApiResponse::success(session))
}
