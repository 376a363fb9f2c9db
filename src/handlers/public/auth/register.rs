// handlers/public/auth/register.rs - POST /api/auth/register

use axum::extract::State;

use crate::app::AppState;
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::services::auth_service::Registration;
use crate::services::AssetInput;

/// POST /api/auth/register - Create a personnel account together with its first device.
///
/// The account, the device row and the IP assignment commit in one transaction.
pub async fn register_post(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<AssetInput>,
) -> ApiResult<Registration> {
    let registration = state.auth().register(input).await?;
    Ok(ApiResponse::created(registration))
}
