pub mod auth;
pub mod json;
pub mod response;

pub use auth::{jwt_auth_middleware, require_admin, AuthUser};
pub use json::ApiJson;
pub use response::{ApiResponse, ApiResult};
