// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Every route here runs behind `jwt_auth_middleware`, which puts an
// `AuthUser` into the request extensions. Admin-only methods add
// `require_admin` on top.

pub mod assets;
pub mod auth;
pub mod reports;
