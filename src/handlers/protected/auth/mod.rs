// handlers/protected/auth/mod.rs - Session endpoints for signed-in callers

pub mod me; // GET /api/auth/me

pub use me::me_get;
