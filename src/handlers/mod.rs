// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) → Protected (JWT auth, some methods admin-only)

pub mod protected;
pub mod public;

use uuid::Uuid;

use crate::error::ApiError;

/// Path or query id; a malformed value is a 400 in the usual error envelope
pub(crate) fn parse_id(field: &str, raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::invalid_field(field, "must be a valid id"))
}

/// Like [`parse_id`], but absent or blank means no id
pub(crate) fn optional_id(field: &str, raw: Option<&str>) -> Result<Option<Uuid>, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(raw) => parse_id(field, raw).map(Some),
    }
}
