//! Request bodies for device writes and the field checks they share.
//!
//! Everything arrives as optional strings so a bad id or date becomes a field
//! error in the response instead of a body rejection.

use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::DeviceStatus;
use crate::database::repository::account::{NewUser, ProfileChanges};
use crate::error::{ApiError, FieldErrors};

/// Body of `POST /api/assets`, `PUT /api/assets/:id` and `POST /api/auth/register`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetInput {
    pub ip_address_id: Option<String>,
    pub department_id: Option<String>,
    pub division_id: Option<String>,
    pub user_id: Option<String>,
    pub device_type: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub service_tag: Option<String>,
    pub mac_address: Option<String>,
    pub date_received: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
    pub sn_monitor: Option<String>,
    pub sn_ups: Option<String>,
    pub color_sticker: Option<String>,

    // owner
    pub username: Option<String>,
    pub password: Option<String>,
    pub rank: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub contact_number: Option<String>,
}

/// Trimmed value, `None` when absent or blank
pub fn text(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Optional column update: absent keeps `current`, blank clears it
pub fn patch_text(value: &Option<String>, current: Option<String>) -> Option<String> {
    match value {
        None => current,
        Some(_) => text(value),
    }
}

/// `YYYY-MM-DD`, or the date part of an RFC 3339 timestamp
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
}

impl AssetInput {
    /// Whether the body tries to create an account
    pub fn has_credentials(&self) -> bool {
        text(&self.username).is_some() || self.password_given().is_some()
    }

    /// The password exactly as sent, when it is not blank
    pub fn password_given(&self) -> Option<String> {
        self.password.clone().filter(|p| !p.trim().is_empty())
    }

    pub fn profile_changes(&self) -> ProfileChanges {
        ProfileChanges {
            username: text(&self.username),
            rank: text(&self.rank),
            first_name: text(&self.first_name),
            last_name: text(&self.last_name),
            contact_number: text(&self.contact_number),
        }
    }

    /// Account fields for a new owner; `check` collects the missing names
    pub fn new_user(&self, check: &mut FieldCheck, password_hash: String) -> NewUser {
        NewUser {
            username: check.required("username", &self.username),
            password: password_hash,
            rank: text(&self.rank),
            first_name: check.required("firstName", &self.first_name),
            last_name: check.required("lastName", &self.last_name),
            contact_number: text(&self.contact_number),
        }
    }
}

/// Collects per-field problems; `finish` turns them into one 400.
///
/// Accessors return a placeholder when a field is bad. Callers must not use
/// the values unless `finish` succeeds.
#[derive(Debug, Default)]
pub struct FieldCheck {
    errors: FieldErrors,
}

impl FieldCheck {
    pub fn new() -> Self {
        Self::default()
    }

    fn fail(&mut self, field: &str, problem: impl Into<String>) {
        self.errors.entry(field.to_string()).or_insert_with(|| problem.into());
    }

    pub fn required(&mut self, field: &str, value: &Option<String>) -> String {
        match text(value) {
            Some(v) => v,
            None => {
                self.fail(field, "is required");
                String::new()
            }
        }
    }

    /// Like `required`, but the value is returned untrimmed so hashing and
    /// verification see exactly what was typed
    pub fn password(&mut self, field: &str, value: &Option<String>) -> String {
        match value {
            Some(v) if !v.trim().is_empty() => v.clone(),
            _ => {
                self.fail(field, "is required");
                String::new()
            }
        }
    }

    /// Optional id; blank counts as absent
    pub fn uuid(&mut self, field: &str, value: &Option<String>) -> Option<Uuid> {
        let raw = text(value)?;
        match Uuid::parse_str(&raw) {
            Ok(id) => Some(id),
            Err(_) => {
                self.fail(field, "must be a valid id");
                None
            }
        }
    }

    pub fn required_uuid(&mut self, field: &str, value: &Option<String>) -> Uuid {
        if text(value).is_none() {
            self.fail(field, "is required");
            return Uuid::nil();
        }
        self.uuid(field, value).unwrap_or_else(Uuid::nil)
    }

    /// Optional id update: absent keeps `current`, blank clears it
    pub fn patch_uuid(&mut self, field: &str, value: &Option<String>, current: Option<Uuid>) -> Option<Uuid> {
        match value {
            None => current,
            Some(_) => self.uuid(field, value),
        }
    }

    /// Required text on update: absent keeps `current`, blank is an error
    pub fn patch_required(&mut self, field: &str, value: &Option<String>, current: String) -> String {
        match value {
            None => current,
            Some(_) => match text(value) {
                Some(v) => v,
                None => {
                    self.fail(field, "cannot be empty");
                    current
                }
            },
        }
    }

    pub fn date(&mut self, field: &str, value: &Option<String>) -> Option<NaiveDate> {
        let raw = text(value)?;
        match parse_date(&raw) {
            Some(date) => Some(date),
            None => {
                self.fail(field, "must be a date (YYYY-MM-DD)");
                None
            }
        }
    }

    pub fn required_date(&mut self, field: &str, value: &Option<String>) -> NaiveDate {
        if text(value).is_none() {
            self.fail(field, "is required");
            return NaiveDate::default();
        }
        self.date(field, value).unwrap_or_default()
    }

    pub fn status(&mut self, field: &str, value: &Option<String>) -> Option<DeviceStatus> {
        let raw = text(value)?;
        match raw.parse::<DeviceStatus>() {
            Ok(status) => Some(status),
            Err(_) => {
                self.fail(field, "must be one of Active, In Repair, Retired");
                None
            }
        }
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn finish(self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            return Ok(());
        }
        let message = if self.errors.values().all(|p| p == "is required") {
            "All required fields must be filled."
        } else {
            "Invalid field format"
        };
        Err(ApiError::validation_error(message, Some(self.errors)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn some(v: &str) -> Option<String> {
        Some(v.to_string())
    }

    #[test]
    fn text_trims_and_drops_blank() {
        assert_eq!(text(&some("  Dell ")), Some("Dell".to_string()));
        assert_eq!(text(&some("   ")), None);
        assert_eq!(text(&None), None);
    }

    #[test]
    fn patch_text_keeps_clears_or_replaces() {
        let current = Some("old".to_string());
        assert_eq!(patch_text(&None, current.clone()), current);
        assert_eq!(patch_text(&some(""), current.clone()), None);
        assert_eq!(patch_text(&some("new"), current), Some("new".to_string()));
    }

    #[test]
    fn dates_accept_plain_and_timestamp() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(parse_date("2024-03-15"), Some(expected));
        assert_eq!(parse_date("2024-03-15T00:00:00.000Z"), Some(expected));
        assert_eq!(parse_date("15/03/2024"), None);
    }

    #[test]
    fn missing_fields_are_collected() {
        let input = AssetInput { brand: some("HP"), ..Default::default() };
        let mut check = FieldCheck::new();
        check.required_uuid("ipAddressId", &input.ip_address_id);
        check.required("brand", &input.brand);
        check.required("serviceTag", &input.service_tag);

        let err = check.finish().unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "All required fields must be filled.");
        let body = err.to_json();
        assert_eq!(body["field_errors"]["ipAddressId"], "is required");
        assert_eq!(body["field_errors"]["serviceTag"], "is required");
        assert!(body["field_errors"].get("brand").is_none());
    }

    #[test]
    fn malformed_values_are_reported() {
        let mut check = FieldCheck::new();
        assert_eq!(check.uuid("departmentId", &some("not-a-uuid")), None);
        assert_eq!(check.status("status", &some("Broken")), None);
        assert_eq!(check.date("dateReceived", &some("yesterday")), None);
        assert!(!check.is_ok());

        let err = check.finish().unwrap_err();
        assert_eq!(err.message(), "Invalid field format");
        assert_eq!(err.to_json()["field_errors"]["status"], "must be one of Active, In Repair, Retired");
    }

    #[test]
    fn passwords_keep_surrounding_spaces() {
        let mut check = FieldCheck::new();
        assert_eq!(check.password("password", &some(" s3cret ")), " s3cret ");
        assert!(check.is_ok());
        check.password("password", &some("   "));
        let err = check.finish().unwrap_err();
        assert_eq!(err.to_json()["field_errors"]["password"], "is required");
    }

    #[test]
    fn patch_helpers_follow_absent_blank_given() {
        let mut check = FieldCheck::new();
        let current = Some(Uuid::new_v4());
        assert_eq!(check.patch_uuid("divisionId", &None, current), current);
        assert_eq!(check.patch_uuid("divisionId", &some(""), current), None);
        assert_eq!(check.patch_required("brand", &None, "Dell".into()), "Dell");
        assert!(check.is_ok());
        check.patch_required("brand", &some(" "), "Dell".into());
        assert!(!check.is_ok());
    }

    #[test]
    fn credentials_and_profile_changes() {
        let input = AssetInput {
            username: some("somsak"),
            first_name: some("Somsak"),
            contact_number: some(""),
            ..Default::default()
        };
        assert!(input.has_credentials());
        assert!(input.password_given().is_none());
        let with_password = AssetInput { password: some(" pw "), ..Default::default() };
        assert_eq!(with_password.password_given().as_deref(), Some(" pw "));
        let changes = input.profile_changes();
        assert_eq!(changes.username.as_deref(), Some("somsak"));
        assert!(changes.contact_number.is_none());

        let mut check = FieldCheck::new();
        let user = input.new_user(&mut check, "hash".into());
        assert_eq!(user.first_name, "Somsak");
        assert!(!check.is_ok());
    }
}
