use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::{generate_jwt, hash_password, verify_password, Claims, Role};
use crate::database::models::{Admin, Asset, UserProfile};
use crate::database::repository::asset::DeviceFields;
use crate::database::repository::{account, asset, ip_ledger};
use crate::error::ApiError;
use crate::middleware::AuthUser;

use super::asset_service::{ledger_error, resolve_placement};
use super::input::{text, AssetInput, FieldCheck};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// The signed-in account as the client sees it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_number: Option<String>,
}

impl From<Admin> for SessionUser {
    fn from(admin: Admin) -> Self {
        Self {
            id: admin.id,
            username: admin.username,
            role: Role::Admin,
            rank: None,
            first_name: None,
            last_name: None,
            contact_number: None,
        }
    }
}

impl From<UserProfile> for SessionUser {
    fn from(profile: UserProfile) -> Self {
        Self {
            id: profile.id,
            username: profile.username,
            role: Role::User,
            rank: profile.rank,
            first_name: Some(profile.first_name),
            last_name: Some(profile.last_name),
            contact_number: profile.contact_number,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: SessionUser,
}

#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub user: UserProfile,
    pub device: Asset,
}

fn invalid_credentials() -> ApiError {
    ApiError::unauthorized("Invalid credentials.")
}

pub struct AuthService {
    pool: PgPool,
}

impl AuthService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Admin accounts win over personnel accounts with the same username
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, ApiError> {
        let mut check = FieldCheck::new();
        let username = check.required("username", &request.username);
        let password = check.password("password", &request.password);
        check.finish()?;

        let (hash, user) = if let Some(admin) = account::find_admin_by_username(&self.pool, &username).await? {
            (admin.password.clone(), SessionUser::from(admin))
        } else if let Some(user) = account::find_user_by_username(&self.pool, &username).await? {
            (user.password.clone(), SessionUser::from(UserProfile::from(user)))
        } else {
            warn!("Login attempt for unknown username '{}'", username);
            return Err(invalid_credentials());
        };

        if !verify_password(password, hash).await {
            warn!("Failed login for '{}'", username);
            return Err(invalid_credentials());
        }

        let token = generate_jwt(&Claims::new(user.id, user.username.clone(), user.role))?;
        info!("{} '{}' logged in", user.role, user.username);
        Ok(LoginResponse { token, user })
    }

    /// Self-service sign-up: a personnel account and its first device, together
    pub async fn register(&self, input: AssetInput) -> Result<Registration, ApiError> {
        let mut check = FieldCheck::new();
        let password = check.password("password", &input.password);
        let ip_id = check.required_uuid("ipAddressId", &input.ip_address_id);
        let department_id = check.required_uuid("departmentId", &input.department_id);
        let division_id = check.required_uuid("divisionId", &input.division_id);
        let device_type = check.required("deviceType", &input.device_type);
        let brand = check.required("brand", &input.brand);
        let service_tag = check.required("serviceTag", &input.service_tag);
        let date_received = check.required_date("dateReceived", &input.date_received);
        let status = check.status("status", &input.status).unwrap_or_default();
        let mut new_user = input.new_user(&mut check, String::new());
        check.finish()?;

        new_user.password = hash_password(password).await?;

        let mut tx = self.pool.begin().await?;
        let user = account::create_user(&mut *tx, &new_user).await?;

        let placement = resolve_placement(&mut tx, ip_id, Some(department_id), Some(division_id)).await?;
        ip_ledger::assign(&mut tx, ip_id)
            .await
            .map_err(|e| ledger_error(e, &placement.ip.ip_address))?;

        let fields = DeviceFields {
            ip_address_id: ip_id,
            department_id: placement.department_id,
            division_id: placement.division_id,
            user_id: Some(user.id),
            device_type,
            brand,
            model: text(&input.model),
            service_tag,
            mac_address: text(&input.mac_address),
            date_received,
            status,
            notes: text(&input.notes),
            sn_monitor: text(&input.sn_monitor),
            sn_ups: text(&input.sn_ups),
            color_sticker: text(&input.color_sticker),
        };
        let device_id = asset::insert(&mut tx, &fields).await?;
        tx.commit().await?;

        info!("Registered '{}' with {}", user.username, placement.ip.ip_address);
        let device = asset::find(&self.pool, device_id)
            .await?
            .ok_or_else(|| ApiError::internal_server_error("Saved asset could not be read back"))?;

        Ok(Registration {
            user: UserProfile::from(user),
            device,
        })
    }

    /// Profile of the token's account
    pub async fn me(&self, caller: &AuthUser) -> Result<SessionUser, ApiError> {
        let account = match caller.role {
            Role::Admin => account::find_admin(&self.pool, caller.id).await?.map(SessionUser::from),
            Role::User => account::find_user(&self.pool, caller.id)
                .await?
                .map(|user| SessionUser::from(UserProfile::from(user))),
        };
        account.ok_or_else(|| ApiError::unauthorized("Account no longer exists"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn lazy_service() -> AuthService {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://nobody@127.0.0.1:1/none")
            .unwrap();
        AuthService::new(pool)
    }

    #[test]
    fn admin_session_has_no_profile_fields() {
        let admin = Admin { id: Uuid::new_v4(), username: "root".into(), password: "hash".into() };
        let value = serde_json::to_value(SessionUser::from(admin)).unwrap();
        assert_eq!(value["role"], "ADMIN");
        assert!(value.get("firstName").is_none());
        assert!(value.get("password").is_none());
    }

    #[test]
    fn user_session_carries_profile() {
        let profile = UserProfile {
            id: Uuid::new_v4(),
            username: "malee".into(),
            rank: Some("จ.ส.อ.".into()),
            first_name: "Malee".into(),
            last_name: "Boonmee".into(),
            contact_number: None,
        };
        let value = serde_json::to_value(SessionUser::from(profile)).unwrap();
        assert_eq!(value["role"], "USER");
        assert_eq!(value["firstName"], "Malee");
        assert_eq!(value["rank"], "จ.ส.อ.");
    }

    #[tokio::test]
    async fn login_requires_both_fields() {
        let err = lazy_service()
            .login(LoginRequest { username: Some("root".into()), password: None })
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_json()["field_errors"]["password"], "is required");
    }

    #[tokio::test]
    async fn register_lists_every_missing_field() {
        let err = lazy_service().register(AssetInput::default()).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        let body = err.to_json();
        for field in [
            "username",
            "password",
            "ipAddressId",
            "departmentId",
            "divisionId",
            "deviceType",
            "brand",
            "serviceTag",
            "dateReceived",
            "firstName",
            "lastName",
        ] {
            assert_eq!(body["field_errors"][field], "is required", "{}", field);
        }
        assert!(body["field_errors"].get("model").is_none());
    }
}
