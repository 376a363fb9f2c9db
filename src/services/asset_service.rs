use sqlx::{PgConnection, PgPool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::{hash_password, Role};
use crate::database::models::{Asset, IpAddress};
use crate::database::repository::asset::DeviceFields;
use crate::database::repository::{account, asset, department, ip_address, ip_ledger};
use crate::database::DatabaseError;
use crate::error::{ApiError, FieldErrors};
use crate::middleware::AuthUser;
use crate::reports::{AssetFilter, AssetStats};

use super::input::{patch_text, text, AssetInput, FieldCheck};

/// Resolved location of a device: its address and organisational unit
#[derive(Debug, Clone)]
pub(crate) struct Placement {
    pub ip: IpAddress,
    pub department_id: Option<Uuid>,
    pub division_id: Option<Uuid>,
}

/// Check that the address, department and division exist and fit together.
///
/// A division without a department places the device in the division's
/// department. The department's special ranges must contain the address.
pub(crate) async fn resolve_placement(
    conn: &mut PgConnection,
    ip_id: Uuid,
    department_id: Option<Uuid>,
    division_id: Option<Uuid>,
) -> Result<Placement, ApiError> {
    let ip = ip_address::find(&mut *conn, ip_id)
        .await?
        .ok_or_else(|| ApiError::bad_request("Invalid selection for ipAddressId"))?;

    let division = match division_id {
        Some(id) => Some(
            department::find_division(&mut *conn, id)
                .await?
                .ok_or_else(|| ApiError::bad_request("Invalid selection for divisionId"))?,
        ),
        None => None,
    };

    let department_id = department_id.or(division.as_ref().map(|d| d.department_id));

    if let (Some(department_id), Some(division)) = (department_id, division.as_ref()) {
        if division.department_id != department_id {
            return Err(ApiError::bad_request(format!(
                "Division '{}' does not belong to the selected department",
                division.name
            )));
        }
    }

    if let Some(id) = department_id {
        let department = department::find_department(&mut *conn, id)
            .await?
            .ok_or_else(|| ApiError::bad_request("Invalid selection for departmentId"))?;

        if !department.allows(&ip.ip_address) {
            let mut field_errors = FieldErrors::new();
            field_errors.insert(
                "ipAddressId".to_string(),
                format!(
                    "{} is outside the IP ranges of {} ({})",
                    ip.ip_address,
                    department.name,
                    department.special_ip_ranges.as_deref().unwrap_or_default()
                ),
            );
            return Err(ApiError::unprocessable_entity(
                "IP address is not allowed for this department",
                field_errors,
            ));
        }
    }

    Ok(Placement {
        ip,
        department_id,
        division_id,
    })
}

/// Ledger failures phrased for the client
pub(crate) fn ledger_error(err: DatabaseError, address: &str) -> ApiError {
    match err {
        DatabaseError::NotFound(_) => ApiError::bad_request("Invalid selection for ipAddressId"),
        DatabaseError::Conflict(_) => ApiError::conflict(format!("IP address {} is already assigned", address)),
        other => ApiError::from(other),
    }
}

pub struct AssetService {
    pool: PgPool,
}

impl AssetService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Devices visible to the caller, narrowed by the report filters
    pub async fn list(&self, caller: &AuthUser, filter: &AssetFilter) -> Result<Vec<Asset>, ApiError> {
        let assets = asset::list(&self.pool, caller.owner_scope()).await?;
        filter.apply(assets)
    }

    pub async fn stats(&self, caller: &AuthUser, filter: &AssetFilter) -> Result<AssetStats, ApiError> {
        let assets = self.list(caller, filter).await?;
        Ok(AssetStats::from_assets(&assets))
    }

    pub async fn get(&self, caller: &AuthUser, id: Uuid) -> Result<Asset, ApiError> {
        let asset = asset::find(&self.pool, id)
            .await?
            .ok_or_else(|| ApiError::not_found("Asset not found."))?;

        if !caller.is_admin() && !asset.is_owned_by(caller.id) {
            return Err(ApiError::forbidden("Forbidden: You do not have access to this asset."));
        }
        Ok(asset)
    }

    pub async fn create(&self, caller: &AuthUser, input: AssetInput) -> Result<Asset, ApiError> {
        let mut check = FieldCheck::new();
        let ip_id = check.required_uuid("ipAddressId", &input.ip_address_id);
        let department_id = check.uuid("departmentId", &input.department_id);
        let division_id = check.uuid("divisionId", &input.division_id);
        let user_id = check.uuid("userId", &input.user_id);
        let device_type = check.required("deviceType", &input.device_type);
        let brand = check.required("brand", &input.brand);
        let service_tag = check.required("serviceTag", &input.service_tag);
        let date_received = check.required_date("dateReceived", &input.date_received);
        let status = check.status("status", &input.status).unwrap_or_default();
        check.finish()?;

        let mut tx = self.pool.begin().await?;

        let owner_id = match caller.role {
            Role::User => {
                if user_id.is_some_and(|id| id != caller.id) {
                    return Err(ApiError::forbidden(
                        "Forbidden: You can only add devices to your own account.",
                    ));
                }
                if input.has_credentials() {
                    return Err(ApiError::forbidden("Forbidden: You cannot create a new user."));
                }
                caller.id
            }
            Role::Admin => {
                if let Some(id) = user_id {
                    account::find_user(&mut *tx, id)
                        .await?
                        .ok_or_else(|| ApiError::bad_request("Invalid selection for userId"))?
                        .id
                } else if let (Some(_), Some(password)) = (text(&input.username), input.password_given()) {
                    let mut check = FieldCheck::new();
                    let password_hash = hash_password(password).await?;
                    let new_user = input.new_user(&mut check, password_hash);
                    check.finish()?;
                    let user = account::create_user(&mut *tx, &new_user).await?;
                    info!("Created user '{}' for a new asset", user.username);
                    user.id
                } else {
                    return Err(ApiError::bad_request(
                        "For admins, either a userId or a username and password are required.",
                    ));
                }
            }
        };

        let placement = resolve_placement(&mut tx, ip_id, department_id, division_id).await?;
        ip_ledger::assign(&mut tx, ip_id)
            .await
            .map_err(|e| ledger_error(e, &placement.ip.ip_address))?;

        let fields = DeviceFields {
            ip_address_id: ip_id,
            department_id: placement.department_id,
            division_id: placement.division_id,
            user_id: Some(owner_id),
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
        let id = asset::insert(&mut tx, &fields).await?;
        tx.commit().await?;

        info!("{} added {} at {}", caller.username, fields.device_type, placement.ip.ip_address);
        self.reload(id).await
    }

    /// Replace the given fields of a device; absent fields keep their value
    pub async fn update(&self, caller: &AuthUser, id: Uuid, input: AssetInput) -> Result<Asset, ApiError> {
        if !caller.is_admin() {
            return Err(ApiError::forbidden("Forbidden: Admin access required."));
        }

        let mut tx = self.pool.begin().await?;
        let existing = asset::find_for_update(&mut tx, id)
            .await?
            .ok_or_else(|| ApiError::not_found("Asset not found."))?;

        let mut fields = DeviceFields::from(&existing);
        let mut check = FieldCheck::new();
        if let Some(ip_id) = check.uuid("ipAddressId", &input.ip_address_id) {
            fields.ip_address_id = ip_id;
        }
        fields.department_id = check.patch_uuid("departmentId", &input.department_id, fields.department_id);
        fields.division_id = check.patch_uuid("divisionId", &input.division_id, fields.division_id);
        fields.user_id = check.patch_uuid("userId", &input.user_id, fields.user_id);
        fields.device_type = check.patch_required("deviceType", &input.device_type, fields.device_type);
        fields.brand = check.patch_required("brand", &input.brand, fields.brand);
        fields.service_tag = check.patch_required("serviceTag", &input.service_tag, fields.service_tag);
        if let Some(date) = check.date("dateReceived", &input.date_received) {
            fields.date_received = date;
        }
        if let Some(status) = check.status("status", &input.status) {
            fields.status = status;
        }
        fields.model = patch_text(&input.model, fields.model);
        fields.mac_address = patch_text(&input.mac_address, fields.mac_address);
        fields.notes = patch_text(&input.notes, fields.notes);
        fields.sn_monitor = patch_text(&input.sn_monitor, fields.sn_monitor);
        fields.sn_ups = patch_text(&input.sn_ups, fields.sn_ups);
        fields.color_sticker = patch_text(&input.color_sticker, fields.color_sticker);
        check.finish()?;

        let ip_changed = fields.ip_address_id != existing.ip_address_id;
        let moved = ip_changed
            || fields.department_id != existing.department_id
            || fields.division_id != existing.division_id;

        // Existing rows predating a range change stay editable until they move
        if moved {
            let placement =
                resolve_placement(&mut tx, fields.ip_address_id, fields.department_id, fields.division_id).await?;
            fields.department_id = placement.department_id;

            if ip_changed {
                ip_ledger::reassign(&mut tx, existing.ip_address_id, fields.ip_address_id)
                    .await
                    .map_err(|e| ledger_error(e, &placement.ip.ip_address))?;
                debug!(
                    "Asset {} moved from {} to {}",
                    id, existing.ip_address.ip_address, placement.ip.ip_address
                );
            }
        }

        if fields.user_id != existing.user_id {
            if let Some(owner) = fields.user_id {
                account::find_user(&mut *tx, owner)
                    .await?
                    .ok_or_else(|| ApiError::bad_request("Invalid selection for userId"))?;
            }
        }

        asset::update(&mut tx, id, &fields).await?;

        let changes = input.profile_changes();
        if let Some(owner) = fields.user_id.filter(|_| !changes.is_empty()) {
            account::update_profile(&mut *tx, owner, &changes).await?;
        }

        // Same rule as delete: an owner whose last device moved away goes too
        if let Some(previous) = existing.user_id.filter(|prev| fields.user_id != Some(*prev)) {
            if account::delete_if_deviceless(&mut tx, previous).await? {
                info!("Removed user {} after their last device was reassigned", previous);
            }
        }

        tx.commit().await?;
        info!("{} updated asset {}", caller.username, id);
        self.reload(id).await
    }

    /// Remove a device, free its address, and drop an owner left with no devices.
    /// Deleting an asset that is already gone succeeds.
    pub async fn delete(&self, caller: &AuthUser, id: Uuid) -> Result<(), ApiError> {
        if !caller.is_admin() {
            return Err(ApiError::forbidden("Forbidden: Admin access required."));
        }

        let mut tx = self.pool.begin().await?;
        match asset::delete(&mut tx, id).await? {
            None => debug!("Asset {} already deleted", id),
            Some((ip_id, owner)) => {
                ip_ledger::release(&mut tx, ip_id).await?;
                if let Some(owner) = owner {
                    if account::delete_if_deviceless(&mut tx, owner).await? {
                        info!("Removed user {} along with their last device", owner);
                    }
                }
                info!("{} deleted asset {}", caller.username, id);
            }
        }
        tx.commit().await?;
        Ok(())
    }

    async fn reload(&self, id: Uuid) -> Result<Asset, ApiError> {
        asset::find(&self.pool, id)
            .await?
            .ok_or_else(|| ApiError::internal_server_error("Saved asset could not be read back"))
    }
}
