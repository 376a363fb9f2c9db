use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{Department, Division, IpAddress, IpStatus, UserProfile};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "device_status")]
pub enum DeviceStatus {
    #[default]
    Active,
    #[sqlx(rename = "In Repair")]
    #[serde(rename = "In Repair")]
    InRepair,
    Retired,
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceStatus::Active => write!(f, "Active"),
            DeviceStatus::InRepair => write!(f, "In Repair"),
            DeviceStatus::Retired => write!(f, "Retired"),
        }
    }
}

impl FromStr for DeviceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(DeviceStatus::Active),
            "in repair" | "in_repair" | "inrepair" => Ok(DeviceStatus::InRepair),
            "retired" => Ok(DeviceStatus::Retired),
            other => Err(format!("unknown device status '{}'", other)),
        }
    }
}

/// Flat row produced by `repository::asset::SELECT_ASSETS`
#[derive(Debug, Clone, FromRow)]
pub struct AssetRow {
    pub id: Uuid,
    pub ip_address_id: Uuid,
    pub department_id: Option<Uuid>,
    pub division_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub device_type: String,
    pub brand: String,
    pub model: Option<String>,
    pub service_tag: String,
    pub mac_address: Option<String>,
    pub date_received: NaiveDate,
    pub status: DeviceStatus,
    pub notes: Option<String>,
    pub sn_monitor: Option<String>,
    pub sn_ups: Option<String>,
    pub color_sticker: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    pub ip_address: String,
    pub ip_status: IpStatus,

    pub user_username: Option<String>,
    pub user_rank: Option<String>,
    pub user_first_name: Option<String>,
    pub user_last_name: Option<String>,
    pub user_contact_number: Option<String>,

    pub department_name: Option<String>,
    pub department_special_ip_ranges: Option<String>,

    pub division_name: Option<String>,
    pub division_department_id: Option<Uuid>,
}

/// A device together with its address, owner, department and division
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: Uuid,
    pub ip_address_id: Uuid,
    pub department_id: Option<Uuid>,
    pub division_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub device_type: String,
    pub brand: String,
    pub model: Option<String>,
    pub service_tag: String,
    pub mac_address: Option<String>,
    pub date_received: NaiveDate,
    pub status: DeviceStatus,
    pub notes: Option<String>,
    pub sn_monitor: Option<String>,
    pub sn_ups: Option<String>,
    pub color_sticker: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub ip_address: IpAddress,
    pub user: Option<UserProfile>,
    pub department: Option<Department>,
    pub division: Option<Division>,
}

impl Asset {
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == Some(user_id)
    }
}

impl From<AssetRow> for Asset {
    fn from(row: AssetRow) -> Self {
        let user = match (row.user_id, row.user_username, row.user_first_name, row.user_last_name) {
            (Some(id), Some(username), Some(first_name), Some(last_name)) => Some(UserProfile {
                id,
                username,
                rank: row.user_rank,
                first_name,
                last_name,
                contact_number: row.user_contact_number,
            }),
            _ => None,
        };

        let department = match (row.department_id, row.department_name) {
            (Some(id), Some(name)) => Some(Department {
                id,
                name,
                special_ip_ranges: row.department_special_ip_ranges,
            }),
            _ => None,
        };

        let division = match (row.division_id, row.division_name, row.division_department_id) {
            (Some(id), Some(name), Some(department_id)) => Some(Division { id, name, department_id }),
            _ => None,
        };

        Self {
            id: row.id,
            ip_address_id: row.ip_address_id,
            department_id: row.department_id,
            division_id: row.division_id,
            user_id: row.user_id,
            device_type: row.device_type,
            brand: row.brand,
            model: row.model,
            service_tag: row.service_tag,
            mac_address: row.mac_address,
            date_received: row.date_received,
            status: row.status,
            notes: row.notes,
            sn_monitor: row.sn_monitor,
            sn_ups: row.sn_ups,
            color_sticker: row.color_sticker,
            created_at: row.created_at,
            updated_at: row.updated_at,
            ip_address: IpAddress {
                id: row.ip_address_id,
                ip_address: row.ip_address,
                status: row.ip_status,
            },
            user,
            department,
            division,
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Test asset owned by `user`, placed in `department`/`division` when given
    pub fn asset(
        device_type: &str,
        ip: &str,
        user: Option<UserProfile>,
        department: Option<Department>,
        division: Option<Division>,
    ) -> Asset {
        let now = Utc::now();
        let ip_id = Uuid::new_v4();
        Asset {
            id: Uuid::new_v4(),
            ip_address_id: ip_id,
            department_id: department.as_ref().map(|d| d.id),
            division_id: division.as_ref().map(|d| d.id),
            user_id: user.as_ref().map(|u| u.id),
            device_type: device_type.to_string(),
            brand: "Dell".to_string(),
            model: Some("OptiPlex 7090".to_string()),
            service_tag: format!("ST-{}", &ip_id.simple().to_string()[..6]),
            mac_address: None,
            date_received: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap_or_default(),
            status: DeviceStatus::Active,
            notes: None,
            sn_monitor: None,
            sn_ups: None,
            color_sticker: None,
            created_at: now,
            updated_at: now,
            ip_address: IpAddress {
                id: ip_id,
                ip_address: ip.to_string(),
                status: IpStatus::Assigned,
            },
            user,
            department,
            division,
        }
    }
}
