use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::device::Asset;

/// Whether an address is bound to a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "ip_status")]
pub enum IpStatus {
    Assigned,
    Available,
}

impl fmt::Display for IpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpStatus::Assigned => write!(f, "Assigned"),
            IpStatus::Available => write!(f, "Available"),
        }
    }
}

impl FromStr for IpStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "assigned" => Ok(IpStatus::Assigned),
            "available" => Ok(IpStatus::Available),
            other => Err(format!("unknown IP status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct IpAddress {
    pub id: Uuid,
    pub ip_address: String,
    pub status: IpStatus,
}

/// An address with the device bound to it, if any
#[derive(Debug, Clone, Serialize)]
pub struct IpWithDevice {
    #[serde(flatten)]
    pub ip: IpAddress,
    pub device: Option<Asset>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IpStats {
    pub total: i64,
    pub assigned: i64,
    pub available: i64,
}
