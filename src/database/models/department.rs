use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::iprange::{IpRangeError, IpRangeSet};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: Uuid,
    pub name: String,
    pub special_ip_ranges: Option<String>,
}

impl Department {
    /// Parsed range list; `None` when the department is unrestricted
    pub fn ip_ranges(&self) -> Result<Option<IpRangeSet>, IpRangeError> {
        match self.special_ip_ranges.as_deref() {
            None => Ok(None),
            Some(list) => {
                let set = IpRangeSet::parse(list)?;
                Ok(if set.is_empty() { None } else { Some(set) })
            }
        }
    }

    /// Whether `ip` may be used by this department.
    ///
    /// Unrestricted departments allow everything. A stored list that no longer
    /// parses is logged and treated as unrestricted so data entry is not blocked.
    pub fn allows(&self, ip: &str) -> bool {
        match self.ip_ranges() {
            Ok(None) => true,
            Ok(Some(set)) => set.contains(ip),
            Err(e) => {
                tracing::warn!("Department '{}' has unusable IP ranges: {}", self.name, e);
                true
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Division {
    pub id: Uuid,
    pub name: String,
    pub department_id: Uuid,
}

#[derive(Debug, Clone, Serialize)]
pub struct DepartmentWithDivisions {
    #[serde(flatten)]
    pub department: Department,
    pub divisions: Vec<Division>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn department(ranges: Option<&str>) -> Department {
        Department {
            id: Uuid::new_v4(),
            name: "Network".to_string(),
            special_ip_ranges: ranges.map(str::to_string),
        }
    }

    #[test]
    fn blank_ranges_mean_unrestricted() {
        assert!(department(None).ip_ranges().unwrap().is_none());
        assert!(department(Some(" ")).ip_ranges().unwrap().is_none());
    }

    #[test]
    fn parses_stored_ranges() {
        let set = department(Some("10.0.0.1-10.0.0.5")).ip_ranges().unwrap().unwrap();
        assert!(set.contains("10.0.0.3"));
        assert!(department(Some("10.0.0.5-10.0.0.1")).ip_ranges().is_err());
    }

    #[test]
    fn allows_checks_membership() {
        assert!(department(None).allows("192.168.1.1"));
        let restricted = department(Some("10.0.0, 172.16.5.9"));
        assert!(restricted.allows("10.0.0.77"));
        assert!(restricted.allows("172.16.5.9"));
        assert!(!restricted.allows("10.0.1.1"));
        assert!(department(Some("garbage-entry")).allows("10.0.1.1"));
    }

    #[test]
    fn serializes_camel_case_with_divisions() {
        let dep = department(Some("10.0.0"));
        let division = Division { id: Uuid::new_v4(), name: "Ops".into(), department_id: dep.id };
        let value = serde_json::to_value(DepartmentWithDivisions {
            department: dep.clone(),
            divisions: vec![division],
        })
        .unwrap();
        assert_eq!(value["specialIpRanges"], "10.0.0");
        assert_eq!(value["divisions"][0]["departmentId"], dep.id.to_string());
    }
}
