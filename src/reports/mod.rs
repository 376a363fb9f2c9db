//! Asset list filtering and per-department statistics.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::Asset;
use crate::error::ApiError;
use crate::handlers::optional_id;

/// Device type whose rows carry a color sticker worth filtering on
pub const LEASED_PC: &str = "PC เช่า";

const UNASSIGNED: &str = "N/A";

/// Query-string filters shared by the asset list and the statistics report.
/// Empty strings behave as absent, matching what HTML selects send.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetFilter {
    pub search: Option<String>,
    pub department_id: Option<String>,
    pub division_id: Option<String>,
    pub device_type: Option<String>,
    pub color_sticker: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

impl AssetFilter {
    pub fn is_empty(&self) -> bool {
        present(&self.search).is_none()
            && present(&self.department_id).is_none()
            && present(&self.division_id).is_none()
            && present(&self.device_type).is_none()
            && present(&self.color_sticker).is_none()
    }

    fn matches_search(asset: &Asset, needle: &str) -> bool {
        let department = asset.department.as_ref().map(|d| d.name.as_str()).unwrap_or("");
        let division = asset.division.as_ref().map(|d| d.name.as_str()).unwrap_or("");
        let person = asset.user.as_ref().map(|u| u.display_name()).unwrap_or_default();

        contains_ci(department, needle)
            || contains_ci(division, needle)
            || contains_ci(&person, needle)
            || contains_ci(&asset.ip_address.ip_address, needle)
            || contains_ci(&asset.device_type, needle)
            || contains_ci(&asset.brand, needle)
            || asset.model.as_deref().map_or(false, |m| contains_ci(m, needle))
    }

    /// Department and division ids as parsed values; a malformed id is a 400
    fn ids(&self) -> Result<(Option<Uuid>, Option<Uuid>), ApiError> {
        let department_id = optional_id("departmentId", self.department_id.as_deref())?;
        let division_id = optional_id("divisionId", self.division_id.as_deref())?;
        Ok((department_id, division_id))
    }

    fn matches(&self, asset: &Asset, department_id: Option<Uuid>, division_id: Option<Uuid>) -> bool {
        if let Some(search) = present(&self.search) {
            if !Self::matches_search(asset, &search.to_lowercase()) {
                return false;
            }
        }

        if department_id.is_some() && asset.department_id != department_id {
            return false;
        }

        if division_id.is_some() && asset.division_id != division_id {
            return false;
        }

        let device_type = present(&self.device_type);
        if let Some(device_type) = device_type {
            if asset.device_type != device_type {
                return false;
            }
        }

        // Color stickers only exist on leased PCs
        if device_type == Some(LEASED_PC) {
            if let Some(sticker) = present(&self.color_sticker) {
                if asset.color_sticker.as_deref() != Some(sticker) {
                    return false;
                }
            }
        }

        true
    }

    pub fn apply(&self, assets: Vec<Asset>) -> Result<Vec<Asset>, ApiError> {
        if self.is_empty() {
            return Ok(assets);
        }
        let (department_id, division_id) = self.ids()?;
        Ok(assets
            .into_iter()
            .filter(|asset| self.matches(asset, department_id, division_id))
            .collect())
    }
}

/// Device counts keyed by group name, then device type
pub type TypeCounts = BTreeMap<String, BTreeMap<String, u64>>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetStats {
    pub total: u64,
    pub by_department: TypeCounts,
    pub by_division: TypeCounts,
    pub color_stickers: Vec<String>,
}

impl AssetStats {
    pub fn from_assets(assets: &[Asset]) -> Self {
        let mut stats = AssetStats::default();
        let mut stickers = BTreeSet::new();

        for asset in assets {
            stats.total += 1;

            let department = asset
                .department
                .as_ref()
                .map(|d| d.name.clone())
                .unwrap_or_else(|| UNASSIGNED.to_string());
            *stats
                .by_department
                .entry(department)
                .or_default()
                .entry(asset.device_type.clone())
                .or_default() += 1;

            let division = asset
                .division
                .as_ref()
                .map(|d| d.name.clone())
                .unwrap_or_else(|| UNASSIGNED.to_string());
            *stats
                .by_division
                .entry(division)
                .or_default()
                .entry(asset.device_type.clone())
                .or_default() += 1;

            if asset.device_type == LEASED_PC {
                if let Some(sticker) = asset.color_sticker.as_deref().filter(|s| !s.is_empty()) {
                    stickers.insert(sticker.to_string());
                }
            }
        }

        stats.color_stickers = stickers.into_iter().collect();
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::device::fixtures::asset;
    use crate::database::models::{Department, Division, UserProfile};
    use uuid::Uuid;

    fn department(name: &str) -> Department {
        Department { id: Uuid::new_v4(), name: name.into(), special_ip_ranges: None }
    }

    fn division(name: &str, department: &Department) -> Division {
        Division { id: Uuid::new_v4(), name: name.into(), department_id: department.id }
    }

    fn person(first: &str) -> UserProfile {
        UserProfile {
            id: Uuid::new_v4(),
            username: first.to_lowercase(),
            rank: Some("ร.อ.".into()),
            first_name: first.into(),
            last_name: "Test".into(),
            contact_number: None,
        }
    }

    fn sample() -> (Vec<Asset>, Department, Division) {
        let it = department("Information Technology");
        let hr = department("Human Resources");
        let net = division("Network", &it);

        let mut leased_blue = asset(LEASED_PC, "10.0.0.10", Some(person("Anan")), Some(it.clone()), Some(net.clone()));
        leased_blue.color_sticker = Some("blue".into());
        let mut leased_red = asset(LEASED_PC, "10.0.0.11", None, Some(it.clone()), None);
        leased_red.color_sticker = Some("red".into());
        let printer = asset("Printer", "10.0.1.5", Some(person("Busaba")), Some(hr), None);
        let orphan = asset("Printer", "10.0.2.1", None, None, None);

        (vec![leased_blue, leased_red, printer, orphan], it, net)
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let (assets, _, _) = sample();
        let filter = AssetFilter {
            search: Some("  ".into()),
            department_id: Some(String::new()),
            ..Default::default()
        };
        assert!(filter.is_empty());
        assert_eq!(filter.apply(assets).unwrap().len(), 4);
    }

    #[test]
    fn search_spans_people_ips_and_names() {
        let (assets, _, _) = sample();
        let by_person = AssetFilter { search: Some("ร.อ. anan".into()), ..Default::default() };
        assert_eq!(by_person.apply(assets.clone()).unwrap().len(), 1);

        let by_ip = AssetFilter { search: Some("10.0.1.".into()), ..Default::default() };
        assert_eq!(by_ip.apply(assets.clone()).unwrap().len(), 1);

        let by_department = AssetFilter { search: Some("technology".into()), ..Default::default() };
        assert_eq!(by_department.apply(assets.clone()).unwrap().len(), 2);

        let by_model = AssetFilter { search: Some("optiplex".into()), ..Default::default() };
        assert_eq!(by_model.apply(assets).unwrap().len(), 4);
    }

    #[test]
    fn filters_by_department_and_division_id() {
        let (assets, it, net) = sample();
        let by_department = AssetFilter { department_id: Some(it.id.to_string()), ..Default::default() };
        assert_eq!(by_department.apply(assets.clone()).unwrap().len(), 2);

        let by_division = AssetFilter { division_id: Some(net.id.to_string()), ..Default::default() };
        assert_eq!(by_division.apply(assets.clone()).unwrap().len(), 1);
    }

    #[test]
    fn id_filters_ignore_uuid_spelling() {
        let (assets, it, net) = sample();
        let upper = AssetFilter {
            department_id: Some(it.id.to_string().to_uppercase()),
            ..Default::default()
        };
        assert_eq!(upper.apply(assets.clone()).unwrap().len(), 2);

        let braced = AssetFilter { division_id: Some(format!("{{{}}}", net.id)), ..Default::default() };
        assert_eq!(braced.apply(assets.clone()).unwrap().len(), 1);

        let bogus = AssetFilter { department_id: Some("it".into()), ..Default::default() };
        let err = bogus.apply(assets).unwrap_err();
        assert_eq!(err.to_json()["field_errors"]["departmentId"], "must be a valid id");
    }

    #[test]
    fn color_sticker_only_applies_to_leased_pcs() {
        let (assets, _, _) = sample();
        let leased_blue = AssetFilter {
            device_type: Some(LEASED_PC.into()),
            color_sticker: Some("blue".into()),
            ..Default::default()
        };
        assert_eq!(leased_blue.apply(assets.clone()).unwrap().len(), 1);

        let printers_with_sticker = AssetFilter {
            device_type: Some("Printer".into()),
            color_sticker: Some("blue".into()),
            ..Default::default()
        };
        assert_eq!(printers_with_sticker.apply(assets).unwrap().len(), 2);
    }

    #[test]
    fn stats_group_by_department_division_and_type() {
        let (assets, _, _) = sample();
        let stats = AssetStats::from_assets(&assets);

        assert_eq!(stats.total, 4);
        assert_eq!(stats.by_department["Information Technology"][LEASED_PC], 2);
        assert_eq!(stats.by_department["Human Resources"]["Printer"], 1);
        assert_eq!(stats.by_department["N/A"]["Printer"], 1);
        assert_eq!(stats.by_division["Network"][LEASED_PC], 1);
        assert_eq!(stats.by_division["N/A"]["Printer"], 2);
        assert_eq!(stats.color_stickers, vec!["blue".to_string(), "red".to_string()]);
    }
}
