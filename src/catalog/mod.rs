//! Leased device catalog.
//!
//! Leased PCs and notebooks arrive with a vendor spreadsheet exported as CSV:
//!
//! ```text
//! type,brand,service tag,s/n monitor,s/n ups,color sticker
//! pc,Dell,7XK2P33,CN-0V8R,UPS-1182,blue
//! ```
//!
//! Data entry looks rows up by service tag to pre-fill brand and serial numbers.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Serialize;
use thiserror::Error;

/// Device types that are filled from the catalog, and the catalog `type` they map to
pub const LEASED_DEVICE_TYPES: &[(&str, &str)] = &[("PC เช่า", "pc"), ("Notebook เช่า", "notebook")];

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeasedDevice {
    #[serde(rename = "type")]
    pub kind: String,
    pub brand: String,
    pub service_tag: String,
    pub sn_monitor: String,
    pub sn_ups: String,
    pub color_sticker: String,
}

#[derive(Debug, Clone, Copy)]
enum Column {
    Kind,
    Brand,
    ServiceTag,
    SnMonitor,
    SnUps,
    ColorSticker,
}

impl Column {
    fn from_header(header: &str) -> Option<Self> {
        let normalized = header.replace('\u{feff}', "");
        match normalized.trim().to_lowercase().as_str() {
            "type" => Some(Column::Kind),
            "brand" => Some(Column::Brand),
            "service tag" | "servicetag" => Some(Column::ServiceTag),
            "s/n monitor" | "snmonitor" => Some(Column::SnMonitor),
            "s/n ups" | "snups" => Some(Column::SnUps),
            "color sticker" | "colorsticker" => Some(Column::ColorSticker),
            _ => None,
        }
    }

    fn slot<'a>(&self, device: &'a mut LeasedDevice) -> &'a mut String {
        match self {
            Column::Kind => &mut device.kind,
            Column::Brand => &mut device.brand,
            Column::ServiceTag => &mut device.service_tag,
            Column::SnMonitor => &mut device.sn_monitor,
            Column::SnUps => &mut device.sn_ups,
            Column::ColorSticker => &mut device.color_sticker,
        }
    }
}

/// Map a device type to the catalog `type` it draws from
pub fn leased_kind(device_type: &str) -> Option<&'static str> {
    LEASED_DEVICE_TYPES
        .iter()
        .find(|(name, _)| *name == device_type.trim())
        .map(|(_, kind)| *kind)
}

#[derive(Debug, Clone, Default)]
pub struct ServiceTagCatalog {
    devices: Vec<LeasedDevice>,
}

impl ServiceTagCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse CSV with a header row. Unknown columns are ignored, missing
    /// trailing cells read as empty strings.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let columns: Vec<Option<Column>> = csv_reader.headers()?.iter().map(Column::from_header).collect();

        let mut devices = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            let mut device = LeasedDevice::default();
            for (index, column) in columns.iter().enumerate() {
                if let Some(column) = column {
                    *column.slot(&mut device) = record.get(index).unwrap_or("").to_string();
                }
            }
            devices.push(device);
        }

        Ok(Self { devices })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| CatalogError::Open {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_reader(file)
    }

    /// Load at startup; an absent file is not fatal, the catalog is just empty
    pub fn load_or_empty(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(catalog) => {
                tracing::info!("Loaded {} leased devices from {}", catalog.len(), path.display());
                catalog
            }
            Err(e) => {
                tracing::warn!("Service tag catalog not loaded: {}", e);
                Self::empty()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn devices(&self) -> &[LeasedDevice] {
        &self.devices
    }

    /// Rows for a device type, narrowed by a case-insensitive service tag substring.
    ///
    /// Without a device type every row is a candidate; a non-leased device type
    /// has no catalog rows.
    pub fn search(&self, device_type: Option<&str>, query: Option<&str>) -> Vec<&LeasedDevice> {
        let kind = match device_type.filter(|t| !t.trim().is_empty()) {
            Some(device_type) => match leased_kind(device_type) {
                Some(kind) => Some(kind),
                None => return Vec::new(),
            },
            None => None,
        };
        let needle = query.map(|q| q.trim().to_lowercase()).unwrap_or_default();

        self.devices
            .iter()
            .filter(|d| kind.map_or(true, |k| d.kind.eq_ignore_ascii_case(k)))
            .filter(|d| needle.is_empty() || d.service_tag.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn find_by_service_tag(&self, service_tag: &str) -> Option<&LeasedDevice> {
        self.devices
            .iter()
            .find(|d| d.service_tag.eq_ignore_ascii_case(service_tag.trim()))
    }
}
