use std::path::PathBuf;

use anyhow::bail;
use serde_json::json;

use crate::catalog::{LeasedDevice, ServiceTagCatalog};
use crate::cli::utils::output_empty_collection;
use crate::cli::OutputFormat;
use crate::config::config;

/// What to pull out of the catalog
pub enum Lookup {
    Search {
        device_type: Option<String>,
        query: Option<String>,
    },
    Exact(String),
}

/// Rows for a lookup; an exact tag that is not in the catalog is an error
pub fn select<'a>(catalog: &'a ServiceTagCatalog, lookup: &Lookup) -> anyhow::Result<Vec<&'a LeasedDevice>> {
    match lookup {
        Lookup::Search { device_type, query } => Ok(catalog.search(device_type.as_deref(), query.as_deref())),
        Lookup::Exact(tag) => match catalog.find_by_service_tag(tag) {
            Some(device) => Ok(vec![device]),
            None => bail!("no leased device with service tag '{}'", tag.trim()),
        },
    }
}

pub fn handle(csv: Option<PathBuf>, lookup: Lookup, output_format: OutputFormat) -> anyhow::Result<()> {
    let path = csv.unwrap_or_else(|| PathBuf::from(&config().inventory.service_tag_csv));
    let catalog = ServiceTagCatalog::load(&path)?;
    let rows = select(&catalog, &lookup)?;

    if rows.is_empty() {
        return output_empty_collection(&output_format, "devices", "No matching leased devices");
    }

    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ "devices": rows }))?);
        }
        OutputFormat::Text => {
            println!(
                "{:<10} {:<10} {:<14} {:<16} {:<16} {}",
                "TYPE", "BRAND", "SERVICE TAG", "S/N MONITOR", "S/N UPS", "STICKER"
            );
            println!("{}", "-".repeat(80));
            for device in rows {
                println!(
                    "{:<10} {:<10} {:<14} {:<16} {:<16} {}",
                    device.kind, device.brand, device.service_tag, device.sn_monitor, device.sn_ups, device.color_sticker
                );
            }
        }
    }
    Ok(())
}
