//! `assetctl seed` loads reference data from a YAML fixture:
//!
//! ```yaml
//! departments:
//!   - name: Network Operations
//!     specialIpRanges: "10.10.1.1-10.10.1.50, 10.10.2"
//!     divisions: [Core, Edge]
//! ipPools:
//!   - "10.10.1.1-10.10.1.60"
//! admins:
//!   - username: admin
//!     password: change-me
//! ```
//!
//! Departments and divisions are upserted by name, addresses already in the
//! pool are skipped, and existing admins keep their password. Running the
//! same fixture twice changes nothing.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;
use serde_json::json;

use crate::auth::hash_password;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::database::repository::{account, department, ip_address};
use crate::iprange::IpRangeSet;

use super::ip::expand_pool;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedFixture {
    #[serde(default)]
    pub departments: Vec<DepartmentSeed>,
    #[serde(default)]
    pub ip_pools: Vec<String>,
    #[serde(default)]
    pub admins: Vec<AdminSeed>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentSeed {
    pub name: String,
    pub special_ip_ranges: Option<String>,
    #[serde(default)]
    pub divisions: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct AdminSeed {
    pub username: String,
    pub password: String,
}

impl SeedFixture {
    pub fn from_yaml(yaml: &str) -> anyhow::Result<Self> {
        let fixture: SeedFixture = serde_yaml::from_str(yaml)?;
        Ok(fixture)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let yaml = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_yaml(&yaml).with_context(|| format!("invalid fixture {}", path.display()))
    }

    /// Reject bad range lists before anything is written; returns the pool addresses
    pub fn addresses(&self) -> anyhow::Result<Vec<String>> {
        for dep in &self.departments {
            if let Some(ranges) = dep.special_ip_ranges.as_deref() {
                IpRangeSet::parse(ranges)
                    .with_context(|| format!("department '{}' has invalid specialIpRanges", dep.name))?;
            }
        }

        let mut addresses = BTreeSet::new();
        for pool in &self.ip_pools {
            addresses.extend(expand_pool(pool)?);
        }
        Ok(addresses.into_iter().collect())
    }
}

pub async fn handle(file: PathBuf, output_format: OutputFormat) -> anyhow::Result<()> {
    let fixture = SeedFixture::load(&file)?;
    let addresses = fixture.addresses()?;

    let pool = super::connect().await?;
    let mut tx = pool.begin().await?;

    let mut divisions = 0;
    for dep in &fixture.departments {
        let ranges = dep.special_ip_ranges.as_deref().map(str::trim).filter(|r| !r.is_empty());
        let row = department::upsert_department(&mut *tx, dep.name.trim(), ranges).await?;
        for division in &dep.divisions {
            department::upsert_division(&mut *tx, row.id, division.trim()).await?;
            divisions += 1;
        }
    }

    let inserted = ip_address::insert_many(&mut tx, &addresses).await?;

    let mut admins = 0;
    for admin in &fixture.admins {
        if account::find_admin_by_username(&mut *tx, &admin.username).await?.is_some() {
            tracing::info!("Admin '{}' already exists, leaving it unchanged", admin.username);
            continue;
        }
        let hash = hash_password(admin.password.clone()).await?;
        account::create_admin(&mut *tx, &admin.username, &hash).await?;
        admins += 1;
    }

    tx.commit().await?;

    let message = format!(
        "Seeded {} departments, {} divisions, {} new addresses, {} new admins from {}",
        fixture.departments.len(),
        divisions,
        inserted,
        admins,
        file.display()
    );
    output_success(
        &output_format,
        &message,
        Some(json!({
            "departments": fixture.departments.len(),
            "divisions": divisions,
            "addresses": inserted,
            "admins": admins,
        })),
    )
}
