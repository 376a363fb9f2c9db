//! Inventory fixture on a real Postgres.
//!
//! Runs only when `TEST_DATABASE_URL` is set. Each fixture migrates into its
//! own schema so tests can run in parallel against one database.

use std::collections::HashMap;
use std::str::FromStr;

use anyhow::{Context, Result};
use asset_inventory_api::auth::Role;
use asset_inventory_api::database::models::IpStatus;
use asset_inventory_api::database::repository::{department, ip_address};
use asset_inventory_api::database::DatabaseManager;
use asset_inventory_api::middleware::AuthUser;
use asset_inventory_api::services::AssetInput;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use uuid::Uuid;

pub struct Inventory {
    pub pool: PgPool,
    schema: String,
    admin_pool: PgPool,
    ips: HashMap<String, Uuid>,
    /// Ranges 10.20.0.1-10.20.0.3
    pub it: Uuid,
    pub help_desk: Uuid,
    /// No ranges
    pub logistics: Uuid,
    pub warehouse: Uuid,
}

impl Inventory {
    /// `None` when no test database is configured
    pub async fn start() -> Result<Option<Self>> {
        let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
            eprintln!("TEST_DATABASE_URL not set, skipping database test");
            return Ok(None);
        };

        let admin_pool = PgPoolOptions::new().max_connections(1).connect(&url).await?;
        let schema = format!("inventory_{}", Uuid::new_v4().simple());
        sqlx::query(&format!("CREATE SCHEMA {}", schema)).execute(&admin_pool).await?;

        let options = PgConnectOptions::from_str(&url)?.options([("search_path", schema.as_str())]);
        let pool = PgPoolOptions::new().max_connections(4).connect_with(options).await?;
        DatabaseManager::migrate(&pool).await?;

        let it = department::upsert_department(&pool, "Information Technology", Some("10.20.0.1-10.20.0.3")).await?;
        let help_desk = department::upsert_division(&pool, it.id, "Help Desk").await?;
        let logistics = department::upsert_department(&pool, "Logistics", None).await?;
        let warehouse = department::upsert_division(&pool, logistics.id, "Warehouse").await?;

        let addresses: Vec<String> = (1..=5).map(|n| format!("10.20.0.{}", n)).collect();
        let mut conn = pool.acquire().await?;
        ip_address::insert_many(&mut *conn, &addresses).await?;
        drop(conn);

        let ips = ip_address::list(&pool, None)
            .await?
            .into_iter()
            .map(|ip| (ip.ip_address, ip.id))
            .collect();

        Ok(Some(Self {
            pool,
            schema,
            admin_pool,
            ips,
            it: it.id,
            help_desk: help_desk.id,
            logistics: logistics.id,
            warehouse: warehouse.id,
        }))
    }

    pub fn ip(&self, address: &str) -> Uuid {
        self.ips[address]
    }

    pub async fn status(&self, address: &str) -> Result<IpStatus> {
        let ip = ip_address::find(&self.pool, self.ip(address))
            .await?
            .with_context(|| format!("{} missing from pool", address))?;
        Ok(ip.status)
    }

    pub async fn user_count(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users").fetch_one(&self.pool).await?;
        Ok(count)
    }

    /// A device in a department and division, without owner fields
    pub fn device(&self, address: &str, department: Uuid, division: Uuid, service_tag: &str) -> AssetInput {
        AssetInput {
            ip_address_id: Some(self.ip(address).to_string()),
            department_id: Some(department.to_string()),
            division_id: Some(division.to_string()),
            device_type: Some("PC สสท.".into()),
            brand: Some("Dell".into()),
            model: Some("OptiPlex 7090".into()),
            service_tag: Some(service_tag.into()),
            date_received: Some("2024-03-15".into()),
            ..Default::default()
        }
    }

    pub async fn finish(self) -> Result<()> {
        self.pool.close().await;
        sqlx::query(&format!("DROP SCHEMA {} CASCADE", self.schema))
            .execute(&self.admin_pool)
            .await?;
        Ok(())
    }
}

/// New owner fields on top of a device body
pub fn with_owner(mut input: AssetInput, username: &str, password: &str) -> AssetInput {
    input.username = Some(username.into());
    input.password = Some(password.into());
    input.first_name = Some("Somchai".into());
    input.last_name = Some("Jaidee".into());
    input
}

pub fn admin() -> AuthUser {
    AuthUser { id: Uuid::new_v4(), username: "root".into(), role: Role::Admin }
}
