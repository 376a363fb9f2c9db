pub mod admin;
pub mod ip;
pub mod migrate;
pub mod seed;
pub mod service_tags;

use sqlx::PgPool;

use crate::config::config;
use crate::database::DatabaseManager;

/// Eager pool for commands that need the database
pub(crate) async fn connect() -> anyhow::Result<PgPool> {
    let database = &config().database;
    let pool = DatabaseManager::connect(database).await?;
    Ok(pool)
}
