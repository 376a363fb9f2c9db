use anyhow::{bail, Context};
use tokio::signal;
use tracing_subscriber::EnvFilter;

use asset_inventory_api::app::{router, AppState};
use asset_inventory_api::catalog::ServiceTagCatalog;
use asset_inventory_api::config;
use asset_inventory_api::database::DatabaseManager;
use asset_inventory_api::is_production;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=info,sqlx=warn")),
        )
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();
    tracing::info!("Starting Asset Inventory API in {:?} mode", config.environment);

    if is_production!() && config.security.jwt_secret.is_empty() {
        bail!("JWT_SECRET must be set in production");
    }

    let pool = DatabaseManager::connect_lazy(&config.database).context("invalid DATABASE_URL")?;

    if config.database.auto_migrate {
        if let Err(e) = DatabaseManager::migrate(&pool).await {
            tracing::warn!("Skipping migrations, database not ready: {}", e);
        }
    }

    let catalog = ServiceTagCatalog::load_or_empty(&config.inventory.service_tag_csv);
    let app = router(AppState::new(pool.clone(), catalog), &config.security);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Asset Inventory API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    DatabaseManager::close(pool).await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}
