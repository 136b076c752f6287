use anyhow::{Context, Result};
use domain::services::{InMemoryMessageStore, MessageStore};
use event_messaging_api::{
    app,
    config::{Config, StoreBackend},
    middleware,
};
use persistence::PgMessageStore;
use std::sync::Arc;
use tracing::{info, warn};

/// Build the record store selected by `messaging.store`.
async fn build_store(config: &Config) -> Result<Arc<dyn MessageStore>> {
    match config.messaging.store {
        StoreBackend::Postgres => {
            let db_config: persistence::db::DatabaseConfig = (&config.database).into();
            let pool = persistence::db::create_pool(&db_config)
                .await
                .context("failed to connect to database")?;

            if config.database.run_migrations {
                info!("Running database migrations...");
                persistence::db::run_migrations(&pool).await?;
            }

            Ok(Arc::new(PgMessageStore::new(pool)))
        }
        StoreBackend::Memory => {
            warn!("Using in-memory record store; data is lost on restart");
            Ok(Arc::new(InMemoryMessageStore::new()))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = Config::load()?;

    middleware::logging::init_logging(&config.logging);
    middleware::init_metrics()?;

    info!(
        store = ?config.messaging.store,
        "Starting event messaging API v{}",
        env!("CARGO_PKG_VERSION")
    );

    let store = build_store(&config).await?;
    let addr = config.socket_addr()?;
    let app = app::create_app(config, store);

    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
