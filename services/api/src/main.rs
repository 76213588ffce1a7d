use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use syncstay_api::{
    AppState, Gateway,
    repositories::{BookingStore, MemoryStore, PgStore},
    routes, seed,
    settings::AppConfig,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting SyncStay API service");

    let config = AppConfig::from_env()?;

    let store: Arc<dyn BookingStore> = match config.database() {
        Some(db_config) => {
            let pool = common::database::init_pool(&db_config).await?;

            // Check database connectivity
            if common::database::health_check(&pool).await? {
                info!("Database connection successful");
            } else {
                anyhow::bail!("Failed to connect to database");
            }

            let store = PgStore::new(pool);
            store.migrate().await?;
            Arc::new(store)
        }
        None => {
            warn!("No database configured, bookings are kept in memory and lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    let gateway = Gateway::new(store).with_default_pin(config.default_pin.clone());

    if config.seed_demo_data {
        seed::seed_demo_data(&gateway).await?;
    }

    let app = routes::create_router(AppState::new(gateway));

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!("API service listening on {}", config.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
