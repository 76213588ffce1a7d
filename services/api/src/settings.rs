//! Service configuration
//!
//! Built-in defaults, overridden by `SYNCSTAY_*` environment variables:
//!
//! - `SYNCSTAY_BIND_ADDRESS`: listen address (default: "0.0.0.0:3000")
//! - `SYNCSTAY_DATABASE_URL`: PostgreSQL URL; unset keeps everything in memory
//! - `SYNCSTAY_DATABASE_MAX_CONNECTIONS`: pool size (default: 5)
//! - `SYNCSTAY_DEFAULT_PIN`: pin for properties created without one (default: "0000")
//! - `SYNCSTAY_SEED_DEMO_DATA`: pre-fill the store with a demo property (default: false)

use anyhow::Result;
use common::database::{DEFAULT_MAX_CONNECTIONS, DatabaseConfig};
use serde::Deserialize;

use crate::gateway::DEFAULT_PROPERTY_PIN;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub bind_address: String,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub default_pin: String,
    pub seed_demo_data: bool,
}

impl AppConfig {
    /// Load the configuration from defaults and the environment
    pub fn from_env() -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("bind_address", "0.0.0.0:3000")?
            .set_default(
                "database_max_connections",
                i64::from(DEFAULT_MAX_CONNECTIONS),
            )?
            .set_default("default_pin", DEFAULT_PROPERTY_PIN)?
            .set_default("seed_demo_data", false)?
            .add_source(config::Environment::with_prefix("SYNCSTAY"))
            .build()?;

        let mut config: AppConfig = settings.try_deserialize()?;

        // An empty URL means "no database", same as leaving it unset
        if config
            .database_url
            .as_deref()
            .is_some_and(|url| url.trim().is_empty())
        {
            config.database_url = None;
        }

        Ok(config)
    }

    /// PostgreSQL settings, when a database URL is configured
    pub fn database(&self) -> Option<DatabaseConfig> {
        self.database_url.as_ref().map(|url| {
            DatabaseConfig::new(url.clone()).with_max_connections(self.database_max_connections)
        })
    }
}
