//! Persistence for per-user thumbnail preferences

pub mod memory;
pub mod thumbnail_store;

pub use memory::InMemoryThumbnailStore;
pub use thumbnail_store::{PgThumbnailStore, ThumbnailStore};

use crate::config::DatabaseConfig;
use sqlx::migrate::Migrator;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Connect to `DB_URI`, selecting the database named by `DB_NAME`
pub async fn init_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let options = PgConnectOptions::from_str(&config.uri)?.database(&config.name);

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await?;

    info!(
        database = %config.name,
        max_connections = config.max_connections,
        "Database pool initialized"
    );
    Ok(pool)
}
