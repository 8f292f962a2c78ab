//! Thumbnail Bot - long-polling worker
//!
//! Environment variables:
//! - BOT_TOKEN: Bot API token (required)
//! - API_ID / API_HASH: application credentials of the self-hosted Bot API server (required)
//! - DB_URI: PostgreSQL connection string (required)
//! - DB_NAME: database to use on that server (required)
//! - TELEGRAM_API_URL: Bot API base URL (default: https://api.telegram.org)
//! - DOWNLOAD_DIR: local storage for downloads and thumbnails (default: downloads)
//! - THUMB_MAX_DIMENSION / THUMB_QUALITY: thumbnail bounds (default: 320 / 85)
//! - LOG_FORMAT: set to "json" for JSON logs

use anyhow::Context;
use std::sync::Arc;
use thumbnail_bot::db::{self, PgThumbnailStore};
use thumbnail_bot::handlers::CommandRouter;
use thumbnail_bot::platform::telegram::{TelegramClient, UpdatePoller};
use thumbnail_bot::services::ThumbnailPreparer;
use thumbnail_bot::Config;
use tokio::sync::watch;
use tracing::{error, info};

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("thumbnail_bot=info,info"));

    if std::env::var("LOG_FORMAT").map(|v| v == "json").unwrap_or(false) {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    info!("Starting Thumbnail Bot");

    let config = Config::from_env().context("Failed to load configuration")?;
    info!(
        api_base_url = %config.telegram.api_base_url,
        database = %config.database.name,
        download_dir = %config.storage.download_dir.display(),
        "Configuration loaded"
    );

    tokio::fs::create_dir_all(&config.storage.download_dir)
        .await
        .context("Failed to create download directory")?;

    let pool = db::init_pool(&config.database)
        .await
        .context("Failed to connect to database")?;
    db::MIGRATOR
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;
    info!("Database migrations applied");

    let client = Arc::new(
        TelegramClient::new(&config.telegram, &config.storage)
            .context("Failed to create Telegram client")?,
    );
    let router = Arc::new(CommandRouter::new(
        client.clone(),
        Arc::new(PgThumbnailStore::new(pool)),
        ThumbnailPreparer::new(config.thumbnail.clone()),
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for shutdown signal");
            return;
        }
        info!("Shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    let mut poller = UpdatePoller::new(client, router, config.poller.clone(), shutdown_rx);
    poller.run().await;

    info!("Thumbnail Bot stopped");
    Ok(())
}
