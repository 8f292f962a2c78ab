/// Configuration management for thumbnail-bot
///
/// Loads configuration from environment variables. Credentials and the
/// database location are required; everything else has a default.
use crate::error::{BotError, Result};
use crate::platform::telegram::PollerConfig;
use crate::services::thumbnail::ThumbnailConfig;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Config {
    pub telegram: TelegramConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub thumbnail: ThumbnailConfig,
    pub poller: PollerConfig,
}

#[derive(Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    /// Application identity for a self-hosted Bot API server
    pub api_id: i32,
    pub api_hash: String,
    pub api_base_url: String,
    pub request_timeout: Duration,
}

impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"<redacted>")
            .field("api_id", &self.api_id)
            .field("api_hash", &"<redacted>")
            .field("api_base_url", &self.api_base_url)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

#[derive(Clone)]
pub struct DatabaseConfig {
    pub uri: String,
    pub name: String,
    pub max_connections: u32,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("uri", &"<redacted>")
            .field("name", &self.name)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct StorageConfig {
    /// Where downloaded documents and thumbnails are written
    pub download_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String> {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| BotError::ConfigurationMissing(key.to_string()))
        };

        let api_id_raw = required("API_ID")?;
        let api_id = api_id_raw
            .trim()
            .parse::<i32>()
            .map_err(|e| BotError::ConfigurationInvalid {
                key: "API_ID".to_string(),
                reason: e.to_string(),
            })?;

        let thumbnail_defaults = ThumbnailConfig::default();
        let poller_defaults = PollerConfig::default();

        Ok(Config {
            telegram: TelegramConfig {
                bot_token: required("BOT_TOKEN")?,
                api_id,
                api_hash: required("API_HASH")?,
                api_base_url: lookup("TELEGRAM_API_URL")
                    .map(|url| url.trim_end_matches('/').to_string())
                    .unwrap_or_else(|| "https://api.telegram.org".to_string()),
                request_timeout: Duration::from_secs(parse_or(
                    &lookup,
                    "TELEGRAM_REQUEST_TIMEOUT_SECS",
                    300,
                )),
            },
            database: DatabaseConfig {
                uri: required("DB_URI")?,
                name: required("DB_NAME")?,
                max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 5),
            },
            storage: StorageConfig {
                download_dir: lookup("DOWNLOAD_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("downloads")),
            },
            thumbnail: ThumbnailConfig {
                max_dimension: parse_or(
                    &lookup,
                    "THUMB_MAX_DIMENSION",
                    thumbnail_defaults.max_dimension,
                )
                .clamp(1, thumbnail_defaults.max_dimension),
                quality: parse_or(&lookup, "THUMB_QUALITY", thumbnail_defaults.quality)
                    .clamp(1, 100),
            },
            poller: PollerConfig {
                poll_timeout_secs: parse_or(
                    &lookup,
                    "POLL_TIMEOUT_SECS",
                    poller_defaults.poll_timeout_secs,
                ),
                media_group_window: lookup("MEDIA_GROUP_WINDOW_MS")
                    .and_then(|v| v.parse().ok())
                    .map(Duration::from_millis)
                    .unwrap_or(poller_defaults.media_group_window),
            },
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
