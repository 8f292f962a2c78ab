/// Error types for the thumbnail bot
///
/// Every error is handled at the boundary of the operation it occurs in (one
/// command, one file) and turned into a chat reply through
/// [`BotError::user_message`]. Only configuration errors abort startup.
use thiserror::Error;

/// Result type for thumbnail-bot operations
pub type Result<T> = std::result::Result<T, BotError>;

/// Failures reported by a chat-platform client
#[derive(Error, Debug)]
pub enum PlatformError {
    /// Transport-level failure (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The platform answered but rejected the request
    #[error("API error {code}: {description}")]
    Api { code: i32, description: String },

    /// Local file could not be read or written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// `getFile` returned no downloadable path
    #[error("file {0} has no download path")]
    MissingFilePath(String),
}

/// Application error types
#[derive(Error, Debug)]
pub enum BotError {
    /// Required startup credential absent
    #[error("Missing required configuration: {0}")]
    ConfigurationMissing(String),

    /// Startup value present but malformed
    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigurationInvalid { key: String, reason: String },

    /// User asked for file processing without a stored thumbnail
    #[error("No thumbnail configured")]
    NoThumbnailConfigured,

    /// `/setthumb` was not a reply to a photo
    #[error("/setthumb must be sent as a reply to a photo")]
    InvalidSetThumbRequest,

    /// Stored thumbnail could not be read or decoded
    #[error("Thumbnail unreadable at {path}: {reason}")]
    ImageUnreadable { path: String, reason: String },

    #[error("Download failed for {file_name}: {source}")]
    DownloadFailed {
        file_name: String,
        #[source]
        source: PlatformError,
    },

    #[error("Upload failed for {file_name}: {source}")]
    UploadFailed {
        file_name: String,
        #[source]
        source: PlatformError,
    },

    /// `/cleanup` with nothing stored; informational
    #[error("Nothing to clean up")]
    NothingToCleanUp,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BotError {
    /// Text sent back to the user when this error ends an operation
    pub fn user_message(&self) -> String {
        match self {
            BotError::NoThumbnailConfigured => {
                "❌ No thumbnail set! Use /setthumb to set a thumbnail first.".to_string()
            }
            BotError::InvalidSetThumbRequest => {
                "❌ Reply to a photo to set it as the thumbnail!".to_string()
            }
            BotError::NothingToCleanUp => "❌ No thumbnail found to clean up!".to_string(),
            BotError::ImageUnreadable { .. } => {
                "❌ Your stored thumbnail could not be read. Set a new one with /setthumb."
                    .to_string()
            }
            BotError::DownloadFailed { file_name, .. } => {
                format!("❌ Failed to download {file_name}.")
            }
            BotError::UploadFailed { file_name, .. } => {
                format!("❌ Failed to upload {file_name}.")
            }
            BotError::ConfigurationMissing(_)
            | BotError::ConfigurationInvalid { .. }
            | BotError::Database(_)
            | BotError::Platform(_)
            | BotError::Io(_)
            | BotError::Internal(_) => {
                "❌ Something went wrong on our side. Please try again later.".to_string()
            }
        }
    }

    /// Expected outcomes of user input rather than faults
    pub fn is_informational(&self) -> bool {
        matches!(
            self,
            BotError::NoThumbnailConfigured
                | BotError::InvalidSetThumbRequest
                | BotError::NothingToCleanUp
        )
    }
}
