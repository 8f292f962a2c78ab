//! Data model shared between the store, the preparer and the file processor

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Platform-assigned user identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Conversation that replies and uploads go back to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference to a file held on the platform's servers
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileHandle {
    pub file_id: String,
}

impl FileHandle {
    pub fn new(file_id: impl Into<String>) -> Self {
        Self {
            file_id: file_id.into(),
        }
    }
}

/// Stored thumbnail preference, one per user
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct UserThumbnailPreference {
    pub user_id: i64,
    /// Local path of the last thumbnail set; `None` after `/cleanup`
    pub thumbnail_path: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserThumbnailPreference {
    pub fn thumbnail_reference(&self) -> Option<&str> {
        self.thumbnail_path.as_deref()
    }
}

/// A document the user sent that should be re-uploaded with the thumbnail
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingFileTransfer {
    pub remote_file_handle: FileHandle,
    pub declared_file_name: String,
}

/// Downscaled thumbnail, shared read-only across one batch
#[derive(Debug, Clone)]
pub struct PreparedThumbnail {
    /// The stored reference this was derived from
    pub source_reference: PathBuf,
    /// Where the derived JPEG was written
    pub path: PathBuf,
    pub bounded_image_bytes: Bytes,
    pub width: u32,
    pub height: u32,
}
