//! Command router - turns inbound events into store, preparer and processor calls
//!
//! Each handler returns `Result`; `dispatch` is the error boundary that turns
//! any failure into a reply so nothing escapes to the poller.

pub mod command;

pub use command::Command;

use crate::db::ThumbnailStore;
use crate::error::{BotError, Result};
use crate::models::{ChatId, FileHandle, IncomingFileTransfer, UserId};
use crate::platform::{ChatPlatform, InboundEvent};
use crate::services::thumbnail::resized_path;
use crate::services::{BatchFileProcessor, LocalFile, ThumbnailPreparer};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};

const GREETING: &str = "Hello! I'm your thumbnail bot. Use /setthumb to set a thumbnail and send me documents to update them!";

pub struct CommandRouter {
    platform: Arc<dyn ChatPlatform>,
    store: Arc<dyn ThumbnailStore>,
    preparer: ThumbnailPreparer,
    processor: BatchFileProcessor,
}

impl CommandRouter {
    pub fn new(
        platform: Arc<dyn ChatPlatform>,
        store: Arc<dyn ThumbnailStore>,
        preparer: ThumbnailPreparer,
    ) -> Self {
        let processor = BatchFileProcessor::new(platform.clone());
        Self {
            platform,
            store,
            preparer,
            processor,
        }
    }

    /// Handle one event to completion, replying with any failure
    pub async fn dispatch(&self, event: InboundEvent) {
        let chat = event.chat();
        let user = event.user();

        let result = match event {
            InboundEvent::Command {
                command: Command::Start,
                ..
            } => self.reply(chat, GREETING).await,
            InboundEvent::Command {
                command: Command::SetThumb,
                reply_to_photo,
                ..
            } => self.set_thumbnail(chat, user, reply_to_photo).await,
            InboundEvent::Command {
                command: Command::Cleanup,
                ..
            } => self.cleanup(chat, user).await,
            InboundEvent::Document { transfer, .. } => {
                self.handle_documents(chat, user, vec![transfer]).await
            }
            InboundEvent::DocumentGroup { transfers, .. } => {
                self.handle_documents(chat, user, transfers).await
            }
        };

        if let Err(e) = result {
            if e.is_informational() {
                info!(chat_id = %chat, user_id = %user, reason = %e, "Request declined");
            } else {
                error!(chat_id = %chat, user_id = %user, error = %e, "Request failed");
            }
            if let Err(send_err) = self.platform.send_message(chat, &e.user_message()).await {
                warn!(chat_id = %chat, error = %send_err, "Failed to send error reply");
            }
        }
    }

    async fn reply(&self, chat: ChatId, text: &str) -> Result<()> {
        self.platform.send_message(chat, text).await?;
        Ok(())
    }

    /// `/setthumb` in reply to a photo: download it and make it the user's thumbnail
    async fn set_thumbnail(
        &self,
        chat: ChatId,
        user: UserId,
        photo: Option<FileHandle>,
    ) -> Result<()> {
        let photo = photo.ok_or(BotError::InvalidSetThumbRequest)?;

        self.reply(chat, "⏳ Downloading the thumbnail...").await?;
        // Removed again unless the store accepts the new reference.
        let downloaded = LocalFile::new(self.platform.download(&photo).await.map_err(
            |source| BotError::DownloadFailed {
                file_name: "thumbnail".to_string(),
                source,
            },
        )?);
        let reference = downloaded.path().to_string_lossy().into_owned();

        let previous = self
            .store
            .get(user)
            .await?
            .and_then(|pref| pref.thumbnail_path);

        self.store.set(user, &reference).await?;
        downloaded.keep();
        info!(user_id = %user, path = %reference, "Thumbnail set");

        if let Some(previous) = previous.filter(|p| *p != reference) {
            remove_thumbnail_files(Path::new(&previous)).await;
        }

        self.reply(chat, "✅ Thumbnail set successfully!").await
    }

    /// Single document or album: re-upload every file with the stored thumbnail
    async fn handle_documents(
        &self,
        chat: ChatId,
        user: UserId,
        transfers: Vec<IncomingFileTransfer>,
    ) -> Result<()> {
        // Snapshot the preference once; a concurrent /setthumb applies to the next batch.
        let reference = self
            .store
            .get(user)
            .await?
            .and_then(|pref| pref.thumbnail_path)
            .ok_or(BotError::NoThumbnailConfigured)?;

        let thumbnail = Arc::new(self.preparer.prepare(&reference).await?);

        let is_batch = transfers.len() > 1;
        let report = self.processor.process(chat, thumbnail, transfers).await;

        if is_batch {
            let summary = if report.all_succeeded() {
                "✅ All files processed successfully!".to_string()
            } else {
                format!(
                    "⚠️ Processed {} of {} files; {} failed.",
                    report.succeeded(),
                    report.total(),
                    report.failed()
                )
            };
            self.reply(chat, &summary).await?;
        }
        Ok(())
    }

    /// `/cleanup`: forget the thumbnail and delete its files
    async fn cleanup(&self, chat: ChatId, user: UserId) -> Result<()> {
        let reference = self
            .store
            .get(user)
            .await?
            .and_then(|pref| pref.thumbnail_path)
            .ok_or(BotError::NothingToCleanUp)?;

        remove_thumbnail_files(Path::new(&reference)).await;
        self.store.clear(user).await?;
        info!(user_id = %user, path = %reference, "Thumbnail cleaned up");

        self.reply(chat, "✅ Thumbnail cleaned up successfully!").await
    }
}

/// Delete a stored thumbnail and its prepared copy, tolerating absence
async fn remove_thumbnail_files(reference: &Path) {
    for path in [reference.to_path_buf(), resized_path(reference)] {
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove thumbnail file"),
        }
    }
}
