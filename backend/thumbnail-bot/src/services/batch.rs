//! Batch file processor - re-uploads incoming documents with the user's thumbnail
//!
//! Every transfer in a batch runs on its own task:
//! 1. Download the document to local storage
//! 2. Upload it back to the chat with the prepared thumbnail attached
//! 3. Remove the local copy, whatever happened in step 2
//!
//! One transfer failing never cancels or delays the others. Nothing is retried.

use crate::error::{BotError, Result};
use crate::models::{ChatId, FileHandle, IncomingFileTransfer, PreparedThumbnail};
use crate::platform::{ChatPlatform, OutgoingDocument};
use crate::services::local_file::LocalFile;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Terminal state of one transfer
#[derive(Debug)]
pub struct FileOutcome {
    pub file_name: String,
    pub result: Result<()>,
}

/// Per-file outcomes, in input order
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.succeeded()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed() == 0
    }
}

/// Caption attached to every re-uploaded document
pub fn caption_for(file_name: &str) -> String {
    format!(
        "✅ File updated with thumbnail:\n<b>{}</b>",
        escape_html(file_name)
    )
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[derive(Clone)]
pub struct BatchFileProcessor {
    platform: Arc<dyn ChatPlatform>,
}

impl BatchFileProcessor {
    pub fn new(platform: Arc<dyn ChatPlatform>) -> Self {
        Self { platform }
    }

    /// Process every transfer concurrently and wait for all of them.
    ///
    /// Failures are replied to the user as they happen; the returned report
    /// lets the caller send a batch-level summary.
    pub async fn process(
        &self,
        chat: ChatId,
        thumbnail: Arc<PreparedThumbnail>,
        transfers: Vec<IncomingFileTransfer>,
    ) -> BatchReport {
        info!(chat_id = %chat, files = transfers.len(), "Processing file batch");

        let handles: Vec<_> = transfers
            .into_iter()
            .map(|transfer| {
                let processor = self.clone();
                let thumbnail = thumbnail.clone();
                let file_name = transfer.declared_file_name.clone();
                let handle = tokio::spawn(async move {
                    processor.process_one(chat, &thumbnail, transfer).await
                });
                (file_name, handle)
            })
            .collect();

        let mut report = BatchReport {
            outcomes: Vec::with_capacity(handles.len()),
        };
        for (file_name, handle) in handles {
            let result = match handle.await {
                Ok(r) => r,
                Err(e) => {
                    let err = BotError::Internal(format!("File task panicked: {e}"));
                    self.reply(chat, &err.user_message()).await;
                    Err(err)
                }
            };
            report.outcomes.push(FileOutcome { file_name, result });
        }

        info!(
            chat_id = %chat,
            succeeded = report.succeeded(),
            failed = report.failed(),
            "File batch finished"
        );
        report
    }

    async fn process_one(
        &self,
        chat: ChatId,
        thumbnail: &PreparedThumbnail,
        transfer: IncomingFileTransfer,
    ) -> Result<()> {
        let file_name = transfer.declared_file_name;
        let result = self
            .download_and_upload(chat, thumbnail, &transfer.remote_file_handle, &file_name)
            .await;

        if let Err(e) = &result {
            warn!(chat_id = %chat, file_name = %file_name, error = %e, "File processing failed");
            self.reply(chat, &e.user_message()).await;
        }
        result
    }

    async fn download_and_upload(
        &self,
        chat: ChatId,
        thumbnail: &PreparedThumbnail,
        handle: &FileHandle,
        file_name: &str,
    ) -> Result<()> {
        self.reply(chat, &format!("⏳ Downloading {file_name}...")).await;

        let local = LocalFile::new(self.platform.download(handle).await.map_err(|source| {
            BotError::DownloadFailed {
                file_name: file_name.to_string(),
                source,
            }
        })?);

        self.reply(chat, &format!("✅ {file_name} downloaded successfully!"))
            .await;
        self.reply(
            chat,
            &format!("⏳ Uploading {file_name} with the custom thumbnail..."),
        )
        .await;

        let caption = caption_for(file_name);
        self.platform
            .send_document(
                chat,
                OutgoingDocument {
                    local_path: local.path(),
                    thumbnail: &thumbnail.bounded_image_bytes,
                    file_name,
                    caption: &caption,
                },
            )
            .await
            .map_err(|source| BotError::UploadFailed {
                file_name: file_name.to_string(),
                source,
            })?;

        debug!(chat_id = %chat, file_name = %file_name, "File re-uploaded with thumbnail");
        Ok(())
    }

    async fn reply(&self, chat: ChatId, text: &str) {
        if let Err(e) = self.platform.send_message(chat, text).await {
            warn!(chat_id = %chat, error = %e, "Failed to send reply");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caption_escapes_markup() {
        assert_eq!(
            caption_for("a<b>&c.txt"),
            "✅ File updated with thumbnail:\n<b>a&lt;b&gt;&amp;c.txt</b>"
        );
    }

    #[test]
    fn test_report_counts() {
        let report = BatchReport {
            outcomes: vec![
                FileOutcome {
                    file_name: "a".into(),
                    result: Ok(()),
                },
                FileOutcome {
                    file_name: "b".into(),
                    result: Err(BotError::Internal("x".into())),
                },
            ],
        };
        assert_eq!(report.total(), 2);
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 1);
        assert!(!report.all_succeeded());
    }
}
