//! Telegram Bot API client
//!
//! Speaks the HTTP Bot API with `reqwest`: long polling, file download and
//! multipart document upload with a custom thumbnail.

use super::types::{ApiResponse, File, Update};
use crate::config::{StorageConfig, TelegramConfig};
use crate::error::PlatformError;
use crate::models::{ChatId, FileHandle};
use crate::platform::{ChatPlatform, OutgoingDocument};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub struct TelegramClient {
    http_client: Client,
    api_base_url: String,
    bot_token: String,
    download_dir: PathBuf,
}

impl TelegramClient {
    pub fn new(config: &TelegramConfig, storage: &StorageConfig) -> Result<Self, PlatformError> {
        let http_client = Client::builder().timeout(config.request_timeout).build()?;

        info!(
            api_base_url = %config.api_base_url,
            api_id = config.api_id,
            download_dir = %storage.download_dir.display(),
            "Telegram client initialized"
        );

        Ok(Self {
            http_client,
            api_base_url: config.api_base_url.clone(),
            bot_token: config.bot_token.clone(),
            download_dir: storage.download_dir.clone(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base_url, self.bot_token, method)
    }

    fn file_url(&self, file_path: &str) -> String {
        format!(
            "{}/file/bot{}/{}",
            self.api_base_url,
            self.bot_token,
            file_path.trim_start_matches('/')
        )
    }

    /// Unwrap the `{ok, result}` envelope
    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, PlatformError> {
        let status = response.status();
        let body: ApiResponse<T> = response.json().await?;

        match (body.ok, body.result) {
            (true, Some(result)) => Ok(result),
            _ => Err(PlatformError::Api {
                code: body.error_code.unwrap_or(status.as_u16() as i32),
                description: body
                    .description
                    .unwrap_or_else(|| format!("request failed with status {status}")),
            }),
        }
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        payload: serde_json::Value,
    ) -> Result<T, PlatformError> {
        let response = self
            .http_client
            .post(self.method_url(method))
            .json(&payload)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Long-poll for updates after `offset`
    pub async fn get_updates(
        &self,
        offset: i64,
        timeout: Duration,
    ) -> Result<Vec<Update>, PlatformError> {
        // The HTTP request must outlive the long-poll window.
        let response = self
            .http_client
            .post(self.method_url("getUpdates"))
            .timeout(timeout + Duration::from_secs(10))
            .json(&json!({
                "offset": offset,
                "timeout": timeout.as_secs(),
                "allowed_updates": ["message"],
            }))
            .send()
            .await?;

        Self::parse_response(response).await
    }

    async fn get_file(&self, file: &FileHandle) -> Result<File, PlatformError> {
        self.call("getFile", json!({ "file_id": file.file_id })).await
    }

    fn local_target(&self, remote_path: &str) -> PathBuf {
        let extension = Path::new(remote_path)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{ext}"))
            .unwrap_or_default();
        self.download_dir
            .join(format!("{}{}", Uuid::new_v4(), extension))
    }

    async fn stream_to_file(&self, url: &str, target: &Path) -> Result<u64, PlatformError> {
        let mut response = self.http_client.get(url).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            return Err(PlatformError::Api {
                code: status.as_u16() as i32,
                description: format!("file download failed with status {status}"),
            });
        }

        let mut file = tokio::fs::File::create(target).await?;
        let mut written = 0u64;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        Ok(written)
    }
}

#[async_trait]
impl ChatPlatform for TelegramClient {
    async fn download(&self, file: &FileHandle) -> Result<PathBuf, PlatformError> {
        let remote = self.get_file(file).await?;
        let remote_path = remote
            .file_path
            .ok_or_else(|| PlatformError::MissingFilePath(remote.file_id.clone()))?;

        tokio::fs::create_dir_all(&self.download_dir).await?;
        let target = self.local_target(&remote_path);

        // A Bot API server in --local mode hands out absolute paths on its own disk.
        let result = if Path::new(&remote_path).is_absolute() {
            tokio::fs::copy(&remote_path, &target)
                .await
                .map_err(PlatformError::from)
        } else {
            self.stream_to_file(&self.file_url(&remote_path), &target)
                .await
        };

        match result {
            Ok(size) => {
                debug!(file_id = %file.file_id, path = %target.display(), size, "File downloaded");
                Ok(target)
            }
            Err(e) => {
                if let Err(remove_err) = tokio::fs::remove_file(&target).await {
                    if remove_err.kind() != std::io::ErrorKind::NotFound {
                        warn!(path = %target.display(), error = %remove_err, "Failed to remove partial download");
                    }
                }
                Err(e)
            }
        }
    }

    async fn send_document(
        &self,
        chat: ChatId,
        document: OutgoingDocument<'_>,
    ) -> Result<(), PlatformError> {
        // Streamed from disk so concurrent uploads never hold whole files in memory.
        let file = tokio::fs::File::open(document.local_path).await?;
        let size = file.metadata().await?.len();
        let body = Body::wrap_stream(ReaderStream::new(file));

        let form = Form::new()
            .text("chat_id", chat.0.to_string())
            .text("caption", document.caption.to_string())
            .text("parse_mode", "HTML")
            .part(
                "document",
                Part::stream_with_length(body, size).file_name(document.file_name.to_string()),
            )
            .part(
                "thumbnail",
                Part::bytes(document.thumbnail.to_vec())
                    .file_name("thumbnail.jpg")
                    .mime_str("image/jpeg")?,
            );

        let response = self
            .http_client
            .post(self.method_url("sendDocument"))
            .multipart(form)
            .send()
            .await?;
        let _: serde_json::Value = Self::parse_response(response).await?;

        info!(chat_id = %chat, file_name = %document.file_name, size, "Document sent");
        Ok(())
    }

    async fn send_message(&self, chat: ChatId, text: &str) -> Result<(), PlatformError> {
        let _: serde_json::Value = self
            .call("sendMessage", json!({ "chat_id": chat.0, "text": text }))
            .await?;
        Ok(())
    }
}
