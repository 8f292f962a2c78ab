//! Fake chat platform for integration tests
//!
//! Serves "remote" files from memory, writes downloads into a temp directory
//! and records every outbound call instead of talking to Telegram.

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use thumbnail_bot::models::{ChatId, FileHandle};
use thumbnail_bot::platform::{ChatPlatform, OutgoingDocument};
use thumbnail_bot::PlatformError;

/// A document the bot uploaded
#[derive(Debug, Clone)]
pub struct SentDocument {
    pub chat: ChatId,
    pub local_path: PathBuf,
    pub file_name: String,
    pub caption: String,
    pub thumbnail: Bytes,
    pub content_len: usize,
}

pub struct FakePlatform {
    dir: PathBuf,
    counter: AtomicUsize,
    remote_files: Mutex<HashMap<String, Vec<u8>>>,
    failing_downloads: Mutex<HashSet<String>>,
    failing_uploads: Mutex<HashSet<String>>,
    download_delays: Mutex<HashMap<String, Duration>>,
    downloads: Mutex<Vec<PathBuf>>,
    documents: Mutex<Vec<SentDocument>>,
    messages: Mutex<Vec<(ChatId, String)>>,
}

impl FakePlatform {
    pub fn new(dir: &Path) -> Self {
        std::fs::create_dir_all(dir).unwrap();
        Self {
            dir: dir.to_path_buf(),
            counter: AtomicUsize::new(0),
            remote_files: Mutex::new(HashMap::new()),
            failing_downloads: Mutex::new(HashSet::new()),
            failing_uploads: Mutex::new(HashSet::new()),
            download_delays: Mutex::new(HashMap::new()),
            downloads: Mutex::new(Vec::new()),
            documents: Mutex::new(Vec::new()),
            messages: Mutex::new(Vec::new()),
        }
    }

    /// Register content served for `file_id`
    pub fn add_remote_file(&self, file_id: &str, content: Vec<u8>) {
        self.remote_files
            .lock()
            .unwrap()
            .insert(file_id.to_string(), content);
    }

    pub fn fail_download(&self, file_id: &str) {
        self.failing_downloads
            .lock()
            .unwrap()
            .insert(file_id.to_string());
    }

    /// Reject uploads whose outgoing file name is `file_name`
    pub fn fail_upload(&self, file_name: &str) {
        self.failing_uploads
            .lock()
            .unwrap()
            .insert(file_name.to_string());
    }

    pub fn delay_download(&self, file_id: &str, delay: Duration) {
        self.download_delays
            .lock()
            .unwrap()
            .insert(file_id.to_string(), delay);
    }

    pub fn downloads(&self) -> Vec<PathBuf> {
        self.downloads.lock().unwrap().clone()
    }

    pub fn documents(&self) -> Vec<SentDocument> {
        self.documents.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .map(|(_, text)| text.clone())
            .collect()
    }

    pub fn last_message(&self) -> Option<String> {
        self.messages().last().cloned()
    }
}

#[async_trait]
impl ChatPlatform for FakePlatform {
    async fn download(&self, file: &FileHandle) -> Result<PathBuf, PlatformError> {
        let delay = self
            .download_delays
            .lock()
            .unwrap()
            .get(&file.file_id)
            .copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing_downloads.lock().unwrap().contains(&file.file_id) {
            return Err(PlatformError::Api {
                code: 400,
                description: "Bad Request: file is too big".to_string(),
            });
        }

        let content = self
            .remote_files
            .lock()
            .unwrap()
            .get(&file.file_id)
            .cloned()
            .unwrap_or_else(|| format!("remote:{}", file.file_id).into_bytes());

        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let path = self.dir.join(format!("{n}-{}", file.file_id));
        tokio::fs::write(&path, content).await?;

        self.downloads.lock().unwrap().push(path.clone());
        Ok(path)
    }

    async fn send_document(
        &self,
        chat: ChatId,
        document: OutgoingDocument<'_>,
    ) -> Result<(), PlatformError> {
        // The local copy must still exist while the upload is in flight.
        let content = tokio::fs::read(document.local_path).await?;

        if self
            .failing_uploads
            .lock()
            .unwrap()
            .contains(document.file_name)
        {
            return Err(PlatformError::Api {
                code: 413,
                description: "Request Entity Too Large".to_string(),
            });
        }

        self.documents.lock().unwrap().push(SentDocument {
            chat,
            local_path: document.local_path.to_path_buf(),
            file_name: document.file_name.to_string(),
            caption: document.caption.to_string(),
            thumbnail: document.thumbnail.clone(),
            content_len: content.len(),
        });
        Ok(())
    }

    async fn send_message(&self, chat: ChatId, text: &str) -> Result<(), PlatformError> {
        self.messages.lock().unwrap().push((chat, text.to_string()));
        Ok(())
    }
}

/// PNG of the given size, as the bytes of a "photo" on the platform
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([30, 120, 220]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(
            &mut std::io::Cursor::new(&mut buf),
            image::ImageOutputFormat::Png,
        )
        .unwrap();
    buf
}
