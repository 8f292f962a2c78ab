//! Chat-platform boundary
//!
//! The rest of the bot only sees [`ChatPlatform`] for outbound calls and
//! [`InboundEvent`] for inbound ones. The Telegram Bot API implementation
//! lives in [`telegram`].

pub mod telegram;

use crate::error::PlatformError;
use crate::handlers::Command;
use crate::models::{ChatId, FileHandle, IncomingFileTransfer, UserId};
use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};

/// Document re-upload request
#[derive(Debug, Clone)]
pub struct OutgoingDocument<'a> {
    pub local_path: &'a Path,
    pub thumbnail: &'a Bytes,
    pub file_name: &'a str,
    pub caption: &'a str,
}

/// Outbound operations the bot needs from the chat platform
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Fetch a remote file into local storage and return its path
    async fn download(&self, file: &FileHandle) -> Result<PathBuf, PlatformError>;

    /// Send a local file to `chat` with a custom thumbnail, name and caption
    async fn send_document(
        &self,
        chat: ChatId,
        document: OutgoingDocument<'_>,
    ) -> Result<(), PlatformError>;

    /// Send a plain text reply
    async fn send_message(&self, chat: ChatId, text: &str) -> Result<(), PlatformError>;
}

/// Event delivered to the command router
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    Command {
        chat: ChatId,
        user: UserId,
        command: Command,
        /// Largest size of the photo the command replied to, if any
        reply_to_photo: Option<FileHandle>,
    },
    Document {
        chat: ChatId,
        user: UserId,
        transfer: IncomingFileTransfer,
    },
    DocumentGroup {
        chat: ChatId,
        user: UserId,
        transfers: Vec<IncomingFileTransfer>,
    },
}

impl InboundEvent {
    pub fn chat(&self) -> ChatId {
        match self {
            InboundEvent::Command { chat, .. }
            | InboundEvent::Document { chat, .. }
            | InboundEvent::DocumentGroup { chat, .. } => *chat,
        }
    }

    pub fn user(&self) -> UserId {
        match self {
            InboundEvent::Command { user, .. }
            | InboundEvent::Document { user, .. }
            | InboundEvent::DocumentGroup { user, .. } => *user,
        }
    }
}
