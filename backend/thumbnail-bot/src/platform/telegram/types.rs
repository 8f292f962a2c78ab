//! Telegram Bot API wire types (only the fields the bot reads)

use crate::handlers::Command;
use crate::models::{ChatId, FileHandle, IncomingFileTransfer, UserId};
use crate::platform::InboundEvent;
use serde::Deserialize;

/// Envelope every Bot API method answers with
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
    pub error_code: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    pub from: Option<User>,
    pub text: Option<String>,
    pub document: Option<Document>,
    pub photo: Option<Vec<PhotoSize>>,
    pub reply_to_message: Option<Box<Message>>,
    pub media_group_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Document {
    pub file_id: String,
    pub file_name: Option<String>,
    pub file_size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhotoSize {
    pub file_id: String,
    pub width: u32,
    pub height: u32,
}

/// Result of `getFile`
#[derive(Debug, Clone, Deserialize)]
pub struct File {
    pub file_id: String,
    pub file_path: Option<String>,
}

/// How a message should be routed once translated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Translated {
    Event(InboundEvent),
    /// Member of a media group; buffered until the group is complete
    GroupMember {
        group_id: String,
        chat: ChatId,
        user: UserId,
        transfer: IncomingFileTransfer,
    },
}

impl Message {
    fn largest_photo(&self) -> Option<&PhotoSize> {
        self.photo
            .as_ref()?
            .iter()
            .max_by_key(|size| u64::from(size.width) * u64::from(size.height))
    }

    fn transfer(&self) -> Option<IncomingFileTransfer> {
        let document = self.document.as_ref()?;
        Some(IncomingFileTransfer {
            remote_file_handle: FileHandle::new(document.file_id.clone()),
            declared_file_name: document
                .file_name
                .clone()
                .unwrap_or_else(|| format!("document_{}", self.message_id)),
        })
    }

    /// Translate into a router event. Non-private chats, anonymous senders and
    /// messages without a recognised command or document yield `None`.
    pub fn translate(&self) -> Option<Translated> {
        if self.chat.kind != "private" {
            return None;
        }
        let chat = ChatId(self.chat.id);
        let user = UserId(self.from.as_ref()?.id);

        if let Some(command) = self.text.as_deref().and_then(Command::parse) {
            let reply_to_photo = self
                .reply_to_message
                .as_ref()
                .and_then(|reply| reply.largest_photo())
                .map(|photo| FileHandle::new(photo.file_id.clone()));
            return Some(Translated::Event(InboundEvent::Command {
                chat,
                user,
                command,
                reply_to_photo,
            }));
        }

        let transfer = self.transfer()?;
        Some(match &self.media_group_id {
            Some(group_id) => Translated::GroupMember {
                group_id: group_id.clone(),
                chat,
                user,
                transfer,
            },
            None => Translated::Event(InboundEvent::Document {
                chat,
                user,
                transfer,
            }),
        })
    }
}
