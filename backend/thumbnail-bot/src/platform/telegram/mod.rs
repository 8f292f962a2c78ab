//! Telegram Bot API integration
//!
//! - HTTP client implementing [`ChatPlatform`](crate::platform::ChatPlatform)
//! - Wire types and their translation into router events
//! - Long-polling loop with album (media group) buffering

pub mod client;
pub mod poller;
pub mod types;

pub use client::TelegramClient;
pub use poller::{MediaGroupBuffer, PollerConfig, UpdatePoller};
