//! Thumbnail Bot
//!
//! Chat bot that stores a per-user document thumbnail and re-uploads the
//! documents a user sends with that thumbnail attached.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod platform;
pub mod services;

// Public re-exports
pub use config::Config;
pub use error::{BotError, PlatformError, Result};
