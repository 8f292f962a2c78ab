//! Thumbnail preparation
//!
//! Shrinks a user's stored thumbnail to the platform's attachment bounds.

pub mod processor;

pub use processor::{resized_path, ThumbnailConfig, ThumbnailPreparer};
