//! Thumbnail preparer - turns a stored thumbnail into an attachable one
//!
//! Loads the stored image, shrinks it to fit the configured bounding box while
//! keeping the aspect ratio, and re-encodes it as JPEG. The result is written
//! next to the source as `<source>_resized.jpg`; the source is never touched.
//!
//! Uses `spawn_blocking` for decoding and encoding to keep the async runtime free.

use crate::error::{BotError, Result};
use crate::models::PreparedThumbnail;
use bytes::Bytes;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageOutputFormat};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::debug;

const RESIZED_SUFFIX: &str = "_resized.jpg";

/// Configuration for thumbnail preparation
#[derive(Clone, Debug)]
pub struct ThumbnailConfig {
    /// Maximum dimension (width or height) in pixels
    pub max_dimension: u32,
    /// JPEG quality (0-100)
    pub quality: u8,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            max_dimension: 320,
            quality: 85,
        }
    }
}

/// Path the prepared copy of `reference` is written to
pub fn resized_path(reference: &Path) -> PathBuf {
    let mut name = reference.as_os_str().to_os_string();
    name.push(RESIZED_SUFFIX);
    PathBuf::from(name)
}

/// Thumbnail preparer
#[derive(Clone, Debug)]
pub struct ThumbnailPreparer {
    config: ThumbnailConfig,
}

impl ThumbnailPreparer {
    pub fn new(config: ThumbnailConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(ThumbnailConfig::default())
    }

    /// Prepare the thumbnail stored at `reference` on the blocking pool
    pub async fn prepare(&self, reference: impl AsRef<Path>) -> Result<PreparedThumbnail> {
        let preparer = self.clone();
        let reference = reference.as_ref().to_path_buf();

        tokio::task::spawn_blocking(move || preparer.prepare_blocking(&reference))
            .await
            .map_err(|e| BotError::Internal(format!("Thumbnail task panicked: {e}")))?
    }

    /// Blocking version of [`prepare`](Self::prepare)
    pub fn prepare_blocking(&self, reference: &Path) -> Result<PreparedThumbnail> {
        let unreadable = |reason: String| BotError::ImageUnreadable {
            path: reference.display().to_string(),
            reason,
        };

        let original = std::fs::read(reference).map_err(|e| unreadable(e.to_string()))?;
        let img = image::load_from_memory(&original).map_err(|e| unreadable(e.to_string()))?;

        let (orig_w, orig_h) = img.dimensions();
        debug!(
            original_width = orig_w,
            original_height = orig_h,
            "Preparing thumbnail"
        );

        let (new_w, new_h) = self.calculate_dimensions(orig_w, orig_h);
        let bounded = if (new_w, new_h) == (orig_w, orig_h) {
            img
        } else {
            img.resize_exact(new_w, new_h, FilterType::Triangle)
        };

        let data = self.encode_jpeg(&bounded)?;
        let path = resized_path(reference);
        std::fs::write(&path, &data)?;

        debug!(
            width = new_w,
            height = new_h,
            size = data.len(),
            path = %path.display(),
            "Thumbnail prepared"
        );

        Ok(PreparedThumbnail {
            source_reference: reference.to_path_buf(),
            path,
            bounded_image_bytes: data,
            width: new_w,
            height: new_h,
        })
    }

    /// Fit inside the bounding box, keeping aspect ratio; never upscale
    fn calculate_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        let max_dim = self.config.max_dimension;

        if width <= max_dim && height <= max_dim {
            return (width, height);
        }

        if width > height {
            let ratio = max_dim as f32 / width as f32;
            (max_dim, (((height as f32) * ratio).round() as u32).max(1))
        } else {
            let ratio = max_dim as f32 / height as f32;
            ((((width as f32) * ratio).round() as u32).max(1), max_dim)
        }
    }

    /// Encode image as JPEG; alpha is dropped since JPEG has none
    fn encode_jpeg(&self, img: &DynamicImage) -> Result<Bytes> {
        let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
        let mut buf = Vec::new();
        let mut cursor = Cursor::new(&mut buf);

        rgb.write_to(&mut cursor, ImageOutputFormat::Jpeg(self.config.quality))
            .map_err(|e| BotError::Internal(format!("Failed to encode JPEG: {e}")))?;

        Ok(Bytes::from(buf))
    }
}
