//! # Image Normalizer
//!
//! Bounds the byte footprint of attached images before they enter the
//! composer. Small images pass through untouched; anything at or above the
//! byte threshold is proportionally downscaled into a bounding box and
//! re-encoded as 8-bit RGBA PNG.
//!
//! Normalization never fails from the caller's point of view: if decoding or
//! re-encoding goes wrong, the original image is returned and a warning is
//! logged.

use image::imageops::FilterType;
use log::{debug, warn};
use thiserror::Error;

use super::image::Image;

pub const DEFAULT_BYTE_THRESHOLD: usize = 13_000_000;
pub const DEFAULT_MAX_WIDTH: u32 = 1600;
pub const DEFAULT_MAX_HEIGHT: u32 = 1600;

/// Internal failure while downscaling. Recovered inside [`Normalizer::normalize`].
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),
    #[error("failed to re-encode image: {0}")]
    Encode(#[source] image::ImageError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Normalizer {
    /// Images whose encoded size is below this pass through unchanged.
    pub byte_threshold: usize,
    pub max_width: u32,
    pub max_height: u32,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self {
            byte_threshold: DEFAULT_BYTE_THRESHOLD,
            max_width: DEFAULT_MAX_WIDTH,
            max_height: DEFAULT_MAX_HEIGHT,
        }
    }
}

impl Normalizer {
    pub fn new(byte_threshold: usize, max_width: u32, max_height: u32) -> Self {
        Self {
            byte_threshold,
            max_width,
            max_height,
        }
    }

    /// Return `image` unchanged if it is small enough, otherwise a downscaled copy.
    pub fn normalize(&self, image: &Image) -> Image {
        if image.byte_len() < self.byte_threshold {
            return image.clone();
        }

        match self.downscale(image) {
            Ok(scaled) => {
                debug!(
                    "Normalized image {}x{} ({} bytes) -> {}x{} ({} bytes)",
                    image.width(),
                    image.height(),
                    image.byte_len(),
                    scaled.width(),
                    scaled.height(),
                    scaled.byte_len()
                );
                scaled
            }
            Err(e) => {
                warn!("Image normalization failed, keeping original: {}", e);
                image.clone()
            }
        }
    }

    fn downscale(&self, image: &Image) -> Result<Image, NormalizeError> {
        let decoded = image::load_from_memory(image.encoded()).map_err(NormalizeError::Decode)?;
        let original = (decoded.width(), decoded.height());
        let (width, height) = scaled_size(original, (self.max_width, self.max_height));

        let rgba = if (width, height) == original {
            decoded.to_rgba8()
        } else {
            decoded
                .resize_exact(width, height, FilterType::Triangle)
                .to_rgba8()
        };

        Image::encode_png(&rgba).map_err(NormalizeError::Encode)
    }
}

/// Fit `original` inside `bounds`, preserving aspect ratio. Never upscales.
///
/// Degenerate inputs (any zero dimension) are returned unchanged.
pub fn scaled_size(original: (u32, u32), bounds: (u32, u32)) -> (u32, u32) {
    let (orig_w, orig_h) = original;
    let (max_w, max_h) = bounds;
    if orig_w == 0 || orig_h == 0 || max_w == 0 || max_h == 0 {
        return original;
    }

    let scale_w = max_w as f64 / orig_w as f64;
    let scale_h = max_h as f64 / orig_h as f64;
    let scale = scale_w.min(scale_h).min(1.0);

    let width = ((orig_w as f64 * scale).round() as u32).clamp(1, max_w.max(1));
    let height = ((orig_h as f64 * scale).round() as u32).clamp(1, max_h.max(1));
    (width.min(orig_w), height.min(orig_h))
}
