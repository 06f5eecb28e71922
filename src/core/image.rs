//! # Image Value
//!
//! An encoded image (PNG, JPEG, ...) plus its pixel dimensions.
//!
//! The bytes are shared behind an `Arc`, so cloning an `Image` into a
//! `PendingSend` or a `ChatMessage` never copies pixel data.

use std::fmt;
use std::io::Cursor;
use std::sync::Arc;

use image::{ImageError, ImageFormat, ImageReader, RgbaImage};

/// An encoded image awaiting send or attached to a message.
#[derive(Clone, PartialEq, Eq)]
pub struct Image {
    data: Arc<[u8]>,
    width: u32,
    height: u32,
}

impl Image {
    /// Wrap already-encoded bytes, reading dimensions from the header only.
    pub fn from_encoded(data: impl Into<Arc<[u8]>>) -> Result<Self, ImageError> {
        let data = data.into();
        let (width, height) = ImageReader::new(Cursor::new(&data[..]))
            .with_guessed_format()
            .map_err(ImageError::IoError)?
            .into_dimensions()?;
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Encode raw RGBA pixels as PNG.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, ImageError> {
        let buffer: RgbaImage = RgbaImage::from_raw(width, height, pixels).ok_or_else(|| {
            ImageError::Parameter(image::error::ParameterError::from_kind(
                image::error::ParameterErrorKind::DimensionMismatch,
            ))
        })?;
        Self::encode_png(&buffer)
    }

    /// Encode an RGBA buffer as PNG.
    pub(crate) fn encode_png(buffer: &RgbaImage) -> Result<Self, ImageError> {
        let mut buf = Vec::new();
        let mut cursor = Cursor::new(&mut buf);
        buffer.write_to(&mut cursor, ImageFormat::Png)?;
        Ok(Self {
            data: Arc::from(buf),
            width: buffer.width(),
            height: buffer.height(),
        })
    }

    pub fn encoded(&self) -> &[u8] {
        &self.data
    }

    /// Size of the encoded representation in bytes.
    pub fn byte_len(&self) -> usize {
        self.data.len()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Short description for chips and bubbles, e.g. `"1600×1200 · 1.2 MB"`.
    pub fn label(&self) -> String {
        format!("{}×{} · {}", self.width, self.height, format_bytes(self.byte_len()))
    }
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Image")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// Human-readable byte count (B, KB, MB) with one decimal above a kilobyte.
pub fn format_bytes(len: usize) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    let len_f = len as f64;
    if len_f >= MB {
        format!("{:.1} MB", len_f / MB)
    } else if len_f >= KB {
        format!("{:.1} KB", len_f / KB)
    } else {
        format!("{len} B")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::solid_image;

    #[test]
    fn from_rgba_reads_back_dimensions() {
        let img = solid_image(12, 7);
        assert_eq!(img.dimensions(), (12, 7));
        assert!(img.byte_len() > 0);

        let reparsed = Image::from_encoded(img.encoded().to_vec()).unwrap();
        assert_eq!(reparsed, img);
    }

    #[test]
    fn from_rgba_rejects_short_buffer() {
        assert!(Image::from_rgba(4, 4, vec![0; 10]).is_err());
    }

    #[test]
    fn from_encoded_rejects_garbage() {
        assert!(Image::from_encoded(b"definitely not an image".to_vec()).is_err());
    }

    #[test]
    fn clones_share_bytes() {
        let img = solid_image(3, 3);
        let copy = img.clone();
        assert!(Arc::ptr_eq(&img.data, &copy.data));
    }

    #[test]
    fn format_bytes_units() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(13_000_000), "12.4 MB");
    }

    #[test]
    fn debug_omits_payload() {
        let img = solid_image(2, 2);
        let dbg = format!("{img:?}");
        assert!(dbg.contains("width: 2"));
        assert!(!dbg.contains("data"));
    }
}
