//! Single-shot capture from a live device.
//!
//! The shipped device is the system clipboard: "capturing" takes whatever
//! image is on it right now (a screenshot, a copied photo).

use async_trait::async_trait;
use log::{info, warn};
use thiserror::Error;

use crate::attachment::source::{AttachmentSource, PickerOutcome};
use crate::core::image::Image;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("capture device unavailable")]
    Unavailable,
    #[error("nothing to capture")]
    NoImage,
    #[error("clipboard error: {0}")]
    Clipboard(String),
    #[error("failed to encode captured image: {0}")]
    Encode(#[from] image::ImageError),
    #[error("capture task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// A device that yields one image per capture.
#[async_trait]
pub trait CaptureDevice: Send + Sync {
    fn name(&self) -> &str;

    /// Checked before the source is offered in the picker menu.
    fn is_available(&self) -> bool;

    async fn capture(&self) -> Result<Image, CaptureError>;
}

/// Reads the current image from the OS clipboard via `arboard`.
pub struct ClipboardDevice {
    available: bool,
}

impl ClipboardDevice {
    /// Open the clipboard once; headless sessions report unavailable.
    pub fn detect() -> Self {
        let available = match arboard::Clipboard::new() {
            Ok(_) => true,
            Err(e) => {
                info!("Clipboard capture unavailable: {}", e);
                false
            }
        };
        Self { available }
    }
}

#[async_trait]
impl CaptureDevice for ClipboardDevice {
    fn name(&self) -> &str {
        "clipboard"
    }

    fn is_available(&self) -> bool {
        self.available
    }

    async fn capture(&self) -> Result<Image, CaptureError> {
        if !self.available {
            return Err(CaptureError::Unavailable);
        }
        // arboard talks to the display server synchronously
        tokio::task::spawn_blocking(read_clipboard_image).await?
    }
}

fn read_clipboard_image() -> Result<Image, CaptureError> {
    let mut clipboard =
        arboard::Clipboard::new().map_err(|e| CaptureError::Clipboard(e.to_string()))?;
    let data = clipboard.get_image().map_err(|e| match e {
        arboard::Error::ContentNotAvailable => CaptureError::NoImage,
        other => CaptureError::Clipboard(other.to_string()),
    })?;
    let image = Image::from_rgba(
        data.width as u32,
        data.height as u32,
        data.bytes.into_owned(),
    )?;
    Ok(image)
}

/// Requests exactly one image from a capture device.
pub struct CaptureSource<D> {
    device: D,
}

impl<D: CaptureDevice> CaptureSource<D> {
    pub fn new(device: D) -> Self {
        Self { device }
    }
}

#[async_trait]
impl<D: CaptureDevice> AttachmentSource for CaptureSource<D> {
    fn name(&self) -> &str {
        self.device.name()
    }

    fn is_available(&self) -> bool {
        self.device.is_available()
    }

    async fn request(&self, limit: usize) -> PickerOutcome {
        if limit == 0 {
            return PickerOutcome::Cancelled;
        }
        if !self.device.is_available() {
            info!("Capture requested but {} is unavailable", self.device.name());
            return PickerOutcome::Cancelled;
        }
        match self.device.capture().await {
            Ok(image) => {
                info!("Captured {} from {}", image.label(), self.device.name());
                PickerOutcome::Selected(vec![image])
            }
            Err(e) => {
                warn!("Capture from {} failed: {}", self.device.name(), e);
                PickerOutcome::Cancelled
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::solid_image;

    struct FakeDevice {
        available: bool,
        image: Option<Image>,
    }

    #[async_trait]
    impl CaptureDevice for FakeDevice {
        fn name(&self) -> &str {
            "fake"
        }

        fn is_available(&self) -> bool {
            self.available
        }

        async fn capture(&self) -> Result<Image, CaptureError> {
            self.image.clone().ok_or(CaptureError::NoImage)
        }
    }

    #[tokio::test]
    async fn capture_yields_exactly_one_image() {
        let img = solid_image(3, 3);
        let source = CaptureSource::new(FakeDevice {
            available: true,
            image: Some(img.clone()),
        });
        assert_eq!(source.request(5).await, PickerOutcome::Selected(vec![img]));
    }

    #[tokio::test]
    async fn unavailable_device_is_cancelled() {
        let source = CaptureSource::new(FakeDevice {
            available: false,
            image: Some(solid_image(1, 1)),
        });
        assert!(!source.is_available());
        assert_eq!(source.request(1).await, PickerOutcome::Cancelled);
    }

    #[tokio::test]
    async fn device_error_is_cancelled() {
        let source = CaptureSource::new(FakeDevice {
            available: true,
            image: None,
        });
        assert_eq!(source.request(1).await, PickerOutcome::Cancelled);
    }

    #[test]
    fn zero_limit_is_cancelled() {
        let source = CaptureSource::new(FakeDevice {
            available: true,
            image: Some(solid_image(1, 1)),
        });
        assert_eq!(
            tokio_test::block_on(source.request(0)),
            PickerOutcome::Cancelled
        );
    }
}
