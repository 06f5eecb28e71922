use async_trait::async_trait;
use log::warn;

use crate::core::image::Image;

/// How a picker session ended. Failures of any kind collapse to `Cancelled`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerOutcome {
    /// Non-empty, at most the requested limit.
    Selected(Vec<Image>),
    Cancelled,
}

impl PickerOutcome {
    /// Build an outcome from whatever loaded: truncated to `limit`, empty
    /// means `Cancelled`.
    pub fn from_images(mut images: Vec<Image>, limit: usize) -> Self {
        if images.len() > limit {
            warn!(
                "Source produced {} images for a limit of {}, truncating",
                images.len(),
                limit
            );
            images.truncate(limit);
        }
        if images.is_empty() {
            PickerOutcome::Cancelled
        } else {
            PickerOutcome::Selected(images)
        }
    }

    pub fn len(&self) -> usize {
        match self {
            PickerOutcome::Selected(images) => images.len(),
            PickerOutcome::Cancelled => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Something that can hand the composer a batch of images.
///
/// Implementations never fail: device errors, denials, and empty results
/// all complete with [`PickerOutcome::Cancelled`].
#[async_trait]
pub trait AttachmentSource: Send + Sync {
    /// Returns the name of the source.
    fn name(&self) -> &str;

    /// Whether the source can be offered right now.
    fn is_available(&self) -> bool {
        true
    }

    /// Run one acquisition session for up to `limit` images.
    async fn request(&self, limit: usize) -> PickerOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::solid_image;

    #[test]
    fn from_images_empty_is_cancelled() {
        assert_eq!(PickerOutcome::from_images(vec![], 5), PickerOutcome::Cancelled);
    }

    #[test]
    fn from_images_truncates_to_limit() {
        let imgs: Vec<Image> = (1..=4).map(|n| solid_image(n, 1)).collect();
        let outcome = PickerOutcome::from_images(imgs.clone(), 2);
        assert_eq!(outcome, PickerOutcome::Selected(imgs[..2].to_vec()));
        assert_eq!(outcome.len(), 2);
    }

    #[test]
    fn from_images_zero_limit_is_cancelled() {
        let outcome = PickerOutcome::from_images(vec![solid_image(1, 1)], 0);
        assert!(outcome.is_empty());
        assert_eq!(outcome, PickerOutcome::Cancelled);
    }
}
