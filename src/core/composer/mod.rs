//! # Composer State
//!
//! The pending half of a conversation: the draft text and the images picked
//! but not yet sent. One `ComposerState` lives for the lifetime of a chat
//! screen and is cleared (never rebuilt) after every successful send.
//!
//! ```text
//!   set_draft_text ─┐
//!   attach ─────────┤                    ┌─► Some(height) = publish to the layout
//!   remove_attachment ┼─► compute_height ─┤
//!   set_width ──────┤                    └─► None = height unchanged
//!   reset ──────────┘ (publishes collapsed height)
//!
//!   try_send ─► PendingSend ─► caller appends to MessageStore ─► reset
//! ```
//!
//! Every mutator returns the newly published height when it changed. That
//! return value is the composer's height-change signal; there is no callback
//! field to register.
//!
//! All mutation happens from one sequential owner (the TUI event loop).

pub mod measure;

use log::{debug, warn};
use thiserror::Error;

use super::image::Image;
use super::normalize::Normalizer;
use measure::wrap_line_count;

/// Default number of images a single picker session may attach.
pub const DEFAULT_SELECTION_LIMIT: usize = 100;

/// Width assumed until the first layout pass reports the real one.
const DEFAULT_WIDTH: u16 = 80;

/// Attempted send with nothing to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ComposeError {
    #[error("nothing to send: the draft is empty and no images are attached")]
    EmptyComposition,
}

/// Snapshot of the composer taken by [`ComposerState::try_send`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSend {
    pub text: String,
    pub images: Vec<Image>,
}

/// Layout constants in abstract units.
///
/// `Default` carries the point values used by touch layouts; the terminal
/// preset counts rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeightMetrics {
    /// Units per wrapped line of draft text.
    pub line_height: u16,
    /// Added to the measured text height.
    pub padding: u16,
    /// Height of the attachment strip when it is visible.
    pub strip_height: u16,
    /// Cap on the text region before it scrolls internally.
    pub max_text_height: u16,
    /// Height published by `reset`.
    pub collapsed_height: u16,
    /// Columns around the text that are unavailable for wrapping.
    pub horizontal_inset: u16,
}

impl Default for HeightMetrics {
    fn default() -> Self {
        Self {
            line_height: 20,
            padding: 15,
            strip_height: 60,
            max_text_height: 120,
            collapsed_height: 60,
            horizontal_inset: 0,
        }
    }
}

impl HeightMetrics {
    /// Row-based metrics for a bordered terminal text box: five visible
    /// lines inside a two-row border, a three-row attachment strip.
    pub fn terminal() -> Self {
        Self {
            line_height: 1,
            padding: 2,
            strip_height: 3,
            max_text_height: 7,
            collapsed_height: 3,
            horizontal_inset: 4,
        }
    }

    /// Lines of text that fit before the text region starts scrolling.
    pub fn visible_lines(&self) -> u16 {
        (self.max_text_height.saturating_sub(self.padding) / self.line_height.max(1)).max(1)
    }
}

/// Result of a height computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComposerHeight {
    pub height: u16,
    /// True when the draft is taller than the cap and scrolls inside its box.
    pub scrollable: bool,
    /// True when the attachment strip occupies part of `height`.
    pub has_strip: bool,
}

impl ComposerHeight {
    fn collapsed(metrics: &HeightMetrics) -> Self {
        Self {
            height: metrics.collapsed_height,
            scrollable: false,
            has_strip: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ComposerState {
    draft_text: String,
    pending_images: Vec<Image>,
    selection_limit: usize,
    metrics: HeightMetrics,
    normalizer: Normalizer,
    width: u16,
    height: ComposerHeight,
}

impl Default for ComposerState {
    fn default() -> Self {
        Self::new(DEFAULT_SELECTION_LIMIT, HeightMetrics::default(), Normalizer::default())
    }
}

impl ComposerState {
    /// A selection limit of zero is raised to one.
    pub fn new(selection_limit: usize, metrics: HeightMetrics, normalizer: Normalizer) -> Self {
        Self {
            draft_text: String::new(),
            pending_images: Vec::new(),
            selection_limit: selection_limit.max(1),
            metrics,
            normalizer,
            width: DEFAULT_WIDTH,
            height: ComposerHeight::collapsed(&metrics),
        }
    }

    pub fn draft_text(&self) -> &str {
        &self.draft_text
    }

    /// Read-only snapshot for the attachment strip.
    pub fn pending_images(&self) -> &[Image] {
        &self.pending_images
    }

    pub fn selection_limit(&self) -> usize {
        self.selection_limit
    }

    pub fn metrics(&self) -> &HeightMetrics {
        &self.metrics
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    /// The last published height.
    pub fn height(&self) -> ComposerHeight {
        self.height
    }

    /// Whether `try_send` would succeed right now.
    pub fn can_send(&self) -> bool {
        !self.draft_text.trim().is_empty() || !self.pending_images.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.draft_text.is_empty() && self.pending_images.is_empty()
    }

    /// Update the measuring width (e.g. after a terminal resize).
    pub fn set_width(&mut self, width: u16) -> Option<ComposerHeight> {
        if width == self.width {
            return None;
        }
        self.width = width;
        self.recompute()
    }

    pub fn set_draft_text(&mut self, text: impl Into<String>) -> Option<ComposerHeight> {
        self.draft_text = text.into();
        self.recompute()
    }

    /// Replace the pending images with a freshly picked, normalized selection.
    ///
    /// A second attach discards the first selection if it was not sent yet.
    pub fn attach(&mut self, images: Vec<Image>) -> Option<ComposerHeight> {
        let mut images = images;
        if images.len() > self.selection_limit {
            warn!(
                "Picker returned {} images, keeping the first {}",
                images.len(),
                self.selection_limit
            );
            images.truncate(self.selection_limit);
        }
        if !self.pending_images.is_empty() {
            debug!(
                "Attach replaces {} unsent image(s)",
                self.pending_images.len()
            );
        }

        self.pending_images = images
            .iter()
            .map(|image| self.normalizer.normalize(image))
            .collect();
        debug!("Composer holds {} pending image(s)", self.pending_images.len());
        self.recompute()
    }

    /// Remove one pending image. Out-of-range indices are ignored.
    pub fn remove_attachment(&mut self, index: usize) -> Option<ComposerHeight> {
        if index >= self.pending_images.len() {
            debug!(
                "Ignoring stale removal at index {} ({} pending)",
                index,
                self.pending_images.len()
            );
            return None;
        }
        self.pending_images.remove(index);
        self.recompute()
    }

    /// Measured draft height plus padding, with the strip and cap applied.
    pub fn compute_height(&self) -> ComposerHeight {
        let m = &self.metrics;
        let inner_width = self.width.saturating_sub(m.horizontal_inset);
        let lines = wrap_line_count(&self.draft_text, inner_width);
        let text_height = lines.saturating_mul(m.line_height).saturating_add(m.padding);

        let has_strip = !self.pending_images.is_empty();
        let strip = if has_strip { m.strip_height } else { 0 };
        let raw = text_height.saturating_add(strip);
        let cap = m.max_text_height.saturating_add(strip);

        ComposerHeight {
            height: raw.min(cap),
            scrollable: raw > cap,
            has_strip,
        }
    }

    /// Snapshot the composer for sending. The composer itself is untouched;
    /// call [`reset`](Self::reset) once the message is recorded.
    pub fn try_send(&self) -> Result<PendingSend, ComposeError> {
        if !self.can_send() {
            return Err(ComposeError::EmptyComposition);
        }
        Ok(PendingSend {
            text: self.draft_text.clone(),
            images: self.pending_images.clone(),
        })
    }

    /// Clear the draft and attachments and publish the collapsed height.
    pub fn reset(&mut self) -> Option<ComposerHeight> {
        self.draft_text.clear();
        self.pending_images.clear();
        self.publish(ComposerHeight::collapsed(&self.metrics))
    }

    fn recompute(&mut self) -> Option<ComposerHeight> {
        let next = self.compute_height();
        self.publish(next)
    }

    fn publish(&mut self, next: ComposerHeight) -> Option<ComposerHeight> {
        if next == self.height {
            return None;
        }
        debug!(
            "Composer height {} -> {} (scrollable={})",
            self.height.height, next.height, next.scrollable
        );
        self.height = next;
        Some(next)
    }
}
