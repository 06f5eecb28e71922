//! # TitleBar Component
//!
//! Top status bar: app name, the latest status message, how many images are
//! waiting in the composer, and a "↓ New" marker when the message list is
//! scrolled away from the newest message.
//!
//! Stateless. All three props come from different owners (`App`, the
//! composer, the message list) and the bar only renders what it is given.

use crate::tui::component::Component;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::Span;

pub struct TitleBar {
    pub status_message: String,
    pub pending_images: usize,
    pub has_unseen_content: bool,
}

impl TitleBar {
    pub fn new(status_message: String, pending_images: usize, has_unseen_content: bool) -> Self {
        Self {
            status_message,
            pending_images,
            has_unseen_content,
        }
    }

    fn text(&self) -> String {
        let mut parts = vec![String::from("Parley")];
        if !self.status_message.is_empty() {
            parts.push(self.status_message.clone());
        }
        match self.pending_images {
            0 => {}
            1 => parts.push(String::from("1 image attached")),
            n => parts.push(format!("{} images attached", n)),
        }
        if self.has_unseen_content {
            parts.push(String::from("↓ New"));
        }
        parts.join(" | ")
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(Span::raw(self.text()), area);
    }
}
