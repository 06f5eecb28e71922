//! # Composer Component
//!
//! The input region: a growing text box and, when images are pending, the
//! attachment strip above it. Wraps the core `ComposerState` and turns
//! terminal events into state transitions.
//!
//! ## Delegate events
//!
//! The parent never reaches into the composer to ask what happened; every
//! interesting change comes back from `handle_event` as a [`ComposerEvent`]:
//!
//! - `HeightChanged`: relayout; the composer now wants a different height
//! - `Send`: the user pressed Enter on a sendable draft
//! - `OpenPicker`: Ctrl+O
//! - `ContentChanged`: draft or strip changed without affecting height
//!
//! ## Focus
//!
//! Two independent input surfaces share the one `ComposerState`: the text box
//! and the strip. Tab toggles between them (only while images are pending).

mod cursor;
mod motion;
mod strip;

use log::debug;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{
    Block, BorderType, Padding, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState,
};

use crate::core::composer::measure::{wrap_line_count, wrap_options};
use crate::core::composer::{ComposerHeight, ComposerState, PendingSend};
use crate::core::image::Image;
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

use cursor::CursorState;
use motion::{next_char_boundary, next_word_boundary, prev_char_boundary, prev_word_boundary};
use strip::StripState;

#[derive(Debug, Clone, PartialEq)]
pub enum ComposerEvent {
    HeightChanged(ComposerHeight),
    Send(PendingSend),
    OpenPicker,
    ContentChanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Text,
    Strip,
}

pub struct Composer {
    state: ComposerState,
    cursor: CursorState,
    strip: StripState,
    focus: Focus,
}

impl Composer {
    pub fn new(state: ComposerState) -> Self {
        let metrics = *state.metrics();
        Self {
            state,
            cursor: CursorState::new(metrics.horizontal_inset, metrics.visible_lines()),
            strip: StripState::default(),
            focus: Focus::Text,
        }
    }

    pub fn state(&self) -> &ComposerState {
        &self.state
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    /// Rows the composer wants in the layout (the last published height).
    pub fn height(&self) -> u16 {
        self.state.height().height
    }

    pub fn set_width(&mut self, width: u16) -> Option<ComposerHeight> {
        self.state.set_width(width)
    }

    /// Picker completion.
    pub fn attach(&mut self, images: Vec<Image>) -> Option<ComposerHeight> {
        self.strip.reset();
        self.state.attach(images)
    }

    /// Clear everything after the parent recorded a send.
    pub fn reset(&mut self) -> Option<ComposerHeight> {
        self.cursor.reset();
        self.strip.reset();
        self.focus = Focus::Text;
        self.state.reset()
    }

    fn edit(&mut self, edit: impl FnOnce(&mut String, &mut usize)) -> Option<ComposerEvent> {
        let mut text = self.state.draft_text().to_string();
        let mut pos = self.cursor.pos;
        edit(&mut text, &mut pos);
        self.cursor.pos = pos;
        Some(match self.state.set_draft_text(text) {
            Some(height) => ComposerEvent::HeightChanged(height),
            None => ComposerEvent::ContentChanged,
        })
    }

    fn remove(&mut self, index: usize) -> Option<ComposerEvent> {
        let changed = self.state.remove_attachment(index);
        let count = self.state.pending_images().len();
        self.strip.clamp(count);
        if count == 0 {
            self.focus = Focus::Text;
        }
        Some(match changed {
            Some(height) => ComposerEvent::HeightChanged(height),
            None => ComposerEvent::ContentChanged,
        })
    }

    fn send(&self) -> Option<ComposerEvent> {
        match self.state.try_send() {
            Ok(pending) => Some(ComposerEvent::Send(pending)),
            Err(e) => {
                debug!("Send ignored: {}", e);
                None
            }
        }
    }

    fn handle_text_event(&mut self, event: &TuiEvent) -> Option<ComposerEvent> {
        let draft = self.state.draft_text();
        let pos = self.cursor.pos;
        match event {
            TuiEvent::InputChar(c) => {
                let c = *c;
                self.edit(|text, pos| {
                    text.insert(*pos, c);
                    *pos += c.len_utf8();
                })
            }
            TuiEvent::Paste(pasted) => self.edit(|text, pos| {
                text.insert_str(*pos, pasted);
                *pos += pasted.len();
            }),
            TuiEvent::Backspace if pos > 0 => {
                let prev = prev_char_boundary(draft, pos);
                self.edit(|text, pos| {
                    text.drain(prev..*pos);
                    *pos = prev;
                })
            }
            TuiEvent::Delete if pos < draft.len() => {
                let next = next_char_boundary(draft, pos);
                self.edit(|text, pos| {
                    text.drain(*pos..next);
                })
            }
            TuiEvent::CursorLeft if pos > 0 => {
                self.cursor.pos = prev_char_boundary(draft, pos);
                None
            }
            TuiEvent::CursorRight if pos < draft.len() => {
                self.cursor.pos = next_char_boundary(draft, pos);
                None
            }
            TuiEvent::WordLeft => {
                self.cursor.pos = prev_word_boundary(draft, pos);
                None
            }
            TuiEvent::WordRight => {
                self.cursor.pos = next_word_boundary(draft, pos);
                None
            }
            TuiEvent::CursorHome => {
                self.cursor.pos = draft[..pos].rfind('\n').map(|i| i + 1).unwrap_or(0);
                None
            }
            TuiEvent::CursorEnd => {
                self.cursor.pos = draft[pos..]
                    .find('\n')
                    .map(|i| pos + i)
                    .unwrap_or(draft.len());
                None
            }
            TuiEvent::CursorUp => {
                let width = self.state.width();
                self.cursor.move_vertically(self.state.draft_text(), -1, width);
                None
            }
            TuiEvent::CursorDown => {
                let width = self.state.width();
                self.cursor.move_vertically(self.state.draft_text(), 1, width);
                None
            }
            _ => None,
        }
    }

    fn handle_strip_event(&mut self, event: &TuiEvent) -> Option<ComposerEvent> {
        let count = self.state.pending_images().len();
        match event {
            TuiEvent::CursorLeft => {
                self.strip.select_prev();
                None
            }
            TuiEvent::CursorRight => {
                self.strip.select_next(count);
                None
            }
            TuiEvent::Backspace | TuiEvent::Delete => self.remove(self.strip.selected),
            TuiEvent::Escape => {
                self.focus = Focus::Text;
                None
            }
            // Typing goes back to the text box
            TuiEvent::InputChar(_) | TuiEvent::Paste(_) => {
                self.focus = Focus::Text;
                self.handle_text_event(event)
            }
            _ => None,
        }
    }

    fn render_text_box(&mut self, frame: &mut Frame, area: Rect) {
        self.cursor.update_scroll_offset(self.state.draft_text(), area.width);

        let focused = self.focus == Focus::Text;
        let border_style = if focused {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let hint = if self.state.pending_images().is_empty() {
            " Enter send · Ctrl+J newline · Ctrl+O attach "
        } else {
            " Enter send · Tab attachments · Ctrl+O replace "
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title(" Message ")
            .title_bottom(Line::from(hint).right_aligned())
            .padding(Padding::horizontal(1));

        let input = Paragraph::new(self.visible_text(area.width))
            .block(block)
            .style(Style::default().fg(Color::Green));
        frame.render_widget(input, area);
        self.render_scrollbar(frame, area);

        if focused {
            frame.set_cursor_position(self.cursor.screen_pos(self.state.draft_text(), area));
        }
    }

    /// The wrapped lines inside the current scroll window.
    fn visible_text(&self, content_width: u16) -> String {
        let width = self.cursor.inner_width(content_width);
        if width == 0 {
            return String::new();
        }
        let lines = textwrap::wrap(self.state.draft_text(), wrap_options(width));
        let start = (self.cursor.scroll_offset as usize).min(lines.len());
        let end = (start + self.cursor.visible_lines() as usize).min(lines.len());
        lines[start..end].join("\n")
    }

    fn render_scrollbar(&self, frame: &mut Frame, area: Rect) {
        let width = self.cursor.inner_width(area.width);
        let total_lines = wrap_line_count(self.state.draft_text(), width);
        let visible = self.cursor.visible_lines();
        if total_lines <= visible {
            return;
        }

        // content_length is the max scroll position, not the line count
        let mut scrollbar_state = ScrollbarState::default()
            .content_length(total_lines.saturating_sub(visible) as usize)
            .position(self.cursor.scroll_offset as usize);

        let scrollbar_area = Rect {
            x: area.x + area.width.saturating_sub(1),
            y: area.y + 1,
            width: 1,
            height: area.height.saturating_sub(2),
        };
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            scrollbar_area,
            &mut scrollbar_state,
        );
    }
}

impl Component for Composer {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let height = self.state.height();
        if height.has_strip {
            let strip_height = self.state.metrics().strip_height;
            let [strip_area, text_area] =
                Layout::vertical([Constraint::Length(strip_height), Constraint::Min(0)])
                    .areas(area);
            let focused = self.focus == Focus::Strip;
            self.strip
                .render(frame, strip_area, self.state.pending_images(), focused);
            self.render_text_box(frame, text_area);
        } else {
            self.render_text_box(frame, area);
        }
    }
}

impl EventHandler for Composer {
    type Event = ComposerEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::Submit => return self.send(),
            TuiEvent::OpenPicker => return Some(ComposerEvent::OpenPicker),
            TuiEvent::FocusNext => {
                self.focus = match self.focus {
                    Focus::Text if !self.state.pending_images().is_empty() => Focus::Strip,
                    _ => Focus::Text,
                };
                return None;
            }
            TuiEvent::MouseClick(column, row) => {
                if let Some(index) = self.strip.hit_close(*column, *row) {
                    return self.remove(index);
                }
                if let Some(index) = self.strip.hit_chip(*column, *row) {
                    self.strip.selected = index;
                    self.focus = Focus::Strip;
                }
                return None;
            }
            _ => {}
        }

        match self.focus {
            Focus::Text => self.handle_text_event(event),
            Focus::Strip => self.handle_strip_event(event),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::composer::HeightMetrics;
    use crate::test_support::{composer, solid_image};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn terminal_composer() -> Composer {
        Composer::new(composer(HeightMetrics::terminal()))
    }

    fn type_str(c: &mut Composer, s: &str) {
        for ch in s.chars() {
            c.handle_event(&TuiEvent::InputChar(ch));
        }
    }

    #[test]
    fn typing_updates_draft() {
        let mut c = terminal_composer();
        assert_eq!(
            c.handle_event(&TuiEvent::InputChar('h')),
            Some(ComposerEvent::ContentChanged)
        );
        type_str(&mut c, "ey");
        assert_eq!(c.state().draft_text(), "hey");

        c.handle_event(&TuiEvent::CursorLeft);
        c.handle_event(&TuiEvent::Backspace);
        assert_eq!(c.state().draft_text(), "hy");
        c.handle_event(&TuiEvent::Delete);
        assert_eq!(c.state().draft_text(), "h");
    }

    #[test]
    fn word_motions_edit_at_word_edges() {
        let mut c = terminal_composer();
        type_str(&mut c, "héllo wörld");

        c.handle_event(&TuiEvent::WordLeft);
        type_str(&mut c, "big ");
        assert_eq!(c.state().draft_text(), "héllo big wörld");

        c.handle_event(&TuiEvent::WordLeft);
        c.handle_event(&TuiEvent::WordLeft);
        c.handle_event(&TuiEvent::WordRight);
        c.handle_event(&TuiEvent::Backspace);
        assert_eq!(c.state().draft_text(), "héll big wörld");
    }

    #[test]
    fn newline_grows_height() {
        let mut c = terminal_composer();
        type_str(&mut c, "a");
        let event = c.handle_event(&TuiEvent::InputChar('\n'));
        assert!(matches!(event, Some(ComposerEvent::HeightChanged(h)) if h.height == 4));
        assert_eq!(c.height(), 4);
    }

    #[test]
    fn submit_empty_is_noop() {
        let mut c = terminal_composer();
        assert_eq!(c.handle_event(&TuiEvent::Submit), None);
        type_str(&mut c, "   ");
        assert_eq!(c.handle_event(&TuiEvent::Submit), None);
    }

    #[test]
    fn submit_emits_snapshot_without_clearing() {
        let mut c = terminal_composer();
        type_str(&mut c, "Hello");
        let event = c.handle_event(&TuiEvent::Submit);
        assert_eq!(
            event,
            Some(ComposerEvent::Send(PendingSend {
                text: "Hello".into(),
                images: vec![]
            }))
        );
        // Cleared only when the parent confirms the send
        assert_eq!(c.state().draft_text(), "Hello");
        c.reset();
        assert_eq!(c.state().draft_text(), "");
        assert_eq!(c.height(), 3);
    }

    #[test]
    fn ctrl_o_is_delegated() {
        let mut c = terminal_composer();
        assert_eq!(
            c.handle_event(&TuiEvent::OpenPicker),
            Some(ComposerEvent::OpenPicker)
        );
    }

    #[test]
    fn tab_only_focuses_strip_with_images() {
        let mut c = terminal_composer();
        c.handle_event(&TuiEvent::FocusNext);
        assert_eq!(c.focus(), Focus::Text);

        c.attach(vec![solid_image(1, 1)]);
        c.handle_event(&TuiEvent::FocusNext);
        assert_eq!(c.focus(), Focus::Strip);
        c.handle_event(&TuiEvent::FocusNext);
        assert_eq!(c.focus(), Focus::Text);
    }

    #[test]
    fn strip_removal_by_keyboard() {
        let mut c = terminal_composer();
        let imgs: Vec<Image> = (1..=3).map(|n| solid_image(n, n)).collect();
        assert_eq!(c.attach(imgs.clone()).map(|h| h.height), Some(6));

        c.handle_event(&TuiEvent::FocusNext);
        c.handle_event(&TuiEvent::CursorRight);
        assert_eq!(
            c.handle_event(&TuiEvent::Backspace),
            Some(ComposerEvent::ContentChanged)
        );
        assert_eq!(c.state().pending_images(), &[imgs[0].clone(), imgs[2].clone()]);

        c.handle_event(&TuiEvent::Delete);
        let last = c.handle_event(&TuiEvent::Delete);
        assert!(matches!(last, Some(ComposerEvent::HeightChanged(h)) if !h.has_strip));
        assert_eq!(c.focus(), Focus::Text);
    }

    #[test]
    fn typing_in_strip_returns_to_text() {
        let mut c = terminal_composer();
        c.attach(vec![solid_image(1, 1)]);
        c.handle_event(&TuiEvent::FocusNext);
        c.handle_event(&TuiEvent::InputChar('x'));
        assert_eq!(c.focus(), Focus::Text);
        assert_eq!(c.state().draft_text(), "x");
    }

    #[test]
    fn click_on_close_mark_removes_chip() {
        let mut c = terminal_composer();
        c.attach(vec![solid_image(1, 1), solid_image(2, 2)]);

        let backend = TestBackend::new(80, 6);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| c.render(f, f.area())).unwrap();

        // Find the first close mark on the strip's content row
        let buffer = terminal.backend().buffer();
        let close_x = (0..80)
            .find(|&x| buffer[(x, 1)].symbol() == "✕")
            .unwrap();

        c.handle_event(&TuiEvent::MouseClick(close_x, 1));
        assert_eq!(c.state().pending_images(), &[solid_image(2, 2)]);
    }

    #[test]
    fn renders_hint_and_text() {
        let mut c = terminal_composer();
        type_str(&mut c, "draft");
        let backend = TestBackend::new(60, 3);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| c.render(f, f.area())).unwrap();

        let text = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>();
        assert!(text.contains("Message"));
        assert!(text.contains("draft"));
        assert!(text.contains("Enter send"));
    }
}
