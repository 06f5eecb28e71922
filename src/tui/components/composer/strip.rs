//! Horizontally scrolling row of pending-image chips.
//!
//! The strip never owns images: it renders a read-only snapshot of
//! `ComposerState::pending_images` and reports which index the user wants
//! removed. Chip rects from the last render are kept for mouse hit testing.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::core::image::Image;

const CLOSE_MARK: &str = "✕";
const CHIP_GAP: u16 = 1;

/// One chip as laid out on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChipSlot {
    pub index: usize,
    pub area: Rect,
    /// Screen column of the close mark.
    pub close_x: u16,
}

#[derive(Debug, Default)]
pub struct StripState {
    /// Highlighted chip (keyboard focus)
    pub selected: usize,
    /// First chip drawn
    pub offset: usize,
    slots: Vec<ChipSlot>,
}

impl StripState {
    pub fn reset(&mut self) {
        self.selected = 0;
        self.offset = 0;
        self.slots.clear();
    }

    pub fn select_prev(&mut self) -> bool {
        if self.selected == 0 {
            return false;
        }
        self.selected -= 1;
        true
    }

    pub fn select_next(&mut self, count: usize) -> bool {
        if self.selected + 1 >= count {
            return false;
        }
        self.selected += 1;
        true
    }

    /// Keep the selection in range after a removal.
    pub fn clamp(&mut self, count: usize) {
        self.selected = self.selected.min(count.saturating_sub(1));
        self.offset = self.offset.min(self.selected);
    }

    /// Index whose close mark is at the given screen cell.
    pub fn hit_close(&self, column: u16, row: u16) -> Option<usize> {
        self.slots
            .iter()
            .find(|slot| slot.area.y == row && slot.close_x == column)
            .map(|slot| slot.index)
    }

    /// Index of the chip under the given screen cell.
    pub fn hit_chip(&self, column: u16, row: u16) -> Option<usize> {
        self.slots
            .iter()
            .find(|slot| {
                slot.area.y == row && column >= slot.area.x && column < slot.area.right()
            })
            .map(|slot| slot.index)
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, images: &[Image], focused: bool) {
        let border_style = if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title(format!(" Attachments ({}) ", images.len()));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        self.clamp(images.len());
        let labels: Vec<String> = images
            .iter()
            .enumerate()
            .map(|(i, image)| chip_label(i, image))
            .collect();
        self.offset = scroll_to_selected(&labels, self.offset, self.selected, inner.width);
        self.slots = layout_chips(&labels, self.offset, inner);

        let mut spans = Vec::new();
        if self.offset > 0 {
            spans.push(Span::styled("‹", Style::default().fg(Color::DarkGray)));
        }
        for slot in &self.slots {
            let style = if focused && slot.index == self.selected {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray).add_modifier(Modifier::REVERSED)
            };
            spans.push(Span::styled(labels[slot.index].clone(), style));
            spans.push(Span::raw(" ".repeat(CHIP_GAP as usize)));
        }
        let first_x = self.slots.first().map(|s| s.area.x).unwrap_or(inner.x);
        let line_area = Rect {
            x: first_x.saturating_sub(u16::from(self.offset > 0)),
            width: inner.right().saturating_sub(first_x.saturating_sub(u16::from(self.offset > 0))),
            ..inner
        };
        frame.render_widget(Paragraph::new(Line::from(spans)), line_area);
    }
}

/// Chip text, e.g. `" 1 · 640×480 · 1.2 KB ✕ "`.
pub fn chip_label(index: usize, image: &Image) -> String {
    format!(" {} · {} {} ", index + 1, image.label(), CLOSE_MARK)
}

fn chip_width(label: &str) -> u16 {
    label.width() as u16
}

/// Smallest offset ≥ 0 that keeps `selected` fully inside `width` columns,
/// moving as little as possible from `offset`.
fn scroll_to_selected(labels: &[String], offset: usize, selected: usize, width: u16) -> usize {
    if labels.is_empty() {
        return 0;
    }
    let mut offset = offset.min(selected);
    loop {
        let lead = u16::from(offset > 0);
        let used: u16 = labels[offset..=selected]
            .iter()
            .map(|l| chip_width(l) + CHIP_GAP)
            .sum::<u16>()
            .saturating_add(lead);
        if used <= width.saturating_add(CHIP_GAP) || offset == selected {
            return offset;
        }
        offset += 1;
    }
}

/// Place chips left to right from `offset` until the row is full.
fn layout_chips(labels: &[String], offset: usize, inner: Rect) -> Vec<ChipSlot> {
    let mut slots = Vec::new();
    let mut x = inner.x + u16::from(offset > 0);
    for (index, label) in labels.iter().enumerate().skip(offset) {
        let width = chip_width(label);
        if x + width > inner.right() {
            break;
        }
        // Close mark sits before the trailing space
        let close_x = x + width - 2;
        slots.push(ChipSlot {
            index,
            area: Rect::new(x, inner.y, width, 1),
            close_x,
        });
        x += width + CHIP_GAP;
    }
    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::solid_image;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn labels(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("chip{i}    ")).collect() // 9 columns each
    }

    #[test]
    fn chip_label_ends_with_close_mark() {
        let label = chip_label(0, &solid_image(4, 3));
        assert!(label.starts_with(" 1 · 4×3 · "));
        assert!(label.ends_with("✕ "));
    }

    #[test]
    fn layout_stops_at_edge() {
        let slots = layout_chips(&labels(5), 0, Rect::new(0, 0, 25, 1));
        // 9 + 1 + 9 = 19, a third chip would need 29
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[1].area.x, 10);
        assert_eq!(slots[1].close_x, 17);
    }

    #[test]
    fn scroll_keeps_selection_visible() {
        let l = labels(5);
        assert_eq!(scroll_to_selected(&l, 0, 1, 25), 0);
        let offset = scroll_to_selected(&l, 0, 4, 25);
        assert!(offset > 0);
        let slots = layout_chips(&l, offset, Rect::new(0, 0, 25, 1));
        assert!(slots.iter().any(|s| s.index == 4));
    }

    #[test]
    fn selection_moves_within_bounds() {
        let mut strip = StripState::default();
        assert!(!strip.select_prev());
        assert!(strip.select_next(2));
        assert!(!strip.select_next(2));
        strip.clamp(1);
        assert_eq!(strip.selected, 0);
    }

    #[test]
    fn render_records_hit_targets() {
        let images = vec![solid_image(2, 2), solid_image(3, 3)];
        let mut strip = StripState::default();
        let backend = TestBackend::new(80, 3);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| strip.render(f, f.area(), &images, true))
            .unwrap();

        assert_eq!(strip.slots.len(), 2);
        let second = strip.slots[1];
        assert_eq!(strip.hit_close(second.close_x, 1), Some(1));
        assert_eq!(strip.hit_chip(second.area.x, 1), Some(1));
        assert_eq!(strip.hit_close(second.area.x, 1), None);
        assert_eq!(terminal.backend().buffer()[(second.close_x, 1)].symbol(), "✕");
    }
}
