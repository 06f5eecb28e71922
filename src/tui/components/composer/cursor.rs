//! Cursor position tracking and navigation for the composer text box.
//!
//! `CursorState` owns the cursor byte offset, scroll offset, and the box
//! geometry it measures against. All navigation methods accept `buffer: &str`
//! explicitly; the draft itself is owned by `ComposerState`.

use crate::core::composer::measure::{wrap_line_count, wrap_options};
use ratatui::layout::Rect;

/// Columns from the box edge to the first text column (border + padding).
pub(super) const TEXT_OFFSET_X: u16 = 2;
/// Rows from the box edge to the first text row (border).
pub(super) const TEXT_OFFSET_Y: u16 = 1;

pub(super) struct CursorState {
    /// Cursor position as byte offset in buffer (0..=buffer.len())
    pub pos: usize,
    /// Line offset for internal scrolling (0 when content fits in viewport)
    pub scroll_offset: u16,
    /// Columns around the text unavailable for wrapping
    inset: u16,
    /// Lines shown before the box scrolls
    visible_lines: u16,
}

impl CursorState {
    pub fn new(inset: u16, visible_lines: u16) -> Self {
        Self {
            pos: 0,
            scroll_offset: 0,
            inset,
            visible_lines: visible_lines.max(1),
        }
    }

    pub fn visible_lines(&self) -> u16 {
        self.visible_lines
    }

    pub fn inner_width(&self, content_width: u16) -> u16 {
        content_width.saturating_sub(self.inset)
    }

    /// Reset cursor to start (after a send clears the draft).
    pub fn reset(&mut self) {
        self.pos = 0;
        self.scroll_offset = 0;
    }

    /// Move cursor vertically while trying to keep its column.
    ///
    /// Returns `true` if the cursor moved, `false` if already at a boundary.
    pub fn move_vertically(&mut self, buffer: &str, direction: i16, content_width: u16) -> bool {
        let width = self.inner_width(content_width);
        if width == 0 || buffer.is_empty() {
            return false;
        }

        let lines = textwrap::wrap(buffer, wrap_options(width));
        if lines.is_empty() {
            return false;
        }

        // Byte length of a wrapped line including its trailing newline (if present)
        let line_byte_span = |line: &str, offset: usize| -> usize {
            let has_newline = offset + line.len() < buffer.len()
                && buffer.as_bytes()[offset + line.len()] == b'\n';
            line.len() + usize::from(has_newline)
        };

        let mut byte_offset = 0;
        let mut current_line_idx = 0;
        let mut column_in_line = 0;

        for (idx, line) in lines.iter().enumerate() {
            if byte_offset + line.len() >= self.pos {
                current_line_idx = idx;
                column_in_line = self.pos - byte_offset;
                break;
            }
            byte_offset += line_byte_span(line, byte_offset);
        }

        let target_line_idx = if direction < 0 {
            if current_line_idx == 0 {
                return false;
            }
            current_line_idx - 1
        } else {
            if current_line_idx >= lines.len() - 1 {
                return false;
            }
            current_line_idx + 1
        };

        let mut target_line_start = 0;
        for line in lines.iter().take(target_line_idx) {
            target_line_start += line_byte_span(line, target_line_start);
        }

        let target_line = &lines[target_line_idx];
        let mut target_column = column_in_line.min(target_line.len());
        while !target_line.is_char_boundary(target_column) {
            target_column -= 1;
        }
        self.pos = target_line_start + target_column;

        true
    }

    /// Which wrapped line (0-based) the cursor is on.
    pub fn calculate_line(&self, buffer: &str, content_width: u16) -> u16 {
        let width = self.inner_width(content_width);
        if width == 0 {
            return 0;
        }

        let text_before_cursor = &buffer[..self.pos];
        let lines = textwrap::wrap(text_before_cursor, wrap_options(width));
        let mut cursor_line = lines.len().saturating_sub(1) as u16;

        // Cursor right after a newline that textwrap didn't represent
        if self.pos > 0
            && buffer.as_bytes()[self.pos - 1] == b'\n'
            && !lines.last().is_some_and(|l| l.is_empty())
        {
            cursor_line += 1;
        }

        cursor_line
    }

    /// Update scroll offset to keep the cursor visible within the box.
    pub fn update_scroll_offset(&mut self, buffer: &str, content_width: u16) {
        let width = self.inner_width(content_width);
        let total_lines = wrap_line_count(buffer, width);

        if total_lines <= self.visible_lines {
            self.scroll_offset = 0;
            return;
        }

        let cursor_line = self.calculate_line(buffer, content_width);

        if cursor_line < self.scroll_offset {
            self.scroll_offset = cursor_line;
        } else if cursor_line >= self.scroll_offset + self.visible_lines {
            self.scroll_offset = cursor_line.saturating_sub(self.visible_lines - 1);
        }
    }

    /// Screen position for the cursor, as (column, row).
    pub fn screen_pos(&self, buffer: &str, area: Rect) -> (u16, u16) {
        let width = self.inner_width(area.width);
        if width == 0 {
            return (area.x + TEXT_OFFSET_X, area.y + TEXT_OFFSET_Y);
        }

        let options = wrap_options(width);
        let text_before_cursor = &buffer[..self.pos];
        let cursor_line = self.calculate_line(buffer, area.width);

        // Count chars from the last newline; textwrap trims trailing spaces
        let last_newline = text_before_cursor
            .rfind('\n')
            .map(|pos| pos + 1)
            .unwrap_or(0);
        let logical_line_to_cursor = &text_before_cursor[last_newline..];
        let logical_line_wrapped = textwrap::wrap(logical_line_to_cursor, options);

        let cursor_col = if logical_line_wrapped.is_empty() {
            0
        } else {
            let chars_in_prev_segments: usize = logical_line_wrapped
                .iter()
                .take(logical_line_wrapped.len() - 1)
                .map(|seg| seg.chars().count())
                .sum();

            let total_chars = logical_line_to_cursor.chars().count();
            total_chars.saturating_sub(chars_in_prev_segments) as u16
        };

        let visible_line = cursor_line.saturating_sub(self.scroll_offset);

        (
            area.x + TEXT_OFFSET_X + cursor_col.min(width),
            area.y + TEXT_OFFSET_Y + visible_line,
        )
    }
}
