use chrono::Local;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Widget, Wrap};
use unicode_width::UnicodeWidthStr;

use crate::core::composer::measure::wrap_options;
use crate::core::store::{ChatMessage, MessageContent, Sender};
use crate::tui::component::Component;

/// Horizontal padding (per side) between the border and text content.
const CONTENT_PAD_H: u16 = 1;
/// Total horizontal space consumed by borders (1 left + 1 right) and padding.
const HORIZONTAL_OVERHEAD: u16 = 2 + CONTENT_PAD_H * 2;
/// Total vertical space consumed by borders (1 top + 1 bottom).
const VERTICAL_OVERHEAD: u16 = 2;
/// Narrowest bubble worth drawing.
const MIN_BUBBLE_WIDTH: u16 = 12;

/// A stateless component that renders one sent message as a chat bubble.
///
/// Transient: created fresh each frame by `MessageList`. User bubbles are
/// green and right-aligned by the parent; bot bubbles are blue and sit on the
/// left. A message carrying images shows a preview line for the first image
/// and a "+N more" count for the rest.
#[derive(Clone, Copy)]
pub struct MessageBubble<'a> {
    pub message: &'a ChatMessage,
}

impl<'a> MessageBubble<'a> {
    pub fn new(message: &'a ChatMessage) -> Self {
        Self { message }
    }

    /// Bubble width for a list `list_width` columns wide: as narrow as the
    /// content allows, capped at three quarters of the list.
    pub fn width(message: &ChatMessage, list_width: u16) -> u16 {
        let max_width = u16::try_from(u32::from(list_width) * 3 / 4)
            .unwrap_or(list_width)
            .max(MIN_BUBBLE_WIDTH)
            .min(list_width);

        let body = body_lines(message.content());
        let longest = body.iter().map(|l| l.width()).max().unwrap_or(0);
        let title = title(message).width();
        let natural = u16::try_from(longest.max(title))
            .unwrap_or(u16::MAX)
            .saturating_add(HORIZONTAL_OVERHEAD);

        natural.min(max_width)
    }

    /// Height of the bubble at the given bubble width, predicted with the same
    /// wrapping options the Paragraph uses.
    pub fn calculate_height(message: &ChatMessage, width: u16) -> u16 {
        let content_width = width.saturating_sub(HORIZONTAL_OVERHEAD);
        if content_width == 0 {
            return 1;
        }

        let lines: usize = body_lines(message.content())
            .iter()
            .map(|line| textwrap::wrap(line, wrap_options(content_width)).len().max(1))
            .sum();
        u16::try_from(lines)
            .unwrap_or(u16::MAX)
            .max(1)
            .saturating_add(VERTICAL_OVERHEAD)
    }
}

/// The text shown inside a bubble, one entry per logical line. The image
/// preview (if any) is the last entry.
fn body_lines(content: &MessageContent) -> Vec<String> {
    let mut lines: Vec<String> = content
        .text()
        .map(|t| t.trim().lines().map(str::to_string).collect())
        .unwrap_or_default();
    if let Some(preview) = preview_line(content) {
        lines.push(preview);
    }
    lines
}

fn preview_line(content: &MessageContent) -> Option<String> {
    let first = content.preview_image()?;
    let rest = content.images().len() - 1;
    Some(if rest == 0 {
        format!("▣ {}", first.label())
    } else {
        format!("▣ {}  +{} more", first.label(), rest)
    })
}

fn title(message: &ChatMessage) -> String {
    let local = message.timestamp().with_timezone(&Local);
    format!("{} · {}", message.sender().label(), local.format("%H:%M"))
}

pub fn sender_style(sender: Sender) -> Style {
    match sender {
        Sender::User => Style::default().fg(Color::Green),
        Sender::Bot => Style::default().fg(Color::Blue),
    }
}

impl<'a> Widget for MessageBubble<'a> {
    fn render(self, area: Rect, buf: &mut ratatui::buffer::Buffer) {
        let style = sender_style(self.message.sender());
        let border_style = style.add_modifier(Modifier::DIM);

        let block = Block::bordered()
            .title(title(self.message))
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title_style(border_style)
            .padding(Padding::horizontal(CONTENT_PAD_H));

        let inner_area = block.inner(area);
        block.render(area, buf);

        let content = self.message.content();
        let mut lines: Vec<Line> = content
            .text()
            .map(|t| t.trim().lines().map(|l| Line::styled(l.to_string(), style)).collect())
            .unwrap_or_default();
        if let Some(preview) = preview_line(content) {
            lines.push(Line::from(Span::styled(
                preview,
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            )));
        }

        Paragraph::new(Text::from(lines))
            .wrap(Wrap { trim: true })
            .render(inner_area, buf);
    }
}

impl<'a> Component for MessageBubble<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(*self, area);
    }
}
