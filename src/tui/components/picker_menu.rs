//! # Picker Menu
//!
//! Small overlay shown after Ctrl+O: choose where the images come from.
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `PickerMenuState` lives in `TuiState` while the overlay is open
//! - `PickerMenu` is created each frame with borrowed state

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Padding};

use crate::tui::event::TuiEvent;
use crate::tui::ui::centered_rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerChoice {
    /// Grab a single image from the capture device.
    Capture,
    /// Browse the library directory.
    Library,
    Cancel,
}

impl PickerChoice {
    fn label(self) -> &'static str {
        match self {
            PickerChoice::Capture => "Capture from clipboard",
            PickerChoice::Library => "Photo library",
            PickerChoice::Cancel => "Cancel",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerMenuEvent {
    Chosen(PickerChoice),
}

pub struct PickerMenuState {
    choices: Vec<PickerChoice>,
    selected: usize,
    list_state: ListState,
}

impl PickerMenuState {
    /// The capture entry is only offered when a capture device exists.
    pub fn new(capture_available: bool) -> Self {
        let mut choices = Vec::with_capacity(3);
        if capture_available {
            choices.push(PickerChoice::Capture);
        }
        choices.push(PickerChoice::Library);
        choices.push(PickerChoice::Cancel);

        let mut list_state = ListState::default();
        list_state.select(Some(0));
        Self {
            choices,
            selected: 0,
            list_state,
        }
    }

    pub fn choices(&self) -> &[PickerChoice] {
        &self.choices
    }

    pub fn handle_event(&mut self, event: &TuiEvent) -> Option<PickerMenuEvent> {
        match event {
            TuiEvent::Escape => Some(PickerMenuEvent::Chosen(PickerChoice::Cancel)),
            TuiEvent::CursorUp => {
                self.selected = self.selected.saturating_sub(1);
                self.list_state.select(Some(self.selected));
                None
            }
            TuiEvent::CursorDown => {
                self.selected = (self.selected + 1).min(self.choices.len() - 1);
                self.list_state.select(Some(self.selected));
                None
            }
            TuiEvent::Submit => Some(PickerMenuEvent::Chosen(self.choices[self.selected])),
            _ => None,
        }
    }
}

/// Transient render wrapper for the picker menu overlay.
pub struct PickerMenu<'a> {
    state: &'a mut PickerMenuState,
}

impl<'a> PickerMenu<'a> {
    pub fn new(state: &'a mut PickerMenuState) -> Self {
        Self { state }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let overlay = centered_rect(40, 30, area);
        frame.render_widget(Clear, overlay);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Attach images ")
            .title_alignment(Alignment::Left)
            .title_bottom(Line::from(" Enter Select  Esc Cancel ").centered())
            .padding(Padding::horizontal(1));

        let items: Vec<ListItem> = self
            .state
            .choices
            .iter()
            .map(|choice| ListItem::new(choice.label()))
            .collect();

        let list = List::new(items)
            .block(block)
            .style(Style::default().fg(Color::Gray))
            .highlight_style(
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED),
            );

        frame.render_stateful_widget(list, overlay, &mut self.state.list_state);
    }
}
