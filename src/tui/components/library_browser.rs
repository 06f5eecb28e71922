//! # Library Browser
//!
//! Multi-select overlay over the image files in the library directory.
//! Space toggles an entry (up to the session's selection limit), Enter
//! confirms, Esc dismisses. Selection order is preserved so the resulting
//! attachments appear in the order the user picked them.
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `LibraryBrowserState` lives in `TuiState` while the overlay is open
//! - `LibraryBrowser` is created each frame with borrowed state

use std::path::{Path, PathBuf};

use log::warn;
use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Padding, Paragraph};

use crate::attachment::scan_library;
use crate::tui::event::TuiEvent;
use crate::tui::ui::centered_rect;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryBrowserEvent {
    /// Paths in selection order.
    Confirm(Vec<PathBuf>),
    Dismiss,
}

pub struct LibraryBrowserState {
    dir: PathBuf,
    entries: Vec<PathBuf>,
    /// Indices into `entries`, in the order they were toggled on.
    picked: Vec<usize>,
    limit: usize,
    highlighted: usize,
    list_state: ListState,
    error: Option<String>,
}

impl LibraryBrowserState {
    /// Scan `dir` and open the browser. A scan failure is shown in the
    /// overlay rather than returned.
    pub fn open(dir: &Path, limit: usize) -> Self {
        let (entries, error) = match scan_library(dir) {
            Ok(entries) => (entries, None),
            Err(e) => {
                warn!("Failed to scan library {}: {}", dir.display(), e);
                (Vec::new(), Some(format!("Cannot read {}: {}", dir.display(), e)))
            }
        };
        Self::with_entries(dir.to_path_buf(), entries, limit, error)
    }

    fn with_entries(
        dir: PathBuf,
        entries: Vec<PathBuf>,
        limit: usize,
        error: Option<String>,
    ) -> Self {
        let mut list_state = ListState::default();
        if !entries.is_empty() {
            list_state.select(Some(0));
        }
        Self {
            dir,
            entries,
            picked: Vec::new(),
            limit: limit.max(1),
            highlighted: 0,
            list_state,
            error,
        }
    }

    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    pub fn picked_count(&self) -> usize {
        self.picked.len()
    }

    /// Toggle the highlighted entry. Adding past the limit is refused.
    fn toggle(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        if let Some(pos) = self.picked.iter().position(|&i| i == self.highlighted) {
            self.picked.remove(pos);
        } else if self.picked.len() < self.limit {
            self.picked.push(self.highlighted);
        }
    }

    fn confirm(&self) -> LibraryBrowserEvent {
        if self.picked.is_empty() {
            return match self.entries.get(self.highlighted) {
                Some(path) => LibraryBrowserEvent::Confirm(vec![path.clone()]),
                None => LibraryBrowserEvent::Dismiss,
            };
        }
        LibraryBrowserEvent::Confirm(
            self.picked
                .iter()
                .map(|&i| self.entries[i].clone())
                .collect(),
        )
    }

    fn highlight(&mut self, index: usize) {
        self.highlighted = index;
        self.list_state.select(Some(index));
    }

    pub fn handle_event(&mut self, event: &TuiEvent) -> Option<LibraryBrowserEvent> {
        match event {
            TuiEvent::Escape => Some(LibraryBrowserEvent::Dismiss),
            TuiEvent::CursorUp if !self.entries.is_empty() => {
                self.highlight(self.highlighted.saturating_sub(1));
                None
            }
            TuiEvent::CursorDown if !self.entries.is_empty() => {
                self.highlight((self.highlighted + 1).min(self.entries.len() - 1));
                None
            }
            TuiEvent::InputChar(' ') => {
                self.toggle();
                None
            }
            TuiEvent::Submit => Some(self.confirm()),
            _ => None,
        }
    }

    /// "[n]" for the n-th picked entry, blank otherwise.
    fn marker(&self, index: usize) -> String {
        match self.picked.iter().position(|&i| i == index) {
            Some(order) => format!("[{}]", order + 1),
            None => String::from("[ ]"),
        }
    }
}

/// Transient render wrapper for the library browser overlay.
pub struct LibraryBrowser<'a> {
    state: &'a mut LibraryBrowserState,
}

impl<'a> LibraryBrowser<'a> {
    pub fn new(state: &'a mut LibraryBrowserState) -> Self {
        Self { state }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let overlay = centered_rect(70, 60, area);
        frame.render_widget(Clear, overlay);

        let title = format!(
            " Library · {} selected (max {}) ",
            self.state.picked.len(),
            self.state.limit
        );
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(title)
            .title_alignment(Alignment::Left)
            .title_bottom(Line::from(" Space Toggle  Enter Attach  Esc Back ").centered())
            .padding(Padding::horizontal(1));

        if self.state.entries.is_empty() {
            let message = self.state.error.clone().unwrap_or_else(|| {
                format!("No images in {}", self.state.dir.display())
            });
            let empty = Paragraph::new(message)
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(empty, overlay);
            return;
        }

        let items: Vec<ListItem> = self
            .state
            .entries
            .iter()
            .enumerate()
            .map(|(i, path)| {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                let marker = self.state.marker(i);
                let marker_style = if marker == "[ ]" {
                    Style::default().fg(Color::DarkGray)
                } else {
                    Style::default().fg(Color::Cyan)
                };
                ListItem::new(Line::from(vec![
                    Span::styled(format!("{:<5}", marker), marker_style),
                    Span::raw(name),
                ]))
            })
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
