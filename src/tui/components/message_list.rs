//! # MessageList Component
//!
//! Scrollable view of the message store.
//!
//! ## Responsibilities
//!
//! - Lay out one bubble per message, user on the right, bot on the left
//! - Cache bubble heights (the store is append-only, so a cached height only
//!   goes stale when the width changes)
//! - Stick to the newest message until the user scrolls up
//! - Re-pin to the bottom when the viewport signal reports a change
//!
//! ## Architecture
//!
//! `MessageList` is a transient component (created each frame) that wraps
//! `&'a mut MessageListState` (persistent state) and the `MessageStore` (props).

use ratatui::Frame;
use ratatui::layout::{Position, Rect, Size};
use tokio::sync::watch;
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::core::store::{MessageStore, Sender};
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::message::MessageBubble;
use crate::tui::event::TuiEvent;
use crate::tui::viewport::Viewport;

/// Layout and scroll state for the message list.
/// Must be persisted in the parent TuiState.
pub struct MessageListState {
    /// Scroll offset and view state
    pub scroll_state: ScrollViewState,
    /// Cached layout measurements
    pub layout: LayoutCache,
    /// When true, auto-scroll to bottom on new content
    pub stick_to_bottom: bool,
    /// Last known viewport height (for scroll clamping between frames)
    pub viewport_height: u16,
    /// True when content exists below the visible window
    pub has_unseen_content: bool,
    viewport: watch::Receiver<Viewport>,
}

impl MessageListState {
    pub fn new(viewport: watch::Receiver<Viewport>) -> Self {
        Self {
            scroll_state: ScrollViewState::default(),
            layout: LayoutCache::new(),
            stick_to_bottom: true, // Start attached to bottom
            viewport_height: 0,
            has_unseen_content: false,
            viewport,
        }
    }

    /// Consume a pending viewport change. Returns true if one was seen.
    pub fn sync_viewport(&mut self) -> bool {
        match self.viewport.has_changed() {
            Ok(true) => {
                let viewport = *self.viewport.borrow_and_update();
                log::debug!("Message list re-pinned after viewport change {:?}", viewport);
                self.stick_to_bottom = true;
                true
            }
            _ => false,
        }
    }

    fn max_offset(&self) -> u16 {
        self.layout
            .total_height()
            .saturating_sub(self.viewport_height)
    }

    /// Clamp scroll offset so it never exceeds the content bounds.
    pub fn clamp_scroll(&mut self) {
        let max_y = self.max_offset();
        let current = self.scroll_state.offset();
        if current.y > max_y {
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }

    /// Clamp scroll and re-engage auto-scroll if the user has reached the bottom.
    pub fn repin_if_at_bottom(&mut self) {
        let max_y = self.max_offset();
        let current = self.scroll_state.offset();
        if current.y >= max_y {
            self.stick_to_bottom = true;
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }
}

/// Scrollable conversation view component.
/// Created fresh each frame with references to state and data.
pub struct MessageList<'a> {
    pub state: &'a mut MessageListState,
    pub store: &'a MessageStore,
}

impl<'a> MessageList<'a> {
    pub fn new(state: &'a mut MessageListState, store: &'a MessageStore) -> Self {
        Self { state, store }
    }
}

impl<'a> Component for MessageList<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.state.sync_viewport();

        let content_width = area.width.saturating_sub(1); // -1 for scrollbar safe area
        let count = self.store.count();

        // 1. Update layout cache
        let layout = &mut self.state.layout;
        let reusable = layout.reusable_count(count, content_width);
        layout.truncate(reusable);
        for message in self.store.iter().skip(layout.len()) {
            let width = MessageBubble::width(message, content_width);
            let height = MessageBubble::calculate_height(message, width);
            layout.push(width, height);
        }
        layout.rebuild_prefix_heights();
        layout.update_metadata(count, content_width);

        let total_height = self.state.layout.total_height();

        // 2. Clamp scroll offset
        self.state.viewport_height = area.height;
        if !self.state.stick_to_bottom {
            self.state.clamp_scroll();
        }

        let scroll_offset = self.state.scroll_state.offset().y;
        let visible_range = self.state.layout.visible_range(scroll_offset, area.height);

        // 3. Render visible bubbles into a ScrollView
        let mut scroll_view = ScrollView::new(Size::new(content_width, total_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Automatic)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        for i in visible_range {
            let Some(message) = self.store.at(i) else {
                break;
            };
            let width = self.state.layout.widths[i];
            let height = self.state.layout.heights[i];
            let y = self.state.layout.top_of(i);
            let x = match message.sender() {
                Sender::User => content_width.saturating_sub(width),
                Sender::Bot => 0,
            };
            scroll_view.render_widget(
                MessageBubble::new(message),
                Rect::new(x, y, width, height),
            );
        }

        if self.state.stick_to_bottom {
            self.state.scroll_state.scroll_to_bottom();
        }

        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);

        let current_offset = self.state.scroll_state.offset().y;
        self.state.has_unseen_content =
            total_height > area.height && current_offset < self.state.max_offset();
    }
}

/// EventHandler lives on the persistent state: `MessageList` is rebuilt every
/// frame and cannot hold scroll position.
impl EventHandler for MessageListState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollUp => {
                self.scroll_state.scroll_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollDown => {
                self.scroll_state.scroll_down();
                self.repin_if_at_bottom();
            }
            TuiEvent::ScrollPageUp => {
                self.scroll_state.scroll_page_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollPageDown => {
                self.scroll_state.scroll_page_down();
                self.repin_if_at_bottom();
            }
            TuiEvent::ScrollToBottom => {
                self.stick_to_bottom = true;
            }
            _ => {}
        }
        None
    }
}

/// Cached bubble measurements, indexed like the store.
#[derive(Default)]
pub struct LayoutCache {
    pub widths: Vec<u16>,
    pub heights: Vec<u16>,
    pub prefix_heights: Vec<u16>,
    message_count: usize,
    content_width: u16,
}

impl LayoutCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many cached entries are still valid for a store of
    /// `message_count` messages at `content_width` columns.
    pub fn reusable_count(&self, message_count: usize, content_width: u16) -> usize {
        if self.content_width != content_width || message_count < self.message_count {
            return 0;
        }
        self.heights.len().min(message_count)
    }

    pub fn len(&self) -> usize {
        self.heights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    fn truncate(&mut self, len: usize) {
        self.widths.truncate(len);
        self.heights.truncate(len);
    }

    fn push(&mut self, width: u16, height: u16) {
        self.widths.push(width);
        self.heights.push(height);
    }

    pub fn update_metadata(&mut self, message_count: usize, content_width: u16) {
        self.message_count = message_count;
        self.content_width = content_width;
    }

    pub fn rebuild_prefix_heights(&mut self) {
        self.prefix_heights = self
            .heights
            .iter()
            .scan(0u16, |acc, &h| {
                *acc = acc.saturating_add(h);
                Some(*acc)
            })
            .collect();
    }

    pub fn total_height(&self) -> u16 {
        self.prefix_heights.last().copied().unwrap_or(0)
    }

    /// Canvas row where item `index` starts. Saturates with the prefix sums.
    pub fn top_of(&self, index: usize) -> u16 {
        if index == 0 {
            0
        } else {
            self.prefix_heights.get(index - 1).copied().unwrap_or(0)
        }
    }

    pub fn visible_range(
        &self,
        scroll_offset: u16,
        viewport_height: u16,
    ) -> std::ops::Range<usize> {
        let buffer = viewport_height / 2;
        let buffered_start = scroll_offset.saturating_sub(buffer);
        let buffered_end = scroll_offset
            .saturating_add(viewport_height)
            .saturating_add(buffer);

        let start = self
            .prefix_heights
            .partition_point(|&end| end <= buffered_start);
        let end = self
            .prefix_heights
            .partition_point(|&end| end < buffered_end)
            .saturating_add(1)
            .min(self.prefix_heights.len());

        start..end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::MessageContent;
    use crate::tui::viewport::ViewportSignal;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn state() -> (ViewportSignal, MessageListState) {
        let (signal, rx) = ViewportSignal::new(Viewport::default());
        (signal, MessageListState::new(rx))
    }

    fn store_with(n: usize) -> MessageStore {
        let mut store = MessageStore::new();
        for i in 0..n {
            let sender = if i % 2 == 0 { Sender::User } else { Sender::Bot };
            store
                .append(sender, MessageContent::Text(format!("message {i}")))
                .unwrap();
        }
        store
    }

    #[test]
    fn test_layout_cache_reusable() {
        let mut cache = LayoutCache::new();
        cache.heights = vec![3; 5];
        cache.update_metadata(5, 80);

        // Same everything -> all reusable
        assert_eq!(cache.reusable_count(5, 80), 5);
        // Appended message -> old entries still valid
        assert_eq!(cache.reusable_count(6, 80), 5);
        // Width changed -> nothing reusable
        assert_eq!(cache.reusable_count(5, 40), 0);
        // Fewer messages means a different store
        assert_eq!(cache.reusable_count(2, 80), 0);
    }

    #[test]
    fn test_visible_range_and_top_of() {
        let mut cache = LayoutCache::new();
        cache.heights = vec![3, 3, 3, 3, 3, 3, 3, 3];
        cache.rebuild_prefix_heights();
        assert_eq!(cache.total_height(), 24);
        assert_eq!(cache.top_of(0), 0);
        assert_eq!(cache.top_of(2), 6);

        // Viewport of 6 rows at offset 12, half-viewport buffer each side
        let range = cache.visible_range(12, 6);
        assert_eq!(range, 3..7);
    }

    #[test]
    fn test_prefix_heights_saturate() {
        let mut cache = LayoutCache::new();
        cache.heights = vec![10, u16::MAX, 3];
        cache.rebuild_prefix_heights();
        assert_eq!(cache.total_height(), u16::MAX);
        assert_eq!(cache.top_of(1), 10);
        assert_eq!(cache.top_of(2), u16::MAX);

        // Bottom of a saturated canvas still yields the tall bubble
        assert_eq!(cache.visible_range(u16::MAX - 9, 9), 1..2);
    }

    #[test]
    fn test_scroll_up_unpins_and_bottom_repins() {
        let (_signal, mut state) = state();
        state.handle_event(&TuiEvent::ScrollUp);
        assert!(!state.stick_to_bottom);
        state.handle_event(&TuiEvent::ScrollToBottom);
        assert!(state.stick_to_bottom);
    }

    #[test]
    fn test_viewport_change_repins() {
        let (signal, mut state) = state();
        state.stick_to_bottom = false;
        assert!(!state.sync_viewport());

        signal.composer_resized(7);
        assert!(state.sync_viewport());
        assert!(state.stick_to_bottom);
        assert!(!state.sync_viewport());
    }

    #[test]
    fn test_render_places_bubbles_by_sender() {
        let (_signal, mut state) = state();
        let store = store_with(2);
        let backend = TestBackend::new(40, 10);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                MessageList::new(&mut state, &store).render(f, f.area());
            })
            .unwrap();

        assert_eq!(state.layout.len(), 2);
        let buffer = terminal.backend().buffer();
        let row = |y: u16| -> String {
            (0..40)
                .map(|x| buffer[(x, y)].symbol().to_string())
                .collect()
        };
        // First bubble (user) hugs the right edge, second (bot) the left
        let user_text_row = row(1);
        let bot_text_row = row(4);
        assert!(user_text_row.find("message 0").unwrap() > 15);
        assert!(bot_text_row.find("message 1").unwrap() < 5);
    }

    #[test]
    fn test_render_sticks_to_bottom() {
        let (_signal, mut state) = state();
        let store = store_with(20);
        let backend = TestBackend::new(40, 9);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                MessageList::new(&mut state, &store).render(f, f.area());
            })
            .unwrap();

        assert_eq!(state.layout.total_height(), 60);
        assert!(state.scroll_state.offset().y >= 60 - 9);
        assert!(!state.has_unseen_content);

        // Scrolling up reveals the "new content" marker
        state.handle_event(&TuiEvent::ScrollPageUp);
        terminal
            .draw(|f| {
                MessageList::new(&mut state, &store).render(f, f.area());
            })
            .unwrap();
        assert!(!state.stick_to_bottom);
        assert!(state.has_unseen_content);
    }
}
