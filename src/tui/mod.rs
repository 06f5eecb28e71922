//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! and translates keyboard events into core::Action values.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Event routing
//!
//! ```text
//! crossterm ─► TuiEvent ─┬─ ForceQuit / Resize         (handled here)
//!                        ├─ open overlay ─► PickerMenu / LibraryBrowser
//!                        ├─ scroll keys  ─► MessageList
//!                        └─ everything else ─► Composer ─► ComposerEvent
//!
//! background tasks ─► mpsc<Action> ─► update() ─► Effect ─► apply_effect
//! ```
//!
//! Picker sessions and bot replies run on tokio tasks and report back as
//! `Action`s. The loop drains them between polls, so all state mutation stays
//! on this thread.
//!
//! ## Redraw Strategy
//!
//! Draws only after an event or a background action. The poll timeout is
//! short while background work is in flight and long when idle.

mod component;
mod components;
mod event;
mod ui;
mod viewport;

use log::{debug, info, warn};
use std::io::stdout;
use std::sync::{Arc, mpsc};
use std::time::Duration;

use crossterm::cursor::{SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;

use crate::attachment::{
    AttachmentSource, CaptureSource, ClipboardDevice, LibrarySource, PickerOutcome,
};
use crate::core::action::{Action, Effect, update};
use crate::core::composer::{ComposerHeight, ComposerState};
use crate::core::config::ResolvedConfig;
use crate::core::state::App;
use crate::tui::component::EventHandler;
use crate::tui::components::{
    Composer, ComposerEvent, Focus, LibraryBrowserEvent, LibraryBrowserState, MessageListState,
    PickerChoice, PickerMenuEvent, PickerMenuState,
};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};
use crate::tui::viewport::{Viewport, ViewportSignal};

const BUSY_POLL: Duration = Duration::from_millis(50);
const IDLE_POLL: Duration = Duration::from_millis(500);

/// Modal overlay on top of the chat screen.
pub enum Overlay {
    None,
    Picker(PickerMenuState),
    Library(LibraryBrowserState),
}

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    // Persistent component states
    pub message_list: MessageListState,
    pub composer: Composer,
    pub overlay: Overlay,
    /// Terminal size and composer height, observed by the message list
    pub viewport: ViewportSignal,
    /// Whether the capture entry is offered in the picker menu
    pub capture_available: bool,
}

impl TuiState {
    pub fn new(composer: ComposerState, width: u16, height: u16, capture_available: bool) -> Self {
        let composer = Composer::new(composer);
        let (viewport, rx) = ViewportSignal::new(Viewport {
            width,
            height,
            composer_height: composer.height(),
        });
        Self {
            message_list: MessageListState::new(rx),
            composer,
            overlay: Overlay::None,
            viewport,
            capture_available,
        }
    }

    fn publish_height(&self, changed: Option<ComposerHeight>) {
        if let Some(height) = changed {
            self.viewport.composer_resized(height.height);
        }
    }

    fn resize(&mut self, width: u16, height: u16) {
        let changed = self.composer.set_width(width);
        self.publish_height(changed);
        self.viewport.resized(width, height);
    }
}

/// Background plumbing shared by every spawned task.
struct Runtime {
    tx: mpsc::Sender<Action>,
    capture: Arc<dyn AttachmentSource>,
    /// Tasks that will report back with an Action
    in_flight: usize,
}

impl Runtime {
    fn poll_timeout(&self) -> Duration {
        if self.in_flight > 0 { BUSY_POLL } else { IDLE_POLL }
    }

    fn request(&mut self, source: Arc<dyn AttachmentSource>, limit: usize) {
        self.in_flight += 1;
        spawn_request(source, limit, self.tx.clone());
    }

    fn bot_reply(&mut self, text: String, delay: Duration) {
        self.in_flight += 1;
        spawn_bot_reply(text, delay, self.tx.clone());
    }

    fn finished(&mut self, action: &Action) {
        if matches!(action, Action::AttachmentsPicked(_) | Action::BotReply(_)) {
            self.in_flight = self.in_flight.saturating_sub(1);
        }
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        // Kitty keyboard protocol is harmlessly ignored by terminals without it
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock, // Non-blinking: avoids blink timer reset from redraws
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableMouseCapture,
            DisableBracketedPaste
        );
    }
}

pub fn run(config: ResolvedConfig) -> std::io::Result<()> {
    let mut app = App::from_config(&config);
    let capture: Arc<dyn AttachmentSource> =
        Arc::new(CaptureSource::new(ClipboardDevice::detect()));

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    let size = terminal.size()?;
    let composer = ComposerState::new(config.selection_limit, config.metrics, config.normalizer);
    let mut tui = TuiState::new(composer, size.width, size.height, capture.is_available());
    let changed = tui.composer.set_width(size.width);
    tui.publish_height(changed);

    // Channel for actions from background tasks
    let (tx, rx) = mpsc::channel();
    let mut runtime = Runtime {
        tx,
        capture,
        in_flight: 0,
    };

    let mut needs_redraw = true; // Force first frame

    'main: loop {
        if needs_redraw {
            terminal.draw(|f| ui::draw_ui(f, &app, &mut tui))?;
            needs_redraw = false;
        }

        let first_event = poll_event_timeout(runtime.poll_timeout());
        if first_event.is_some() {
            needs_redraw = true;
        }

        // Process first event + drain ALL pending events before next draw
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            if handle_event(&mut app, &mut tui, &mut runtime, event) {
                break 'main;
            }
        }

        // Handle background task actions
        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", action);
            runtime.finished(&action);
            let effect = update(&mut app, action);
            if apply_effect(&mut app, &mut tui, &mut runtime, effect) {
                break 'main;
            }
        }
    }

    info!("Parley shutting down ({} message(s))", app.store.count());
    ratatui::restore();
    Ok(())
}

/// Route one terminal event. Returns true when the app should quit.
fn handle_event(app: &mut App, tui: &mut TuiState, runtime: &mut Runtime, event: TuiEvent) -> bool {
    match event {
        // ForceQuit (Ctrl+C) always quits, even with an overlay open
        TuiEvent::ForceQuit => {
            let effect = update(app, Action::Quit);
            return apply_effect(app, tui, runtime, effect);
        }
        TuiEvent::Resize(width, height) => {
            tui.resize(width, height);
            return false;
        }
        _ => {}
    }

    // Overlays take every other event while open
    if let Overlay::Picker(menu) = &mut tui.overlay {
        if let Some(PickerMenuEvent::Chosen(choice)) = menu.handle_event(&event) {
            tui.overlay = Overlay::None;
            return choose_source(app, tui, runtime, choice);
        }
        return false;
    }
    if let Overlay::Library(browser) = &mut tui.overlay {
        match browser.handle_event(&event) {
            Some(LibraryBrowserEvent::Confirm(paths)) => {
                tui.overlay = Overlay::None;
                app.status_message = format!("Loading {} image(s)...", paths.len());
                let source = Arc::new(LibrarySource::from_paths(paths));
                runtime.request(source, app.selection_limit);
            }
            Some(LibraryBrowserEvent::Dismiss) => {
                tui.overlay = Overlay::None;
                return picked(app, tui, runtime, PickerOutcome::Cancelled);
            }
            None => {}
        }
        return false;
    }

    match event {
        TuiEvent::ScrollUp
        | TuiEvent::ScrollDown
        | TuiEvent::ScrollPageUp
        | TuiEvent::ScrollPageDown
        | TuiEvent::ScrollToBottom => {
            tui.message_list.handle_event(&event);
            false
        }
        // Esc leaves the strip first, then quits
        TuiEvent::Escape if tui.composer.focus() == Focus::Text => {
            let effect = update(app, Action::Quit);
            apply_effect(app, tui, runtime, effect)
        }
        _ => match tui.composer.handle_event(&event) {
            Some(ComposerEvent::HeightChanged(height)) => {
                tui.viewport.composer_resized(height.height);
                false
            }
            Some(ComposerEvent::Send(pending)) => {
                let effect = update(app, Action::Send(pending));
                apply_effect(app, tui, runtime, effect)
            }
            Some(ComposerEvent::OpenPicker) => {
                let effect = update(app, Action::OpenPicker);
                apply_effect(app, tui, runtime, effect)
            }
            Some(ComposerEvent::ContentChanged) | None => false,
        },
    }
}

fn choose_source(
    app: &mut App,
    tui: &mut TuiState,
    runtime: &mut Runtime,
    choice: PickerChoice,
) -> bool {
    match choice {
        PickerChoice::Capture => {
            app.status_message = String::from("Reading clipboard...");
            runtime.request(Arc::clone(&runtime.capture), app.selection_limit);
            false
        }
        PickerChoice::Library => {
            tui.overlay = Overlay::Library(LibraryBrowserState::open(
                &app.library_dir,
                app.selection_limit,
            ));
            false
        }
        PickerChoice::Cancel => picked(app, tui, runtime, PickerOutcome::Cancelled),
    }
}

fn picked(app: &mut App, tui: &mut TuiState, runtime: &mut Runtime, outcome: PickerOutcome) -> bool {
    let effect = update(app, Action::AttachmentsPicked(outcome));
    apply_effect(app, tui, runtime, effect)
}

/// Carry out an Effect. Returns true when the app should quit.
fn apply_effect(app: &mut App, tui: &mut TuiState, runtime: &mut Runtime, effect: Effect) -> bool {
    match effect {
        Effect::Quit => return true,
        Effect::ShowPicker => {
            tui.overlay = Overlay::Picker(PickerMenuState::new(tui.capture_available));
        }
        Effect::Attach(images) => {
            let changed = tui.composer.attach(images);
            tui.publish_height(changed);
        }
        Effect::Sent { reply } => {
            let changed = tui.composer.reset();
            tui.publish_height(changed);
            tui.message_list.stick_to_bottom = true;
            if let Some(text) = reply {
                runtime.bot_reply(text, app.reply_delay);
            }
        }
        Effect::Rejected | Effect::None => {}
    }
    false
}

fn spawn_request(source: Arc<dyn AttachmentSource>, limit: usize, tx: mpsc::Sender<Action>) {
    info!("Starting {} picker session (limit {})", source.name(), limit);
    tokio::spawn(async move {
        let outcome = source.request(limit).await;
        debug!("{} session finished with {} image(s)", source.name(), outcome.len());
        if tx.send(Action::AttachmentsPicked(outcome)).is_err() {
            warn!("Failed to deliver picker outcome: receiver dropped");
        }
    });
}

fn spawn_bot_reply(text: String, delay: Duration, tx: mpsc::Sender<Action>) {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        if tx.send(Action::BotReply(text)).is_err() {
            warn!("Failed to deliver bot reply: receiver dropped");
        }
    });
}
