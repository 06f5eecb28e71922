//! # Application State
//!
//! Core business state for Parley. This module contains domain logic only -
//! no TUI-specific types. Presentation state (including the composer, which
//! is owned by the composer component) lives in the `tui` module.
//!
//! ```text
//! App
//! ├── store: MessageStore               // sent messages, append-only
//! ├── status_message: String            // status bar text
//! ├── picker_active: bool               // an attachment session is in flight
//! ├── selection_limit: usize            // max images per picker session
//! ├── library_dir: PathBuf              // where the library browser looks
//! ├── responder: Option<Box<dyn Responder>>  // local bot, None = disabled
//! └── reply_delay: Duration             // pause before a bot reply lands
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use std::path::PathBuf;
use std::time::Duration;

use log::warn;

use crate::core::config::ResolvedConfig;
use crate::core::responder::{EchoResponder, Responder};
use crate::core::store::{MessageContent, MessageStore, Sender};

pub struct App {
    pub store: MessageStore,
    pub status_message: String,
    pub picker_active: bool,
    pub selection_limit: usize,
    pub library_dir: PathBuf,
    pub responder: Option<Box<dyn Responder>>,
    pub reply_delay: Duration,
}

impl App {
    pub fn new(selection_limit: usize, responder: Option<Box<dyn Responder>>) -> Self {
        Self {
            store: MessageStore::new(),
            status_message: String::from("Welcome to Parley!"),
            picker_active: false,
            selection_limit: selection_limit.max(1),
            library_dir: PathBuf::from("."),
            responder,
            reply_delay: Duration::ZERO,
        }
    }

    /// Build the App from resolved config. A configured greeting is the
    /// first message in the log.
    pub fn from_config(config: &ResolvedConfig) -> Self {
        let responder: Option<Box<dyn Responder>> = config
            .bot
            .as_ref()
            .map(|_| Box::new(EchoResponder) as Box<dyn Responder>);
        let mut app = Self::new(config.selection_limit, responder);
        app.library_dir = config.library_dir.clone();

        if let Some(bot) = &config.bot {
            app.reply_delay = Duration::from_millis(bot.reply_delay_ms);
            if let Some(greeting) = &bot.greeting
                && let Err(e) = app
                    .store
                    .append(Sender::Bot, MessageContent::Text(greeting.clone()))
            {
                warn!("Skipping greeting: {}", e);
            }
        }
        app
    }
}
