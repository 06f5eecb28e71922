//! # Core Application Logic
//!
//! This module contains Parley's business logic.
//! It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌──────────────────────────────┐
//!                    │            CORE              │
//!                    │                              │
//!                    │  • ComposerState (pending)   │
//!                    │  • Normalizer (image bytes)  │
//!                    │  • MessageStore (sent)       │
//!                    │  • Action / update()         │
//!                    │                              │
//!                    │  No terminal. No widgets.    │
//!                    └──────────────┬───────────────┘
//!                                   │
//!                 ┌─────────────────┴─────────────────┐
//!                 ▼                                   ▼
//!          ┌────────────┐                      ┌────────────┐
//!          │    TUI     │                      │ Attachment │
//!          │  Adapter   │                      │  Sources   │
//!          │ (ratatui)  │                      │ (async)    │
//!          └────────────┘                      └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`composer`]: draft text, pending images, and the derived layout height
//! - [`store`]: the append-only message log
//! - [`action`]: the `Action` enum and the `update()` reducer
//! - [`state`]: the `App` struct
//! - [`normalize`]: proportional downscaling of oversized images

pub mod action;
pub mod composer;
pub mod config;
pub mod image;
pub mod normalize;
pub mod responder;
pub mod state;
pub mod store;
