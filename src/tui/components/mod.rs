//! # TUI Components
//!
//! All UI components for the terminal interface.
//!
//! ## Component Architecture
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! Simple display components that receive all data as parameters:
//! - `TitleBar`: top status bar (status text, pending image count, "↓ New")
//! - `MessageBubble`: one sent message
//!
//! ### Stateful Components (Event-Driven)
//!
//! Components that manage local state and emit events:
//! - `Composer`: draft text box plus attachment strip
//! - `MessageList`: scrollable conversation view with layout caching
//! - `PickerMenu`, `LibraryBrowser`: overlays for starting a picker session
//!
//! Components receive external data as "props" (function parameters), not by
//! reaching into `App`:
//!
//! ```rust,ignore
//! TitleBar::new(app.status_message.clone(), pending, unseen).render(frame, area);
//! ```
//!
//! ## Module Structure
//!
//! ```text
//! components/
//! ├── mod.rs              (this file)
//! ├── title_bar.rs        (Top status bar)
//! ├── message.rs          (Single message bubble)
//! ├── message_list.rs     (Scrollable message container)
//! ├── composer/           (Text box, cursor, attachment strip)
//! ├── picker_menu.rs      (Attachment source menu)
//! └── library_browser.rs  (Multi-select library overlay)
//! ```

mod title_bar;
pub use title_bar::TitleBar;

pub mod composer;
pub use composer::{Composer, ComposerEvent, Focus};
pub mod library_browser;
pub mod message;
pub mod message_list;
pub use library_browser::{LibraryBrowser, LibraryBrowserEvent, LibraryBrowserState};
pub use message_list::{MessageList, MessageListState};
pub mod picker_menu;
pub use picker_menu::{PickerChoice, PickerMenu, PickerMenuEvent, PickerMenuState};
