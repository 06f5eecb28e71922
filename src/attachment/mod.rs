//! # Attachment Sources
//!
//! Asynchronous acquisition of images for the composer. Every source answers
//! a `request(limit)` with exactly one [`PickerOutcome`]:
//!
//! ```text
//! CaptureSource ─┐
//!                ├─► request(limit).await ─► Selected(images) | Cancelled
//! LibrarySource ─┘
//! ```
//!
//! Sources run on the tokio runtime; the TUI spawns the request and feeds the
//! outcome back into the reducer as `Action::AttachmentsPicked`.

pub mod source;
pub mod sources;

pub use source::{AttachmentSource, PickerOutcome};
pub use sources::{
    CaptureDevice, CaptureError, CaptureSource, ClipboardDevice, FileItem, LibraryItem,
    LibrarySource, LoadError, is_image_file_path, scan_library,
};
