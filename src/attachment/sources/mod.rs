pub mod capture;
pub mod library;

pub use capture::{CaptureDevice, CaptureError, CaptureSource, ClipboardDevice};
pub use library::{FileItem, LibraryItem, LibrarySource, LoadError, is_image_file_path, scan_library};
