//! Multi-select picks from an image library.
//!
//! The selection surface (the TUI library browser) decides *which* items were
//! chosen; this module loads them. Each item loads in its own task and the
//! request waits for all of them before producing a single outcome.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use log::{debug, info, warn};
use thiserror::Error;

use crate::attachment::source::{AttachmentSource, PickerOutcome};
use crate::core::image::Image;

/// Image file extensions the library recognizes.
const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".gif", ".webp"];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("not a readable image: {0}")]
    Decode(#[from] image::ImageError),
}

/// One entry chosen in the selection surface.
#[async_trait]
pub trait LibraryItem: Send + Sync + fmt::Debug {
    /// Whether the entry's media kind is an image.
    fn is_image(&self) -> bool;

    /// Short description for logs.
    fn describe(&self) -> String;

    async fn load(&self) -> Result<Image, LoadError>;
}

/// A library entry backed by a file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileItem {
    path: PathBuf,
}

impl FileItem {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl LibraryItem for FileItem {
    fn is_image(&self) -> bool {
        is_image_file_path(&self.path.to_string_lossy())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn load(&self) -> Result<Image, LoadError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| LoadError::Io {
                path: self.path.clone(),
                source,
            })?;
        Ok(Image::from_encoded(bytes)?)
    }
}

/// Loads the items picked in the library browser.
pub struct LibrarySource {
    items: Vec<Arc<dyn LibraryItem>>,
}

impl LibrarySource {
    /// Items in selection order.
    pub fn new(items: Vec<Arc<dyn LibraryItem>>) -> Self {
        Self { items }
    }

    pub fn from_paths(paths: impl IntoIterator<Item = PathBuf>) -> Self {
        Self::new(
            paths
                .into_iter()
                .map(|p| Arc::new(FileItem::new(p)) as Arc<dyn LibraryItem>)
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[async_trait]
impl AttachmentSource for LibrarySource {
    fn name(&self) -> &str {
        "library"
    }

    async fn request(&self, limit: usize) -> PickerOutcome {
        let (wanted, skipped): (Vec<_>, Vec<_>) =
            self.items.iter().cloned().partition(|item| item.is_image());
        for item in &skipped {
            debug!("Skipping non-image library item {}", item.describe());
        }
        let wanted: Vec<Arc<dyn LibraryItem>> = wanted.into_iter().take(limit).collect();
        if wanted.is_empty() {
            info!("Library request has no image items");
            return PickerOutcome::Cancelled;
        }

        info!("Loading {} library item(s)", wanted.len());
        let handles = wanted.iter().map(|item| {
            let item = Arc::clone(item);
            tokio::spawn(async move { item.load().await })
        });
        // Wait for every load; results come back in selection order
        let results = join_all(handles).await;

        let mut images = Vec::with_capacity(results.len());
        let mut failed = 0usize;
        for (item, result) in wanted.iter().zip(results) {
            match result {
                Ok(Ok(image)) => images.push(image),
                Ok(Err(e)) => {
                    failed += 1;
                    warn!("Failed to load {}: {}", item.describe(), e);
                }
                Err(e) => {
                    failed += 1;
                    warn!("Load task for {} failed: {}", item.describe(), e);
                }
            }
        }
        info!(
            "Library request finished: {} loaded, {} failed",
            images.len(),
            failed
        );
        PickerOutcome::from_images(images, limit)
    }
}

/// Check if text looks like a single image file path.
///
/// Returns true if the text is a single line ending with a recognized
/// image extension (.png, .jpg, .jpeg, .gif, .webp).
pub fn is_image_file_path(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.contains('\n') {
        return false;
    }
    let lower = trimmed.to_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Image files directly inside `dir`, sorted by path.
pub fn scan_library(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_image_file_path(&path.to_string_lossy()))
        .collect();
    paths.sort();
    debug!("Found {} image(s) in {}", paths.len(), dir.display());
    Ok(paths)
}
