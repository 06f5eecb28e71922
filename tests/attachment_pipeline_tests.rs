use std::fs;
use std::path::Path;

use parley::attachment::{AttachmentSource, LibrarySource, PickerOutcome, scan_library};
use parley::core::composer::{ComposerState, HeightMetrics};
use parley::core::image::Image;
use parley::core::normalize::Normalizer;
use tempfile::TempDir;

// ============================================================================
// Helper Functions
// ============================================================================

fn png(width: u32, height: u32) -> Image {
    let pixels = vec![90u8; (width * height * 4) as usize];
    Image::from_rgba(width, height, pixels).unwrap()
}

fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> Image {
    let image = png(width, height);
    fs::write(dir.join(name), image.encoded()).unwrap();
    image
}

/// A library directory with three good images, one corrupt image, and a
/// text file.
fn library() -> (TempDir, Vec<Image>) {
    let dir = TempDir::new().unwrap();
    let a = write_png(dir.path(), "a.png", 2, 2);
    let b = write_png(dir.path(), "b.png", 3, 1);
    fs::write(dir.path().join("c.jpg"), b"not really a jpeg").unwrap();
    let d = write_png(dir.path(), "d.png", 1, 4);
    fs::write(dir.path().join("notes.txt"), b"hello").unwrap();
    (dir, vec![a, b, d])
}

// ============================================================================
// Library Loading
// ============================================================================

#[test]
fn scan_lists_only_image_files_in_order() {
    let (dir, _) = library();
    let names: Vec<String> = scan_library(dir.path())
        .unwrap()
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, ["a.png", "b.png", "c.jpg", "d.png"]);
}

#[tokio::test]
async fn corrupt_file_is_skipped_and_the_rest_attach() {
    let (dir, expected) = library();
    let source = LibrarySource::from_paths(scan_library(dir.path()).unwrap());

    let outcome = source.request(10).await;
    assert_eq!(outcome, PickerOutcome::Selected(expected));
}

#[tokio::test]
async fn selection_order_is_preserved() {
    let (dir, expected) = library();
    let paths = vec![dir.path().join("d.png"), dir.path().join("a.png")];

    let outcome = LibrarySource::from_paths(paths).request(10).await;
    assert_eq!(
        outcome,
        PickerOutcome::Selected(vec![expected[2].clone(), expected[0].clone()])
    );
}

#[tokio::test]
async fn limit_caps_the_session() {
    let (dir, expected) = library();
    let source = LibrarySource::from_paths(scan_library(dir.path()).unwrap());

    let outcome = source.request(2).await;
    assert_eq!(outcome, PickerOutcome::Selected(expected[..2].to_vec()));
}

#[tokio::test]
async fn only_failures_is_cancelled() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("broken.png"), b"\x89PNG garbage").unwrap();
    let missing = dir.path().join("missing.png");

    let source = LibrarySource::from_paths(vec![dir.path().join("broken.png"), missing]);
    assert_eq!(source.request(5).await, PickerOutcome::Cancelled);
}

// ============================================================================
// Into the Composer
// ============================================================================

#[tokio::test]
async fn picked_images_reach_the_composer_strip() {
    let (dir, expected) = library();
    let outcome = LibrarySource::from_paths(scan_library(dir.path()).unwrap())
        .request(10)
        .await;
    let PickerOutcome::Selected(images) = outcome else {
        panic!("expected a selection");
    };

    let mut composer = ComposerState::new(10, HeightMetrics::terminal(), Normalizer::default());
    let changed = composer.attach(images).unwrap();
    assert!(changed.has_strip);
    assert_eq!(changed.height, 6);
    assert_eq!(composer.pending_images(), expected.as_slice());
}
