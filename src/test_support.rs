//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use crate::core::composer::{ComposerState, DEFAULT_SELECTION_LIMIT, HeightMetrics};
use crate::core::image::Image;
use crate::core::normalize::Normalizer;
use crate::core::state::App;

/// A PNG of a single opaque colour. Different sizes give different bytes.
pub fn solid_image(width: u32, height: u32) -> Image {
    let pixels = [40u8, 120, 200, 255]
        .iter()
        .copied()
        .cycle()
        .take((width * height * 4) as usize)
        .collect();
    Image::from_rgba(width, height, pixels).unwrap()
}

/// A PNG filled with pseudo-random pixels so it barely compresses.
pub fn noisy_image(width: u32, height: u32) -> Image {
    let mut seed: u32 = 0x9E37_79B9 ^ width.rotate_left(16) ^ height;
    let pixels = (0..width * height * 4)
        .map(|_| {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            (seed >> 24) as u8
        })
        .collect();
    Image::from_rgba(width, height, pixels).unwrap()
}

/// A composer with the default limit and normalizer and the given metrics.
pub fn composer(metrics: HeightMetrics) -> ComposerState {
    ComposerState::new(DEFAULT_SELECTION_LIMIT, metrics, Normalizer::default())
}

/// An App with no bot and no greeting.
pub fn test_app() -> App {
    App::new(DEFAULT_SELECTION_LIMIT, None)
}
