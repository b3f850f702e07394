//! Shared test utilities for the tile-mipmap workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Synthetic tile pixel generators
//! - Reference PNG fixtures written by an independent encoder
//! - Temporary directory helpers
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{assert_pixels_eq, block_tile, write_reference_png};
//! ```

pub mod fixtures;
pub mod generators;
pub mod paths;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;
pub use paths::*;

/// Macro for comparing pixel byte buffers.
///
/// Unlike `assert_eq!`, a failure reports the first differing pixel instead
/// of dumping both (possibly megabyte-sized) buffers.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_pixels_eq;
///
/// assert_pixels_eq!(tile.data(), &expected, 4); // 4 bytes per pixel
/// ```
#[macro_export]
macro_rules! assert_pixels_eq {
    ($left:expr, $right:expr, $bpp:expr) => {{
        let (left, right) = (&$left, &$right);
        let left: &[u8] = &left[..];
        let right: &[u8] = &right[..];
        let bpp: usize = $bpp;
        if left.len() != right.len() {
            panic!(
                "assertion failed: pixel buffers differ in length: {} vs {}",
                left.len(),
                right.len()
            );
        }
        if let Some(i) = left.iter().zip(right).position(|(a, b)| a != b) {
            let pixel = i / bpp;
            let start = pixel * bpp;
            panic!(
                "assertion failed: pixel {} (channel {}) differs\n  left: `{:?}`,\n right: `{:?}`",
                pixel,
                i % bpp,
                &left[start..start + bpp],
                &right[start..start + bpp]
            );
        }
    }};
}

/// Macro for asserting that every byte of a pixel buffer is zero.
#[macro_export]
macro_rules! assert_all_zero {
    ($data:expr) => {{
        let data = &$data;
        let data: &[u8] = &data[..];
        if let Some(i) = data.iter().position(|&b| b != 0) {
            panic!(
                "assertion failed: byte {} is {}, expected all zero",
                i, data[i]
            );
        }
    }};
}
