//! Path utilities for test output.

use std::path::{Path, PathBuf};

/// Creates a temporary directory for test output.
///
/// The directory is automatically cleaned up when the returned `TempDir` is dropped.
///
/// # Returns
///
/// A `tempfile::TempDir` that will be automatically cleaned up.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary test directory")
}

/// Creates a temporary directory with a specific prefix.
///
/// # Arguments
///
/// * `prefix` - A prefix for the directory name (e.g., "mipmap_test")
///
/// # Returns
///
/// A `tempfile::TempDir` with the specified prefix.
pub fn temp_test_dir_with_prefix(prefix: &str) -> tempfile::TempDir {
    tempfile::Builder::new()
        .prefix(prefix)
        .tempdir()
        .expect("Failed to create temporary test directory")
}

/// Path of a tile inside a zoom-level directory, `{dir}/{zoom}/r.{x}.{z}.png`.
///
/// The zoom directory is created if it does not exist yet.
pub fn tile_path(dir: &Path, zoom: i32, x: i32, z: i32) -> PathBuf {
    let level = dir.join(zoom.to_string());
    std::fs::create_dir_all(&level).expect("Failed to create zoom level directory");
    level.join(format!("r.{}.{}.png", x, z))
}
