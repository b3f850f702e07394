//! Reader for NBT ("Named Binary Tag") documents.
//!
//! NBT is the big-endian tagged tree format in which chunk and level data
//! for the rendered world is stored. Level files are gzip-compressed; chunks
//! inside region files are zlib-compressed. Both entry points decompress the
//! whole document and then decode it from memory.
//!
//! # Example
//!
//! ```ignore
//! let (_, level) = nbt::from_gzip(&std::fs::read("level.dat")?)?;
//! let spawn_x = level.get("Data").and_then(|d| d.get("SpawnX")).and_then(nbt::Tag::as_i64);
//! ```

pub mod cursor;
pub mod error;
pub mod tag;

use std::io::Read;

use flate2::read::{GzDecoder, ZlibDecoder};

pub use cursor::Cursor;
pub use error::{NbtError, Result};
pub use tag::{read_named, Tag, TagType, MAX_DEPTH};

/// Decode an uncompressed document.
pub fn from_bytes(data: &[u8]) -> Result<(String, Tag)> {
    read_named(&mut Cursor::new(data))
}

/// Decode a gzip-compressed document.
pub fn from_gzip(data: &[u8]) -> Result<(String, Tag)> {
    let mut raw = Vec::new();
    GzDecoder::new(data).read_to_end(&mut raw)?;
    from_bytes(&raw)
}

/// Decode a zlib-compressed document.
pub fn from_zlib(data: &[u8]) -> Result<(String, Tag)> {
    let mut raw = Vec::new();
    ZlibDecoder::new(data).read_to_end(&mut raw)?;
    from_bytes(&raw)
}
