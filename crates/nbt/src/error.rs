//! Error types for NBT decoding.

use thiserror::Error;

/// Errors that can occur while reading NBT data.
#[derive(Error, Debug)]
pub enum NbtError {
    #[error("unexpected end of data: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof { needed: usize, remaining: usize },

    #[error("unknown tag type {0}")]
    UnknownTagType(u8),

    #[error("negative length {0}")]
    NegativeLength(i32),

    #[error("invalid string: {0}")]
    InvalidString(#[from] std::string::FromUtf8Error),

    #[error("tags nested deeper than {0} levels")]
    TooDeep(usize),

    #[error("root tag must be a compound, got {0}")]
    RootNotCompound(&'static str),

    #[error("decompression failed: {0}")]
    Decompress(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, NbtError>;
