//! Error types for tile composition.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::quadrant::Quadrant;
use crate::raster::PixelFormat;

/// The step of a compose call in which an error was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Opening a tile file (or the temporary output file).
    Open,
    /// Reading the bytes of a tile file.
    Read,
    /// Parsing the PNG container or its image data.
    Decode,
    /// Checking a decoded header against the requested tile shape.
    Validate,
    /// Producing the PNG stream for an output tile.
    Encode,
    /// Writing encoded bytes to disk.
    Write,
    /// Moving the finished output tile into place.
    Persist,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Open => "open",
            Phase::Read => "read",
            Phase::Decode => "decode",
            Phase::Validate => "validate",
            Phase::Encode => "encode",
            Phase::Write => "write",
            Phase::Persist => "persist",
        };
        f.write_str(name)
    }
}

/// Coarse classification of a [`MipmapError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MipmapErrorKind {
    Io,
    Format,
    Allocation,
    InvalidDimensions,
}

/// Errors that can occur while decoding, composing or encoding tiles.
#[derive(Error, Debug)]
pub enum MipmapError {
    /// A filesystem operation failed.
    #[error("{phase} failed for {}: {source}", .path.display())]
    Io {
        phase: Phase,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not a well-formed tile, or does not have the requested shape.
    #[error("{phase} failed for {}: {reason}", .path.display())]
    Format {
        phase: Phase,
        path: PathBuf,
        reason: String,
    },

    /// The pixel buffer for a tile could not be allocated.
    #[error("cannot allocate {width}x{height} {format} pixel buffer")]
    Allocation {
        width: usize,
        height: usize,
        format: PixelFormat,
    },

    /// Tile dimensions cannot be split into four equal quadrants.
    #[error("tile dimensions must be even and non-zero, got {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    /// Raw pixel data does not match the declared buffer shape.
    #[error("pixel data size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// A child tile failed while filling one quadrant of the parent.
    #[error("{quadrant} child tile: {source}")]
    Quadrant {
        quadrant: Quadrant,
        #[source]
        source: Box<MipmapError>,
    },
}

impl MipmapError {
    /// Create an Io error.
    pub fn io(phase: Phase, path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            phase,
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create a Format error.
    pub fn format(phase: Phase, path: impl AsRef<Path>, reason: impl Into<String>) -> Self {
        Self::Format {
            phase,
            path: path.as_ref().to_path_buf(),
            reason: reason.into(),
        }
    }

    /// Attribute this error to the child tile of `quadrant`.
    pub fn in_quadrant(self, quadrant: Quadrant) -> Self {
        Self::Quadrant {
            quadrant,
            source: Box::new(self),
        }
    }

    /// Classify the error, looking through quadrant attribution.
    pub fn kind(&self) -> MipmapErrorKind {
        match self {
            Self::Io { .. } => MipmapErrorKind::Io,
            Self::Format { .. } => MipmapErrorKind::Format,
            Self::Allocation { .. } => MipmapErrorKind::Allocation,
            Self::InvalidDimensions { .. } | Self::SizeMismatch { .. } => {
                MipmapErrorKind::InvalidDimensions
            }
            Self::Quadrant { source, .. } => source.kind(),
        }
    }

    /// The phase the error was detected in, if it came from file handling.
    pub fn phase(&self) -> Option<Phase> {
        match self {
            Self::Io { phase, .. } | Self::Format { phase, .. } => Some(*phase),
            Self::Quadrant { source, .. } => source.phase(),
            _ => None,
        }
    }

    /// The quadrant whose child tile caused the error, if any.
    pub fn quadrant(&self) -> Option<Quadrant> {
        match self {
            Self::Quadrant { quadrant, .. } => Some(*quadrant),
            _ => None,
        }
    }

    /// The file the error refers to, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Io { path, .. } | Self::Format { path, .. } => Some(path.as_path()),
            Self::Quadrant { source, .. } => source.path(),
            _ => None,
        }
    }
}

/// Result type for mipmap operations.
pub type Result<T> = std::result::Result<T, MipmapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_looks_through_quadrant() {
        let err = MipmapError::format(Phase::Validate, "a.png", "width mismatch")
            .in_quadrant(Quadrant::SouthEast);

        assert_eq!(err.kind(), MipmapErrorKind::Format);
        assert_eq!(err.phase(), Some(Phase::Validate));
        assert_eq!(err.quadrant(), Some(Quadrant::SouthEast));
        assert_eq!(err.path(), Some(Path::new("a.png")));
    }

    #[test]
    fn test_message_names_phase_and_child() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = MipmapError::io(Phase::Open, "tiles/r.0.0.png", io).in_quadrant(Quadrant::NorthEast);

        let msg = err.to_string();
        assert!(msg.starts_with("ne child tile"), "{msg}");
        assert!(msg.contains("open failed for tiles/r.0.0.png"), "{msg}");
    }

    #[test]
    fn test_size_mismatch_is_dimension_error() {
        let err = MipmapError::SizeMismatch {
            expected: 16,
            actual: 8,
        };
        assert_eq!(err.kind(), MipmapErrorKind::InvalidDimensions);
        assert_eq!(err.phase(), None);
    }
}
