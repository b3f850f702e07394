//! Configuration for tile composition.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Configuration for the compositor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MipmapConfig {
    /// zlib effort for encoded tiles.
    pub compression: TileCompression,

    /// Decode and downsample the four children on the rayon pool.
    pub parallel: bool,

    /// Edge length of a square tile, used by drivers that do not pass
    /// explicit dimensions.
    pub tile_size: usize,
}

impl Default for MipmapConfig {
    fn default() -> Self {
        Self {
            compression: TileCompression::Fast,
            parallel: true,
            tile_size: 512,
        }
    }
}

impl MipmapConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("MIPMAP_COMPRESSION") {
            match val.parse() {
                Ok(level) => config.compression = level,
                Err(e) => warn!(error = %e, "ignoring MIPMAP_COMPRESSION"),
            }
        }

        if let Ok(val) = std::env::var("MIPMAP_PARALLEL") {
            config.parallel = val.to_lowercase() == "true" || val == "1";
        }

        if let Ok(val) = std::env::var("MIPMAP_TILE_SIZE") {
            if let Ok(size) = val.parse() {
                config.tile_size = size;
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.tile_size == 0 {
            return Err("tile_size must be > 0".to_string());
        }

        if self.tile_size % 2 != 0 {
            return Err(format!("tile_size must be even, got {}", self.tile_size));
        }

        Ok(())
    }
}

/// Compression effort for the IDAT stream of written tiles.
///
/// Tiles are always lossless; this only trades encode time for file size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileCompression {
    #[default]
    Fast,
    Default,
    Best,
}

impl TileCompression {
    pub fn level(self) -> flate2::Compression {
        match self {
            TileCompression::Fast => flate2::Compression::fast(),
            TileCompression::Default => flate2::Compression::default(),
            TileCompression::Best => flate2::Compression::best(),
        }
    }
}

impl FromStr for TileCompression {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fast" => Ok(TileCompression::Fast),
            "default" => Ok(TileCompression::Default),
            "best" => Ok(TileCompression::Best),
            other => Err(format!("unknown compression level '{}'", other)),
        }
    }
}

impl fmt::Display for TileCompression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TileCompression::Fast => "fast",
            TileCompression::Default => "default",
            TileCompression::Best => "best",
        };
        f.write_str(name)
    }
}
