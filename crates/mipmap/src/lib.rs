//! Tile pyramid ("mipmap") composition for tiled map rendering.
//!
//! Given up to four sibling tiles at one zoom level, builds the tile covering
//! the same area at the next coarser level. Each child is box-filtered to half
//! resolution and placed into one quadrant of a zero-filled parent, which is
//! then written back out as a PNG.
//!
//! # Architecture
//!
//! ```text
//! compose(output, width, height, format, children)
//!      │
//!      ├─► RasterBuffer::new (zero-filled parent)
//!      │
//!      ├─► for each present child (optionally on the rayon pool)
//!      │         │
//!      │         ├─► codec::decode (open, parse, validate shape)
//!      │         │
//!      │         └─► 2x2 floor-mean box filter into the quadrant
//!      │
//!      └─► codec::encode (temp file + rename)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use mipmap::{ChildTiles, Compositor, MipmapConfig, PixelFormat, Quadrant};
//! use std::path::Path;
//!
//! let compositor = Compositor::new(MipmapConfig::from_env());
//! let children = ChildTiles::default()
//!     .with(Quadrant::NorthWest, Path::new("map/3/r.0.0.png"))
//!     .with(Quadrant::SouthEast, Path::new("map/3/r.1.1.png"));
//!
//! compositor.compose(Path::new("map/2/r.0.0.png"), 512, 512, PixelFormat::Rgba, &children)?;
//! ```

pub mod codec;
pub mod compose;
pub mod config;
pub mod error;
pub mod png;
pub mod quadrant;
pub mod raster;

// Re-export commonly used types at crate root
pub use compose::{compose, ChildTiles, Compositor};
pub use config::{MipmapConfig, TileCompression};
pub use error::{MipmapError, MipmapErrorKind, Phase, Result};
pub use quadrant::{box_filter, downsample_into, Quadrant};
pub use raster::{PixelFormat, RasterBuffer};
