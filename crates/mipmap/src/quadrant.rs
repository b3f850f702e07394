//! Quadrant geometry and the 2x2 box filter.
//!
//! A parent tile at zoom level `z` is assembled from four children at level
//! `z + 1`. Each child is reduced to half resolution and lands in one quadrant:
//!
//! ```text
//!  +----+----+
//!  | NW | NE |
//!  +----+----+
//!  | SW | SE |
//!  +----+----+
//! ```

use std::fmt;
use std::path::Path;

use tracing::{debug, debug_span};

use crate::codec;
use crate::error::{MipmapError, Result};
use crate::raster::{PixelFormat, RasterBuffer};

/// One of the four sub-regions of a parent tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quadrant {
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::NorthWest,
        Quadrant::NorthEast,
        Quadrant::SouthWest,
        Quadrant::SouthEast,
    ];

    /// Pixel offset `(row, col)` of this quadrant in a `width` x `height` parent.
    pub fn offset(self, width: usize, height: usize) -> (usize, usize) {
        let (half_w, half_h) = (width / 2, height / 2);
        match self {
            Quadrant::NorthWest => (0, 0),
            Quadrant::NorthEast => (0, half_w),
            Quadrant::SouthWest => (half_h, 0),
            Quadrant::SouthEast => (half_h, half_w),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Quadrant::NorthWest => "nw",
            Quadrant::NorthEast => "ne",
            Quadrant::SouthWest => "sw",
            Quadrant::SouthEast => "se",
        }
    }
}

impl fmt::Display for Quadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parent tiles must split into four equal quadrants.
pub fn validate_dimensions(width: usize, height: usize) -> Result<()> {
    if width == 0 || height == 0 || width % 2 != 0 || height % 2 != 0 {
        return Err(MipmapError::InvalidDimensions { width, height });
    }
    Ok(())
}

/// Box-filter `src` to half resolution, writing the result into `dst` with its
/// top-left corner at (`row`, `col`).
///
/// Each output channel is the floor of the mean of the four source channels in
/// the corresponding 2x2 block. Alpha is averaged like any other channel.
pub fn box_filter_into(src: &RasterBuffer, dst: &mut RasterBuffer, row: usize, col: usize) {
    let bpp = src.bytes_per_pixel();
    let half_w = src.width() / 2;
    let half_h = src.height() / 2;
    assert_eq!(src.format(), dst.format(), "pixel format mismatch");
    assert!(
        row + half_h <= dst.height() && col + half_w <= dst.width(),
        "half-resolution image does not fit at ({row}, {col})"
    );

    let src_stride = src.stride();
    let src_data = src.data();

    for h in 0..half_h {
        let top = &src_data[2 * h * src_stride..][..src_stride];
        let bottom = &src_data[(2 * h + 1) * src_stride..][..src_stride];
        let out = &mut dst.row_mut(row + h)[col * bpp..(col + half_w) * bpp];

        for w in 0..half_w {
            for c in 0..bpp {
                let i = 2 * w * bpp + c;
                let sum = top[i] as u16 + top[i + bpp] as u16 + bottom[i] as u16 + bottom[i + bpp] as u16;
                out[w * bpp + c] = (sum / 4) as u8;
            }
        }
    }
}

/// Box-filter `src` into a new half-resolution buffer.
pub fn box_filter(src: &RasterBuffer) -> Result<RasterBuffer> {
    let mut dst = RasterBuffer::new(src.width() / 2, src.height() / 2, src.format())?;
    box_filter_into(src, &mut dst, 0, 0);
    Ok(dst)
}

/// Decode the child tile of `quadrant` and reduce it to half resolution.
///
/// The child must have the same `width`, `height` and `format` as its parent.
/// Errors are attributed to `quadrant`.
pub fn downsample(
    quadrant: Quadrant,
    child: &Path,
    width: usize,
    height: usize,
    format: PixelFormat,
) -> Result<RasterBuffer> {
    let _span = debug_span!("quadrant", %quadrant).entered();

    let source = codec::decode(child, width, height, format).map_err(|e| e.in_quadrant(quadrant))?;
    let half = box_filter(&source).map_err(|e| e.in_quadrant(quadrant))?;

    debug!(child = %child.display(), "downsampled child tile");
    Ok(half)
}

/// Fill `quadrant` of `parent` from its child tile.
///
/// With no child this is a no-op: the quadrant keeps whatever the parent was
/// initialized with. The child decode buffer is dropped before returning.
pub fn downsample_into(parent: &mut RasterBuffer, quadrant: Quadrant, child: Option<&Path>) -> Result<()> {
    let Some(child) = child else {
        debug!(%quadrant, "no child tile, quadrant left empty");
        return Ok(());
    };
    validate_dimensions(parent.width(), parent.height())?;

    let _span = debug_span!("quadrant", %quadrant).entered();

    let source = codec::decode(child, parent.width(), parent.height(), parent.format())
        .map_err(|e| e.in_quadrant(quadrant))?;
    let (row, col) = quadrant.offset(parent.width(), parent.height());
    box_filter_into(&source, parent, row, col);

    debug!(child = %child.display(), "downsampled child tile");
    Ok(())
}

/// Copy an already downsampled child into `quadrant` of `parent`.
pub fn write_quadrant(parent: &mut RasterBuffer, quadrant: Quadrant, half: &RasterBuffer) {
    let (row, col) = quadrant.offset(parent.width(), parent.height());
    parent.copy_from(half, row, col);
}
