//! In-memory pixel buffers for tiles.
//!
//! A [`RasterBuffer`] is a row-major grid of fixed-width pixel records with no
//! row padding. Channel order within a pixel follows the PNG sample order
//! (`L, A` or `R, G, B, A`), so rows can be handed to the codec verbatim.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{MipmapError, Result};

/// Channel layout of a tile. Every tile in a pyramid shares one layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelFormat {
    /// Luminance + alpha, 2 bytes per pixel.
    GrayAlpha,
    /// Red, green, blue + alpha, 4 bytes per pixel.
    Rgba,
}

impl PixelFormat {
    /// Select the format from the `colored` flag used by tile drivers.
    pub fn from_colored(colored: bool) -> Self {
        if colored {
            PixelFormat::Rgba
        } else {
            PixelFormat::GrayAlpha
        }
    }

    #[inline]
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::GrayAlpha => 2,
            PixelFormat::Rgba => 4,
        }
    }

    /// PNG color type for this layout (4 = gray+alpha, 6 = RGBA).
    pub const fn png_color_type(self) -> u8 {
        match self {
            PixelFormat::GrayAlpha => 4,
            PixelFormat::Rgba => 6,
        }
    }

    pub fn from_png_color_type(color_type: u8) -> Option<Self> {
        match color_type {
            4 => Some(PixelFormat::GrayAlpha),
            6 => Some(PixelFormat::Rgba),
            _ => None,
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PixelFormat::GrayAlpha => f.write_str("gray+alpha"),
            PixelFormat::Rgba => f.write_str("rgba"),
        }
    }
}

/// Number of bytes needed for a `width` x `height` buffer, or `None` on overflow.
pub fn buffer_len(width: usize, height: usize, format: PixelFormat) -> Option<usize> {
    width
        .checked_mul(height)?
        .checked_mul(format.bytes_per_pixel())
}

/// A rectangular tile image held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterBuffer {
    width: usize,
    height: usize,
    format: PixelFormat,
    data: Vec<u8>,
}

impl RasterBuffer {
    /// Allocate a zero-filled (fully transparent) buffer.
    ///
    /// Returns [`MipmapError::Allocation`] if the size overflows or the
    /// allocator refuses the request.
    pub fn new(width: usize, height: usize, format: PixelFormat) -> Result<Self> {
        let alloc_err = || MipmapError::Allocation {
            width,
            height,
            format,
        };

        let len = buffer_len(width, height, format).ok_or_else(alloc_err)?;
        let mut data = Vec::new();
        data.try_reserve_exact(len).map_err(|_| alloc_err())?;
        data.resize(len, 0);

        Ok(Self {
            width,
            height,
            format,
            data,
        })
    }

    /// Wrap existing pixel data. The length must match the shape exactly.
    pub fn from_vec(width: usize, height: usize, format: PixelFormat, data: Vec<u8>) -> Result<Self> {
        let expected = buffer_len(width, height, format).ok_or(MipmapError::Allocation {
            width,
            height,
            format,
        })?;

        if data.len() != expected {
            return Err(MipmapError::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            format,
            data,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    #[inline]
    pub fn bytes_per_pixel(&self) -> usize {
        self.format.bytes_per_pixel()
    }

    /// Bytes per row.
    #[inline]
    pub fn stride(&self) -> usize {
        self.width * self.bytes_per_pixel()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    pub fn row(&self, row: usize) -> &[u8] {
        let stride = self.stride();
        &self.data[row * stride..(row + 1) * stride]
    }

    pub fn row_mut(&mut self, row: usize) -> &mut [u8] {
        let stride = self.stride();
        &mut self.data[row * stride..(row + 1) * stride]
    }

    /// All channels of the pixel at (`row`, `col`).
    ///
    /// # Panics
    /// If the coordinates are outside the buffer.
    pub fn pixel(&self, row: usize, col: usize) -> &[u8] {
        let offset = self.offset(row, col);
        &self.data[offset..offset + self.bytes_per_pixel()]
    }

    pub fn pixel_mut(&mut self, row: usize, col: usize) -> &mut [u8] {
        let offset = self.offset(row, col);
        let bpp = self.bytes_per_pixel();
        &mut self.data[offset..offset + bpp]
    }

    pub fn get(&self, row: usize, col: usize, channel: usize) -> u8 {
        self.pixel(row, col)[channel]
    }

    pub fn set(&mut self, row: usize, col: usize, channel: usize, value: u8) {
        self.pixel_mut(row, col)[channel] = value;
    }

    /// True if every channel of every pixel is zero.
    pub fn is_zeroed(&self) -> bool {
        self.data.iter().all(|&b| b == 0)
    }

    /// True if the `width` x `height` window starting at (`row`, `col`) is all zero.
    pub fn is_region_zeroed(&self, row: usize, col: usize, width: usize, height: usize) -> bool {
        let bpp = self.bytes_per_pixel();
        (row..row + height).all(|r| {
            self.row(r)[col * bpp..(col + width) * bpp]
                .iter()
                .all(|&b| b == 0)
        })
    }

    /// Copy `src` into this buffer with its top-left corner at (`row`, `col`).
    ///
    /// # Panics
    /// If the formats differ or `src` does not fit at that position.
    pub fn copy_from(&mut self, src: &RasterBuffer, row: usize, col: usize) {
        assert_eq!(self.format, src.format, "pixel format mismatch");
        assert!(
            row + src.height <= self.height && col + src.width <= self.width,
            "{}x{} source does not fit at ({row}, {col}) in {}x{} buffer",
            src.width,
            src.height,
            self.width,
            self.height
        );

        let bpp = self.bytes_per_pixel();
        for r in 0..src.height {
            let dst_row = self.row_mut(row + r);
            dst_row[col * bpp..(col + src.width) * bpp].copy_from_slice(src.row(r));
        }
    }

    #[inline]
    fn offset(&self, row: usize, col: usize) -> usize {
        assert!(
            row < self.height && col < self.width,
            "pixel ({row}, {col}) outside {}x{} buffer",
            self.width,
            self.height
        );
        (row * self.width + col) * self.bytes_per_pixel()
    }
}
