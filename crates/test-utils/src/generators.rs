//! Test data generators for synthetic tile pixels.
//!
//! All generators return row-major pixel bytes with `bpp` bytes per pixel
//! (2 for gray+alpha, 4 for RGBA), the same layout the tile codec uses.

/// Creates a tile where every pixel is `pixel`.
///
/// # Example
///
/// ```
/// use test_utils::uniform_tile;
///
/// let tile = uniform_tile(2, 2, &[10, 255]);
/// assert_eq!(tile, vec![10, 255, 10, 255, 10, 255, 10, 255]);
/// ```
pub fn uniform_tile(width: usize, height: usize, pixel: &[u8]) -> Vec<u8> {
    pixel.repeat(width * height)
}

/// Creates a tile with predictable, position-dependent values.
///
/// Channel `c` of the pixel at (`row`, `col`) is `(row * 7 + col * 3 + c * 11) % 256`,
/// so neighbouring pixels differ and every 2x2 block averages to a
/// non-trivial value.
pub fn gradient_tile(width: usize, height: usize, bpp: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(width * height * bpp);
    for row in 0..height {
        for col in 0..width {
            for c in 0..bpp {
                data.push(((row * 7 + col * 3 + c * 11) % 256) as u8);
            }
        }
    }
    data
}

/// Creates a tile where every aligned 2x2 block is uniform.
///
/// Channel `c` of block (`br`, `bc`) is `(br * 31 + bc * 17 + c * 5) % 256`.
/// Box-filtering such a tile is lossless, so its half-resolution image is
/// exactly [`block_values`].
pub fn block_tile(width: usize, height: usize, bpp: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(width * height * bpp);
    for row in 0..height {
        for col in 0..width {
            for c in 0..bpp {
                data.push(block_value(row / 2, col / 2, c));
            }
        }
    }
    data
}

/// The half-resolution image of [`block_tile`].
pub fn block_values(width: usize, height: usize, bpp: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(width / 2 * height / 2 * bpp);
    for br in 0..height / 2 {
        for bc in 0..width / 2 {
            for c in 0..bpp {
                data.push(block_value(br, bc, c));
            }
        }
    }
    data
}

fn block_value(br: usize, bc: usize, c: usize) -> u8 {
    ((br * 31 + bc * 17 + c * 5) % 256) as u8
}

/// Creates a tile of alternating opaque and fully transparent columns.
///
/// Opaque pixels have every color channel at 255.
pub fn striped_alpha_tile(width: usize, height: usize, bpp: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(width * height * bpp);
    for _ in 0..height {
        for col in 0..width {
            let value = if col % 2 == 0 { 255 } else { 0 };
            data.extend(std::iter::repeat(value).take(bpp));
        }
    }
    data
}

/// Straightforward 2x2 floor-mean reduction, used as a reference in tests.
pub fn reference_box_filter(data: &[u8], width: usize, height: usize, bpp: usize) -> Vec<u8> {
    let at = |row: usize, col: usize, c: usize| data[(row * width + col) * bpp + c] as u32;
    let mut out = Vec::with_capacity(width / 2 * height / 2 * bpp);
    for h in 0..height / 2 {
        for w in 0..width / 2 {
            for c in 0..bpp {
                let sum = at(2 * h, 2 * w, c)
                    + at(2 * h, 2 * w + 1, c)
                    + at(2 * h + 1, 2 * w, c)
                    + at(2 * h + 1, 2 * w + 1, c);
                out.push((sum / 4) as u8);
            }
        }
    }
    out
}

/// Extracts the `width` x `height` window at (`row`, `col`) from a tile of
/// `tile_width` pixels per row.
pub fn region(
    data: &[u8],
    tile_width: usize,
    bpp: usize,
    row: usize,
    col: usize,
    width: usize,
    height: usize,
) -> Vec<u8> {
    let stride = tile_width * bpp;
    let mut out = Vec::with_capacity(width * height * bpp);
    for r in row..row + height {
        out.extend_from_slice(&data[r * stride + col * bpp..][..width * bpp]);
    }
    out
}
