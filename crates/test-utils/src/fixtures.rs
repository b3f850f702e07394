//! Tile fixtures written and read with the `image` crate.
//!
//! Tiles produced here come from an encoder that is independent of the one
//! under test, so decoder tests see real-world filter choices and chunk
//! layouts rather than our own output.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::codecs::png::{CompressionType, PngEncoder};
use image::{ColorType, DynamicImage, GenericImageView, ImageEncoder};

pub use image::codecs::png::FilterType as PngFilter;

fn color_type(bpp: usize) -> ColorType {
    match bpp {
        2 => ColorType::La8,
        4 => ColorType::Rgba8,
        other => panic!("unsupported tile layout: {} bytes per pixel", other),
    }
}

/// Writes `data` as an 8-bit PNG using adaptive (per-row) filtering.
///
/// `bpp` selects gray+alpha (2) or RGBA (4).
pub fn write_reference_png(path: &Path, data: &[u8], width: usize, height: usize, bpp: usize) {
    write_reference_png_with_filter(path, data, width, height, bpp, PngFilter::Adaptive);
}

/// Writes `data` as an 8-bit PNG using a single scanline filter.
pub fn write_reference_png_with_filter(
    path: &Path,
    data: &[u8],
    width: usize,
    height: usize,
    bpp: usize,
    filter: PngFilter,
) {
    let file = File::create(path).expect("Failed to create fixture PNG");
    let encoder = PngEncoder::new_with_quality(BufWriter::new(file), CompressionType::Best, filter);
    encoder
        .write_image(data, width as u32, height as u32, color_type(bpp))
        .expect("Failed to encode fixture PNG");
}

/// Writes a 16-bit-per-channel RGBA PNG of zeros.
pub fn write_16bit_png(path: &Path, width: usize, height: usize) {
    let data = vec![0u8; width * height * 8];
    image::save_buffer(path, &data, width as u32, height as u32, ColorType::Rgba16)
        .expect("Failed to write 16-bit fixture PNG");
}

/// Writes an 8-bit RGB PNG (no alpha channel).
pub fn write_rgb_png(path: &Path, width: usize, height: usize) {
    let data = vec![128u8; width * height * 3];
    image::save_buffer(path, &data, width as u32, height as u32, ColorType::Rgb8)
        .expect("Failed to write RGB fixture PNG");
}

/// Writes bytes that are not an image at all.
pub fn write_garbage(path: &Path) {
    std::fs::write(path, b"this is not a PNG file").expect("Failed to write garbage fixture");
}

/// A decoded image as seen by the `image` crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceImage {
    pub width: usize,
    pub height: usize,
    /// Bytes per pixel: 2 for gray+alpha, 4 for RGBA.
    pub bpp: usize,
    pub data: Vec<u8>,
}

/// Decodes an 8-bit gray+alpha or RGBA PNG with the `image` crate.
///
/// Panics on any other layout.
pub fn read_reference_png(path: &Path) -> ReferenceImage {
    let img = image::open(path).expect("Failed to decode PNG with image crate");
    let (width, height) = (img.width() as usize, img.height() as usize);
    let (bpp, data) = match img {
        DynamicImage::ImageLumaA8(buf) => (2, buf.into_raw()),
        DynamicImage::ImageRgba8(buf) => (4, buf.into_raw()),
        other => panic!("unexpected PNG layout: {:?}", other.color()),
    };

    ReferenceImage {
        width,
        height,
        bpp,
        data,
    }
}
