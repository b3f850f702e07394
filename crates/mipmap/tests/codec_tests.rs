//! Tests for the file-level tile codec.
//!
//! Decoding is checked against PNGs written by the `image` crate (adaptive
//! and fixed filters), and encoding is checked by decoding our output with the
//! `image` crate.

use mipmap::codec::{decode, encode};
use mipmap::{MipmapErrorKind, Phase, PixelFormat, RasterBuffer, TileCompression};
use test_utils::{
    assert_pixels_eq, gradient_tile, read_reference_png, temp_test_dir, write_16bit_png,
    write_garbage, write_reference_png, write_reference_png_with_filter, write_rgb_png, PngFilter,
};

const FORMATS: [PixelFormat; 2] = [PixelFormat::GrayAlpha, PixelFormat::Rgba];

// ============================================================================
// Round trip
// ============================================================================

#[test]
fn test_round_trip_is_byte_identical() {
    let dir = temp_test_dir();
    for format in FORMATS {
        for level in [TileCompression::Fast, TileCompression::Default, TileCompression::Best] {
            let bpp = format.bytes_per_pixel();
            let data = gradient_tile(32, 16, bpp);
            let buffer = RasterBuffer::from_vec(32, 16, format, data).unwrap();
            let path = dir.path().join(format!("{}-{}.png", bpp, level));

            encode(&path, &buffer, level.level()).unwrap();
            let decoded = decode(&path, 32, 16, format).unwrap();

            assert_eq!(decoded.format(), format);
            assert_pixels_eq!(decoded.data(), buffer.data(), bpp);
        }
    }
}

#[test]
fn test_encoded_tile_is_readable_by_image_crate() {
    let dir = temp_test_dir();
    for format in FORMATS {
        let bpp = format.bytes_per_pixel();
        let data = gradient_tile(20, 12, bpp);
        let buffer = RasterBuffer::from_vec(20, 12, format, data.clone()).unwrap();
        let path = dir.path().join(format!("out{}.png", bpp));

        encode(&path, &buffer, TileCompression::Fast.level()).unwrap();
        let img = read_reference_png(&path);

        assert_eq!((img.width, img.height, img.bpp), (20, 12, bpp));
        assert_pixels_eq!(img.data, data, bpp);
    }
}

#[test]
fn test_encode_replaces_existing_tile() {
    let dir = temp_test_dir();
    let path = dir.path().join("tile.png");
    let first = RasterBuffer::from_vec(2, 2, PixelFormat::GrayAlpha, vec![1; 8]).unwrap();
    let second = RasterBuffer::from_vec(2, 2, PixelFormat::GrayAlpha, vec![2; 8]).unwrap();

    encode(&path, &first, TileCompression::Fast.level()).unwrap();
    encode(&path, &second, TileCompression::Fast.level()).unwrap();

    let decoded = decode(&path, 2, 2, PixelFormat::GrayAlpha).unwrap();
    assert_eq!(decoded, second);
}

// ============================================================================
// Decoding output of an independent encoder
// ============================================================================

#[test]
fn test_decode_reference_png_adaptive_filter() {
    let dir = temp_test_dir();
    for format in FORMATS {
        let bpp = format.bytes_per_pixel();
        let data = gradient_tile(64, 48, bpp);
        let path = dir.path().join(format!("ref{}.png", bpp));
        write_reference_png(&path, &data, 64, 48, bpp);

        let decoded = decode(&path, 64, 48, format).unwrap();
        assert_pixels_eq!(decoded.data(), data, bpp);
    }
}

#[test]
fn test_decode_reference_png_each_filter() {
    let dir = temp_test_dir();
    let filters = [
        PngFilter::NoFilter,
        PngFilter::Sub,
        PngFilter::Up,
        PngFilter::Avg,
        PngFilter::Paeth,
    ];

    for format in FORMATS {
        let bpp = format.bytes_per_pixel();
        let data = gradient_tile(17 * 2, 9 * 2, bpp);
        for (i, filter) in filters.into_iter().enumerate() {
            let path = dir.path().join(format!("f{}-{}.png", bpp, i));
            write_reference_png_with_filter(&path, &data, 34, 18, bpp, filter);

            let decoded = decode(&path, 34, 18, format).unwrap();
            assert_pixels_eq!(decoded.data(), data, bpp);
        }
    }
}

// ============================================================================
// Validation rejection
// ============================================================================

fn assert_validation_error(err: mipmap::MipmapError) {
    assert_eq!(err.kind(), MipmapErrorKind::Format, "{err}");
    assert_eq!(err.phase(), Some(Phase::Validate), "{err}");
}

#[test]
fn test_decode_rejects_wrong_width_or_height() {
    let dir = temp_test_dir();
    let path = dir.path().join("tile.png");
    write_reference_png(&path, &gradient_tile(8, 8, 4), 8, 8, 4);

    assert_validation_error(decode(&path, 16, 8, PixelFormat::Rgba).unwrap_err());
    assert_validation_error(decode(&path, 8, 4, PixelFormat::Rgba).unwrap_err());
    assert_validation_error(decode(&path, 4, 4, PixelFormat::Rgba).unwrap_err());
}

#[test]
fn test_decode_rejects_wrong_layout() {
    let dir = temp_test_dir();

    let gray = dir.path().join("gray.png");
    write_reference_png(&gray, &gradient_tile(8, 8, 2), 8, 8, 2);
    assert_validation_error(decode(&gray, 8, 8, PixelFormat::Rgba).unwrap_err());

    let rgba = dir.path().join("rgba.png");
    write_reference_png(&rgba, &gradient_tile(8, 8, 4), 8, 8, 4);
    assert_validation_error(decode(&rgba, 8, 8, PixelFormat::GrayAlpha).unwrap_err());

    let rgb = dir.path().join("rgb.png");
    write_rgb_png(&rgb, 8, 8);
    assert_validation_error(decode(&rgb, 8, 8, PixelFormat::Rgba).unwrap_err());
}

#[test]
fn test_decode_rejects_16_bit() {
    let dir = temp_test_dir();
    let path = dir.path().join("deep.png");
    write_16bit_png(&path, 8, 8);

    let err = decode(&path, 8, 8, PixelFormat::Rgba).unwrap_err();
    assert_validation_error(err);
}

#[test]
fn test_decode_rejects_garbage() {
    let dir = temp_test_dir();
    let path = dir.path().join("garbage.png");
    write_garbage(&path);

    let err = decode(&path, 8, 8, PixelFormat::Rgba).unwrap_err();
    assert_eq!(err.kind(), MipmapErrorKind::Format);
    assert_eq!(err.phase(), Some(Phase::Decode));
    assert_eq!(err.path(), Some(path.as_path()));
}

#[test]
fn test_decode_rejects_truncated_file() {
    let dir = temp_test_dir();
    let path = dir.path().join("tile.png");
    write_reference_png(&path, &gradient_tile(32, 32, 4), 32, 32, 4);

    let bytes = std::fs::read(&path).unwrap();
    std::fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();

    let err = decode(&path, 32, 32, PixelFormat::Rgba).unwrap_err();
    assert_eq!(err.kind(), MipmapErrorKind::Format);
    assert_eq!(err.phase(), Some(Phase::Decode));
}

#[test]
fn test_decode_missing_file_is_io_error() {
    let dir = temp_test_dir();
    let err = decode(&dir.path().join("absent.png"), 8, 8, PixelFormat::Rgba).unwrap_err();

    assert_eq!(err.kind(), MipmapErrorKind::Io);
    assert_eq!(err.phase(), Some(Phase::Open));
    assert!(matches!(
        err,
        mipmap::MipmapError::Io { ref source, .. } if source.kind() == std::io::ErrorKind::NotFound
    ));
}
