//! End-to-end tests for pyramid composition.

use std::path::{Path, PathBuf};

use mipmap::codec::decode;
use mipmap::{
    compose, ChildTiles, Compositor, MipmapConfig, MipmapError, MipmapErrorKind, Phase,
    PixelFormat, Quadrant,
};
use test_utils::{
    assert_all_zero, assert_pixels_eq, block_tile, block_values, gradient_tile, reference_box_filter,
    region, striped_alpha_tile, temp_test_dir, tile_path, uniform_tile, write_garbage,
    write_reference_png,
};

const FORMATS: [PixelFormat; 2] = [PixelFormat::GrayAlpha, PixelFormat::Rgba];

fn sequential() -> Compositor {
    Compositor::new(MipmapConfig {
        parallel: false,
        ..Default::default()
    })
}

fn parallel() -> Compositor {
    Compositor::new(MipmapConfig {
        parallel: true,
        ..Default::default()
    })
}

/// Writes a child tile and returns its path.
fn child(dir: &Path, name: &str, data: &[u8], size: (usize, usize), format: PixelFormat) -> PathBuf {
    let path = dir.join(name);
    write_reference_png(&path, data, size.0, size.1, format.bytes_per_pixel());
    path
}

// ============================================================================
// Empty composition
// ============================================================================

#[test]
fn test_no_children_writes_empty_tile() {
    let dir = temp_test_dir();
    for format in FORMATS {
        for (w, h) in [(2, 2), (8, 4), (16, 16)] {
            let output = dir.path().join(format!("empty-{}-{}x{}.png", format, w, h));

            sequential()
                .compose(&output, w, h, format, &ChildTiles::default())
                .unwrap();

            let tile = decode(&output, w, h, format).unwrap();
            assert_all_zero!(tile.data());
        }
    }
}

#[test]
fn test_flat_entry_point_without_children() {
    let dir = temp_test_dir();
    let output = dir.path().join("flat.png");

    compose(&output, 4, 4, true, None, None, None, None).unwrap();

    let tile = decode(&output, 4, 4, PixelFormat::Rgba).unwrap();
    assert!(tile.is_zeroed());
}

// ============================================================================
// Quadrant isolation
// ============================================================================

#[test]
fn test_single_child_fills_only_its_quadrant() {
    let dir = temp_test_dir();
    let (w, h) = (16, 8);

    for format in FORMATS {
        let bpp = format.bytes_per_pixel();
        let data = gradient_tile(w, h, bpp);
        let path = child(dir.path(), &format!("child-{}.png", bpp), &data, (w, h), format);
        let expected = reference_box_filter(&data, w, h, bpp);

        for quadrant in Quadrant::ALL {
            let children = ChildTiles::default().with(quadrant, &path);
            let tile = sequential().compose_tile(w, h, format, &children).unwrap();
            let (row, col) = quadrant.offset(w, h);

            for other in Quadrant::ALL.into_iter().filter(|q| *q != quadrant) {
                let (r, c) = other.offset(w, h);
                assert!(
                    tile.is_region_zeroed(r, c, w / 2, h / 2),
                    "{other} not empty with only {quadrant} present"
                );
            }

            let filled = region(tile.data(), w, bpp, row, col, w / 2, h / 2);
            assert_pixels_eq!(filled, expected, bpp);
        }
    }
}

#[test]
fn test_quadrant_contents_independent_of_siblings() {
    let dir = temp_test_dir();
    let (w, h) = (8, 8);
    let format = PixelFormat::Rgba;

    let a = gradient_tile(w, h, 4);
    let b = uniform_tile(w, h, &[200, 100, 50, 255]);
    let a_path = child(dir.path(), "a.png", &a, (w, h), format);
    let b_path = child(dir.path(), "b.png", &b, (w, h), format);

    let alone = sequential()
        .compose_tile(w, h, format, &ChildTiles::default().with(Quadrant::SouthWest, &a_path))
        .unwrap();
    let together = sequential()
        .compose_tile(
            w,
            h,
            format,
            &ChildTiles::new(
                Some(b_path.as_path()),
                Some(b_path.as_path()),
                Some(a_path.as_path()),
                Some(b_path.as_path()),
            ),
        )
        .unwrap();

    let (row, col) = Quadrant::SouthWest.offset(w, h);
    assert_pixels_eq!(
        region(alone.data(), w, 4, row, col, 4, 4),
        region(together.data(), w, 4, row, col, 4, 4),
        4
    );
    assert_pixels_eq!(
        region(together.data(), w, 4, 0, 0, 4, 4),
        uniform_tile(4, 4, &[200, 100, 50, 255]),
        4
    );
}

// ============================================================================
// Downsample correctness
// ============================================================================

#[test]
fn test_uniform_blocks_are_lossless() {
    let dir = temp_test_dir();
    let (w, h) = (32, 16);

    for format in FORMATS {
        let bpp = format.bytes_per_pixel();
        let path = child(dir.path(), &format!("blocks{}.png", bpp), &block_tile(w, h, bpp), (w, h), format);

        let tile = sequential()
            .compose_tile(w, h, format, &ChildTiles::default().with(Quadrant::NorthEast, &path))
            .unwrap();

        let (row, col) = Quadrant::NorthEast.offset(w, h);
        assert_pixels_eq!(
            region(tile.data(), w, bpp, row, col, w / 2, h / 2),
            block_values(w, h, bpp),
            bpp
        );
    }
}

#[test]
fn test_truncating_average() {
    let dir = temp_test_dir();
    // 2x2 gray+alpha child: luminance {0, 0, 0, 3}, alpha {255, 255, 255, 255}
    let data = [0, 255, 0, 255, 0, 255, 3, 255];
    let path = child(dir.path(), "floor.png", &data, (2, 2), PixelFormat::GrayAlpha);

    let tile = sequential()
        .compose_tile(
            2,
            2,
            PixelFormat::GrayAlpha,
            &ChildTiles::default().with(Quadrant::NorthWest, &path),
        )
        .unwrap();

    assert_eq!(tile.pixel(0, 0), &[0, 255]);
    assert_eq!(tile.pixel(0, 1), &[0, 0]);
    assert_eq!(tile.pixel(1, 1), &[0, 0]);
}

#[test]
fn test_alpha_is_averaged_like_color() {
    let dir = temp_test_dir();
    let (w, h) = (4, 4);
    let data = striped_alpha_tile(w, h, 4);
    let path = child(dir.path(), "stripes.png", &data, (w, h), PixelFormat::Rgba);

    let tile = sequential()
        .compose_tile(w, h, PixelFormat::Rgba, &ChildTiles::default().with(Quadrant::SouthEast, &path))
        .unwrap();

    // opaque white next to transparent black: every channel halves (floor)
    assert_eq!(tile.pixel(2, 2), &[127, 127, 127, 127]);
    assert_eq!(tile.pixel(3, 3), &[127, 127, 127, 127]);
}

// ============================================================================
// Full composition and pyramid levels
// ============================================================================

#[test]
fn test_four_children_written_to_output() {
    let dir = temp_test_dir();
    let (w, h) = (16, 16);
    let format = PixelFormat::GrayAlpha;

    let tiles: Vec<Vec<u8>> = (0..4)
        .map(|i| uniform_tile(w, h, &[(i * 60) as u8, 255]))
        .collect();
    let paths: Vec<PathBuf> = (0..4)
        .map(|i| tile_path(dir.path(), 1, i % 2, i / 2))
        .collect();
    for (path, data) in paths.iter().zip(&tiles) {
        write_reference_png(path, data, w, h, 2);
    }

    let output = tile_path(dir.path(), 0, 0, 0);
    compose(
        &output,
        w,
        h,
        false,
        Some(paths[0].as_path()),
        Some(paths[1].as_path()),
        Some(paths[2].as_path()),
        Some(paths[3].as_path()),
    )
    .unwrap();

    let tile = decode(&output, w, h, format).unwrap();
    for (i, quadrant) in Quadrant::ALL.into_iter().enumerate() {
        let (row, col) = quadrant.offset(w, h);
        assert_eq!(tile.pixel(row, col), &[(i * 60) as u8, 255], "{quadrant}");
        assert_eq!(tile.pixel(row + 7, col + 7), &[(i * 60) as u8, 255], "{quadrant}");
    }
}

#[test]
fn test_composed_tile_feeds_next_level() {
    let dir = temp_test_dir();
    let (w, h) = (8, 8);
    let format = PixelFormat::Rgba;

    let base = tile_path(dir.path(), 2, 0, 0);
    write_reference_png(&base, &uniform_tile(w, h, &[40, 80, 120, 255]), w, h, 4);

    let level1 = tile_path(dir.path(), 1, 0, 0);
    sequential()
        .compose(&level1, w, h, format, &ChildTiles::default().with(Quadrant::NorthWest, &base))
        .unwrap();

    let level0 = tile_path(dir.path(), 0, 0, 0);
    sequential()
        .compose(&level0, w, h, format, &ChildTiles::default().with(Quadrant::NorthWest, &level1))
        .unwrap();

    let tile = decode(&level0, w, h, format).unwrap();
    // the base tile now covers the top-left 2x2 pixels
    assert_eq!(tile.pixel(0, 0), &[40, 80, 120, 255]);
    assert_eq!(tile.pixel(1, 1), &[40, 80, 120, 255]);
    // everything outside comes from the empty parts of level 1
    assert_eq!(tile.pixel(1, 2), &[0, 0, 0, 0]);
    assert_eq!(tile.pixel(2, 2), &[0, 0, 0, 0]);
}

#[test]
fn test_parallel_matches_sequential() {
    let dir = temp_test_dir();
    let (w, h) = (64, 32);

    for format in FORMATS {
        let bpp = format.bytes_per_pixel();
        let paths: Vec<PathBuf> = (0..4)
            .map(|i| {
                let mut data = gradient_tile(w, h, bpp);
                data.iter_mut().for_each(|b| *b = b.wrapping_add(i * 13));
                child(dir.path(), &format!("p{}-{}.png", bpp, i), &data, (w, h), format)
            })
            .collect();

        let children = ChildTiles::new(
            Some(paths[0].as_path()),
            Some(paths[1].as_path()),
            None,
            Some(paths[3].as_path()),
        );
        let seq = sequential().compose_tile(w, h, format, &children).unwrap();
        let par = parallel().compose_tile(w, h, format, &children).unwrap();

        assert_pixels_eq!(par.data(), seq.data(), bpp);
        assert!(par.is_region_zeroed(h / 2, 0, w / 2, h / 2));
    }
}

// ============================================================================
// Error handling
// ============================================================================

#[test]
fn test_odd_dimensions_rejected() {
    let dir = temp_test_dir();
    let output = dir.path().join("odd.png");

    for (w, h) in [(7, 8), (8, 7), (1, 1), (0, 4)] {
        let err = sequential()
            .compose(&output, w, h, PixelFormat::Rgba, &ChildTiles::default())
            .unwrap_err();
        assert!(matches!(err, MipmapError::InvalidDimensions { .. }), "{err}");
    }
    assert!(!output.exists());
}

#[test]
fn test_bad_child_aborts_whole_call() {
    let dir = temp_test_dir();
    let (w, h) = (8, 8);
    let good = child(dir.path(), "good.png", &gradient_tile(w, h, 4), (w, h), PixelFormat::Rgba);
    let bad = dir.path().join("bad.png");
    write_garbage(&bad);
    let output = dir.path().join("out.png");

    for compositor in [sequential(), parallel()] {
        let children =
            ChildTiles::new(Some(good.as_path()), None, Some(bad.as_path()), Some(good.as_path()));
        let err = compositor
            .compose(&output, w, h, PixelFormat::Rgba, &children)
            .unwrap_err();

        assert_eq!(err.kind(), MipmapErrorKind::Format);
        assert_eq!(err.phase(), Some(Phase::Decode));
        assert_eq!(err.quadrant(), Some(Quadrant::SouthWest));
        assert_eq!(err.path(), Some(bad.as_path()));
        assert!(!output.exists());
    }
}

#[test]
fn test_mismatched_child_is_format_error() {
    let dir = temp_test_dir();
    let small = child(dir.path(), "small.png", &gradient_tile(4, 4, 4), (4, 4), PixelFormat::Rgba);
    let output = dir.path().join("out.png");

    let err = sequential()
        .compose(
            &output,
            8,
            8,
            PixelFormat::Rgba,
            &ChildTiles::default().with(Quadrant::NorthEast, &small),
        )
        .unwrap_err();

    assert_eq!(err.kind(), MipmapErrorKind::Format);
    assert_eq!(err.phase(), Some(Phase::Validate));
    assert_eq!(err.quadrant(), Some(Quadrant::NorthEast));
}

#[test]
fn test_missing_child_file_is_io_error() {
    let dir = temp_test_dir();
    let missing = dir.path().join("missing.png");
    let output = dir.path().join("out.png");

    let err = compose(&output, 4, 4, false, None, Some(missing.as_path()), None, None).unwrap_err();

    assert_eq!(err.kind(), MipmapErrorKind::Io);
    assert_eq!(err.quadrant(), Some(Quadrant::NorthEast));
    assert!(err.to_string().contains("missing.png"), "{err}");
    assert!(!output.exists());
}

#[test]
fn test_unwritable_output_is_io_error() {
    let dir = temp_test_dir();
    let output = dir.path().join("no-such-dir").join("out.png");

    let err = compose(&output, 4, 4, true, None, None, None, None).unwrap_err();
    assert_eq!(err.kind(), MipmapErrorKind::Io);
    assert_eq!(err.quadrant(), None);
}
