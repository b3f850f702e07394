//! File-level tile codec.
//!
//! Maps the in-memory [`png`](crate::png) codec onto tile files and converts
//! its failures into [`MipmapError`]s tagged with the phase and path. File
//! handles never outlive a single `decode` or `encode` call.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use flate2::Compression;
use tracing::{debug, trace};

use crate::error::{MipmapError, Phase, Result};
use crate::png::{self, PngError};
use crate::raster::{PixelFormat, RasterBuffer};

/// Read a tile file and decode it into a buffer of exactly the requested shape.
///
/// Fails with an Io error if the file cannot be opened or read, and a Format
/// error if it is not a valid PNG or its width, height, bit depth or color
/// layout differ from the request.
pub fn decode(path: &Path, width: usize, height: usize, format: PixelFormat) -> Result<RasterBuffer> {
    let bytes = read_file(path)?;

    let header = png::read_header(&bytes).map_err(|e| png_error(Phase::Decode, path, e))?;
    header
        .validate(width, height, format)
        .map_err(|e| png_error(Phase::Validate, path, e))?;

    let mut buffer = RasterBuffer::new(width, height, format)?;
    png::decode_into(&bytes, buffer.data_mut(), width, format)
        .map_err(|e| png_error(Phase::Decode, path, e))?;

    trace!(path = %path.display(), bytes = bytes.len(), "decoded tile");
    Ok(buffer)
}

/// Encode `buffer` and write it to `path`.
///
/// The PNG is written to a temporary file next to `path` and renamed into
/// place only once complete, so a failed encode leaves no file at `path`
/// (an existing file there is left untouched).
pub fn encode(path: &Path, buffer: &RasterBuffer, level: Compression) -> Result<()> {
    let data = png::encode_png(buffer, level).map_err(|e| png_error(Phase::Encode, path, e))?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(".tile-")
        .suffix(".png.tmp")
        .tempfile_in(dir)
        .map_err(|e| MipmapError::io(Phase::Open, path, e))?;

    tmp.write_all(&data)
        .and_then(|_| tmp.flush())
        .map_err(|e| MipmapError::io(Phase::Write, path, e))?;

    // Temporary files are created owner-only.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o644))
            .map_err(|e| MipmapError::io(Phase::Write, path, e))?;
    }

    tmp.persist(path)
        .map_err(|e| MipmapError::io(Phase::Persist, path, e.error))?;

    debug!(path = %path.display(), bytes = data.len(), "wrote tile");
    Ok(())
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    let mut file = File::open(path).map_err(|e| MipmapError::io(Phase::Open, path, e))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| MipmapError::io(Phase::Read, path, e))?;
    Ok(bytes)
}

fn png_error(phase: Phase, path: &Path, err: PngError) -> MipmapError {
    MipmapError::format(phase, path, err.to_string())
}
