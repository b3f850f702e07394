//! PNG encoding and decoding for tile pixel data.
//!
//! Only the two layouts tiles use are handled: 8-bit gray+alpha (color type 4)
//! and 8-bit RGBA (color type 6), non-interlaced.
//!
//! - **Encoding** writes a single IDAT of unfiltered scanlines, so the output
//!   is deterministic for a given buffer and compression level.
//! - **Decoding** accepts any conforming encoder's output for those layouts:
//!   multiple IDAT chunks, all five scanline filters, ancillary chunks. Every
//!   chunk CRC is checked.

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use thiserror::Error;

use crate::raster::{buffer_len, PixelFormat, RasterBuffer};

/// The 8-byte PNG file signature.
pub const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Largest width/height a PNG header may declare.
const MAX_DIMENSION: u32 = i32::MAX as u32;

/// Errors from the in-memory PNG codec.
#[derive(Error, Debug)]
pub enum PngError {
    /// The data is not a well-formed PNG stream.
    #[error("malformed PNG: {0}")]
    Malformed(String),

    /// A well-formed PNG that does not have the requested shape.
    #[error("{0}")]
    Mismatch(String),

    /// The zlib stream could not be produced.
    #[error("IDAT compression failed: {0}")]
    Compression(#[from] std::io::Error),

    /// The image is too large for a PNG header.
    #[error("{width}x{height} exceeds PNG dimension limits")]
    TooLarge { width: usize, height: usize },
}

fn malformed(msg: impl Into<String>) -> PngError {
    PngError::Malformed(msg.into())
}

/// Fields of the IHDR chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PngHeader {
    pub width: u32,
    pub height: u32,
    pub bit_depth: u8,
    pub color_type: u8,
    pub interlace: u8,
}

impl PngHeader {
    /// Check this header against the tile shape the caller expects.
    ///
    /// No coercion is attempted: any difference is reported as a mismatch.
    pub fn validate(&self, width: usize, height: usize, format: PixelFormat) -> Result<(), PngError> {
        if self.width as usize != width || self.height as usize != height {
            return Err(PngError::Mismatch(format!(
                "expected {}x{} image, found {}x{}",
                width, height, self.width, self.height
            )));
        }

        if self.bit_depth != 8 {
            return Err(PngError::Mismatch(format!(
                "expected bit depth 8, found {}",
                self.bit_depth
            )));
        }

        if self.color_type != format.png_color_type() {
            let found = PixelFormat::from_png_color_type(self.color_type)
                .map(|f| f.to_string())
                .unwrap_or_else(|| format!("color type {}", self.color_type));
            return Err(PngError::Mismatch(format!(
                "expected {} layout, found {}",
                format, found
            )));
        }

        if self.interlace != 0 {
            return Err(PngError::Mismatch(
                "interlaced images are not supported".to_string(),
            ));
        }

        Ok(())
    }
}

/// One chunk of a PNG stream, CRC already verified.
struct Chunk<'a> {
    kind: [u8; 4],
    data: &'a [u8],
}

impl Chunk<'_> {
    fn name(&self) -> String {
        String::from_utf8_lossy(&self.kind).into_owned()
    }

    /// Critical chunks have an uppercase first letter.
    fn is_critical(&self) -> bool {
        self.kind[0] & 0x20 == 0
    }
}

/// Walks the chunks that follow the signature.
struct ChunkReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ChunkReader<'a> {
    fn new(png: &'a [u8]) -> Result<Self, PngError> {
        if png.len() < PNG_SIGNATURE.len() || png[..8] != PNG_SIGNATURE {
            return Err(malformed("missing PNG signature"));
        }
        Ok(Self { data: png, pos: 8 })
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], PngError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| malformed("unexpected end of file"))?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    /// Next chunk, or `None` once the input is exhausted.
    fn next_chunk(&mut self) -> Result<Option<Chunk<'a>>, PngError> {
        if self.pos == self.data.len() {
            return Ok(None);
        }

        let len_bytes = self.take(4)?;
        let len = u32::from_be_bytes([len_bytes[0], len_bytes[1], len_bytes[2], len_bytes[3]]);
        if len > MAX_DIMENSION {
            return Err(malformed(format!("chunk length {} out of range", len)));
        }

        let kind_and_data = self.take(4 + len as usize)?;
        let crc_bytes = self.take(4)?;
        let stored_crc = u32::from_be_bytes([crc_bytes[0], crc_bytes[1], crc_bytes[2], crc_bytes[3]]);

        let mut kind = [0u8; 4];
        kind.copy_from_slice(&kind_and_data[..4]);
        if !kind.iter().all(u8::is_ascii_alphabetic) {
            return Err(malformed("invalid chunk type"));
        }

        let chunk = Chunk {
            kind,
            data: &kind_and_data[4..],
        };
        if crc32_checksum(kind_and_data) != stored_crc {
            return Err(malformed(format!("CRC mismatch in {} chunk", chunk.name())));
        }

        Ok(Some(chunk))
    }
}

/// Parse the signature and IHDR chunk.
pub fn read_header(png: &[u8]) -> Result<PngHeader, PngError> {
    let mut reader = ChunkReader::new(png)?;
    let chunk = reader
        .next_chunk()?
        .ok_or_else(|| malformed("missing IHDR chunk"))?;
    parse_ihdr(&chunk)
}

fn parse_ihdr(chunk: &Chunk<'_>) -> Result<PngHeader, PngError> {
    if &chunk.kind != b"IHDR" {
        return Err(malformed(format!("expected IHDR as first chunk, found {}", chunk.name())));
    }
    let d = chunk.data;
    if d.len() != 13 {
        return Err(malformed(format!("IHDR length {} (expected 13)", d.len())));
    }

    let header = PngHeader {
        width: u32::from_be_bytes([d[0], d[1], d[2], d[3]]),
        height: u32::from_be_bytes([d[4], d[5], d[6], d[7]]),
        bit_depth: d[8],
        color_type: d[9],
        interlace: d[12],
    };

    if header.width == 0 || header.height == 0 {
        return Err(malformed("zero image dimension"));
    }
    if header.width > MAX_DIMENSION || header.height > MAX_DIMENSION {
        return Err(malformed("image dimension out of range"));
    }
    // compression method, filter method
    if d[10] != 0 || d[11] != 0 {
        return Err(malformed("unknown compression or filter method"));
    }
    if header.interlace > 1 {
        return Err(malformed(format!("unknown interlace method {}", header.interlace)));
    }

    Ok(header)
}

/// Decode a PNG stream into a newly allocated buffer of the requested shape.
///
/// The header is validated before any image data is decompressed.
pub fn decode_png(
    png: &[u8],
    width: usize,
    height: usize,
    format: PixelFormat,
) -> Result<RasterBuffer, PngError> {
    let header = read_header(png)?;
    header.validate(width, height, format)?;

    let mut buffer = RasterBuffer::new(width, height, format)
        .map_err(|e| PngError::Mismatch(e.to_string()))?;
    decode_into(png, buffer.data_mut(), width, format)?;
    Ok(buffer)
}

/// Decode the image data of an already validated PNG into `out`.
///
/// `out` must hold exactly `height` rows of `width` pixels in `format`.
pub fn decode_into(png: &[u8], out: &mut [u8], width: usize, format: PixelFormat) -> Result<(), PngError> {
    let mut reader = ChunkReader::new(png)?;
    let ihdr = reader
        .next_chunk()?
        .ok_or_else(|| malformed("missing IHDR chunk"))?;
    parse_ihdr(&ihdr)?;

    let mut idat = Vec::new();
    let mut seen_idat = false;
    let mut idat_closed = false;
    let mut seen_iend = false;

    while let Some(chunk) = reader.next_chunk()? {
        match &chunk.kind {
            b"IDAT" => {
                if idat_closed {
                    return Err(malformed("IDAT chunks are not consecutive"));
                }
                seen_idat = true;
                idat.extend_from_slice(chunk.data);
            }
            b"IEND" => {
                seen_iend = true;
                break;
            }
            b"IHDR" => return Err(malformed("duplicate IHDR chunk")),
            // A suggested palette is allowed for truecolor images and carries
            // no pixel data.
            b"PLTE" if format == PixelFormat::Rgba && !seen_idat => {}
            _ if chunk.is_critical() => {
                return Err(malformed(format!("unexpected critical chunk {}", chunk.name())));
            }
            _ => {
                if seen_idat {
                    idat_closed = true;
                }
            }
        }
    }

    if !seen_idat {
        return Err(malformed("missing IDAT chunk"));
    }
    if !seen_iend {
        return Err(malformed("missing IEND chunk"));
    }

    let bpp = format.bytes_per_pixel();
    let stride = width * bpp;
    let height = if stride == 0 { 0 } else { out.len() / stride };
    let expected = height
        .checked_mul(stride + 1)
        .ok_or_else(|| malformed("image data size overflow"))?;

    let mut raw = Vec::new();
    raw.try_reserve_exact(expected)
        .map_err(|_| malformed("cannot allocate scanline buffer"))?;
    ZlibDecoder::new(idat.as_slice())
        .take(expected as u64 + 1)
        .read_to_end(&mut raw)
        .map_err(|e| malformed(format!("corrupt image data: {}", e)))?;

    if raw.len() < expected {
        return Err(malformed(format!(
            "truncated image data: {} of {} bytes",
            raw.len(),
            expected
        )));
    }
    if raw.len() > expected {
        return Err(malformed("image data exceeds declared dimensions"));
    }

    unfilter(&raw, out, stride, bpp)
}

/// Reverse the per-scanline filters of `raw` into `out`.
fn unfilter(raw: &[u8], out: &mut [u8], stride: usize, bpp: usize) -> Result<(), PngError> {
    for (y, line) in raw.chunks_exact(stride + 1).enumerate() {
        let filter = line[0];
        let (done, rest) = out.split_at_mut(y * stride);
        let row = &mut rest[..stride];
        row.copy_from_slice(&line[1..]);
        let prev = if y == 0 {
            None
        } else {
            Some(&done[(y - 1) * stride..])
        };

        match filter {
            0 => {}
            1 => {
                for i in bpp..stride {
                    row[i] = row[i].wrapping_add(row[i - bpp]);
                }
            }
            2 => {
                if let Some(prev) = prev {
                    for (b, &up) in row.iter_mut().zip(prev) {
                        *b = b.wrapping_add(up);
                    }
                }
            }
            3 => {
                for i in 0..stride {
                    let left = if i >= bpp { row[i - bpp] as u16 } else { 0 };
                    let up = prev.map_or(0, |p| p[i] as u16);
                    row[i] = row[i].wrapping_add(((left + up) / 2) as u8);
                }
            }
            4 => {
                for i in 0..stride {
                    let left = if i >= bpp { row[i - bpp] } else { 0 };
                    let up = prev.map_or(0, |p| p[i]);
                    let up_left = match prev {
                        Some(p) if i >= bpp => p[i - bpp],
                        _ => 0,
                    };
                    row[i] = row[i].wrapping_add(paeth(left, up, up_left));
                }
            }
            other => {
                return Err(malformed(format!("unknown filter type {} on row {}", other, y)));
            }
        }
    }
    Ok(())
}

#[inline(always)]
fn paeth(a: u8, b: u8, c: u8) -> u8 {
    let p = a as i16 + b as i16 - c as i16;
    let pa = (p - a as i16).abs();
    let pb = (p - b as i16).abs();
    let pc = (p - c as i16).abs();
    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}

/// Create a PNG image from a tile buffer.
///
/// # Arguments
/// - `buffer`: pixel data, gray+alpha or RGBA
/// - `level`: zlib compression level for the IDAT stream
pub fn encode_png(buffer: &RasterBuffer, level: Compression) -> Result<Vec<u8>, PngError> {
    let too_large = || PngError::TooLarge {
        width: buffer.width(),
        height: buffer.height(),
    };
    let width = u32::try_from(buffer.width()).map_err(|_| too_large())?;
    let height = u32::try_from(buffer.height()).map_err(|_| too_large())?;
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(too_large());
    }
    debug_assert_eq!(
        buffer_len(buffer.width(), buffer.height(), buffer.format()),
        Some(buffer.data().len())
    );

    let mut png = Vec::new();

    // PNG signature
    png.extend_from_slice(&PNG_SIGNATURE);

    // IHDR chunk
    let mut ihdr_data = Vec::with_capacity(13);
    ihdr_data.extend_from_slice(&width.to_be_bytes());
    ihdr_data.extend_from_slice(&height.to_be_bytes());
    ihdr_data.push(8); // bit depth
    ihdr_data.push(buffer.format().png_color_type());
    ihdr_data.push(0); // compression method
    ihdr_data.push(0); // filter method
    ihdr_data.push(0); // interlace method
    write_chunk(&mut png, b"IHDR", &ihdr_data);

    // IDAT chunk (image data)
    let idat_data = deflate_idat(buffer, level)?;
    write_chunk(&mut png, b"IDAT", &idat_data);

    // IEND chunk
    write_chunk(&mut png, b"IEND", &[]);

    Ok(png)
}

/// Write a PNG chunk
fn write_chunk(png: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());

    let crc_start = png.len();
    png.extend_from_slice(chunk_type);
    png.extend_from_slice(data);

    let crc = crc32_checksum(&png[crc_start..]);
    png.extend_from_slice(&crc.to_be_bytes());
}

/// Deflate tile rows for the IDAT chunk, top row first.
fn deflate_idat(buffer: &RasterBuffer, level: Compression) -> Result<Vec<u8>, std::io::Error> {
    let stride = buffer.stride();
    let mut encoder = ZlibEncoder::new(Vec::new(), level);

    // filter type 0 (none) ahead of every scanline
    for row in buffer.data().chunks_exact(stride.max(1)) {
        encoder.write_all(&[0])?;
        encoder.write_all(row)?;
    }

    encoder.finish()
}

/// Simple CRC32 checksum (PNG-style)
fn crc32_checksum(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}
