//! PNM (Portable Any Map) format support
//!
//! Reads and writes binary PGM (`P5`) and PPM (`P6`) images with a
//! maxval of 255. The header bytes of a decoded file, comments and
//! whitespace included, are kept verbatim and written back unchanged.
//! ASCII variants (P1/P2/P3), PBM and PAM are not supported.

use crate::format::ImageFormat;
use crate::{IoError, IoResult};
use pixbatch_core::{Channels, PixelBuffer};
use std::io::{Read, Write};

/// Parsed PNM header fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PnmHeader {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Samples per pixel, from the magic number
    pub channels: Channels,
    /// Maximum sample value
    pub maxval: u32,
    /// Length of the header in bytes, including the single whitespace
    /// byte that precedes the raster
    pub len: usize,
}

/// A decoded PNM image: its original header bytes plus the pixel buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PnmImage {
    header: Vec<u8>,
    buffer: PixelBuffer,
}

impl PnmImage {
    /// Wrap a buffer with a freshly encoded header.
    pub fn new(buffer: PixelBuffer) -> Self {
        let header = encode_pnm_header(buffer.width(), buffer.height(), buffer.channels());
        PnmImage { header, buffer }
    }

    /// Pair existing header bytes with a buffer.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::InvalidData`] if the header does not parse, is
    /// followed by extra bytes, or describes a different geometry than
    /// `buffer`.
    pub fn from_parts(header: Vec<u8>, buffer: PixelBuffer) -> IoResult<Self> {
        let parsed = parse_pnm_header(&header)?;
        if parsed.len != header.len() {
            return Err(IoError::InvalidData(format!(
                "header has {} trailing bytes",
                header.len() - parsed.len
            )));
        }
        check_geometry(&parsed, &buffer)?;
        Ok(PnmImage { header, buffer })
    }

    /// Original header bytes.
    pub fn header(&self) -> &[u8] {
        &self.header
    }

    /// Pixel buffer.
    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    /// PNM flavor matching the buffer's channel layout.
    pub fn format(&self) -> ImageFormat {
        ImageFormat::pnm_for(self.buffer.channels())
    }

    /// Split into header bytes and buffer.
    pub fn into_parts(self) -> (Vec<u8>, PixelBuffer) {
        (self.header, self.buffer)
    }

    /// Replace the pixel buffer, keeping the original header.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::InvalidData`] if the new buffer's geometry
    /// differs from the header's.
    pub fn with_buffer(self, buffer: PixelBuffer) -> IoResult<Self> {
        let parsed = parse_pnm_header(&self.header)?;
        check_geometry(&parsed, &buffer)?;
        Ok(PnmImage {
            header: self.header,
            buffer,
        })
    }
}

fn check_geometry(header: &PnmHeader, buffer: &PixelBuffer) -> IoResult<()> {
    if header.width != buffer.width()
        || header.height != buffer.height()
        || header.channels != buffer.channels()
    {
        return Err(IoError::InvalidData(format!(
            "header describes {}x{}x{}, buffer is {}x{}x{}",
            header.width,
            header.height,
            header.channels.count(),
            buffer.width(),
            buffer.height(),
            buffer.channels().count()
        )));
    }
    Ok(())
}

/// Encode a canonical binary PNM header.
pub fn encode_pnm_header(width: u32, height: u32, channels: Channels) -> Vec<u8> {
    let magic = match channels {
        Channels::Gray => "P5",
        Channels::Rgb => "P6",
    };
    format!("{magic}\n{width} {height}\n255\n").into_bytes()
}

/// Byte cursor over a PNM header.
struct HeaderCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl HeaderCursor<'_> {
    /// Skip whitespace and `#` comments (which run to end of line).
    fn skip_separators(&mut self) {
        while let Some(&b) = self.data.get(self.pos) {
            if b == b'#' {
                while let Some(&c) = self.data.get(self.pos) {
                    self.pos += 1;
                    if c == b'\n' || c == b'\r' {
                        break;
                    }
                }
            } else if b.is_ascii_whitespace() {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn read_uint(&mut self, what: &str) -> IoResult<u32> {
        self.skip_separators();
        let start = self.pos;
        while self.data.get(self.pos).is_some_and(u8::is_ascii_digit) {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(IoError::InvalidData(format!("missing PNM {what}")));
        }
        // Only ASCII digits were consumed
        let text = std::str::from_utf8(&self.data[start..self.pos])
            .map_err(|e| IoError::InvalidData(e.to_string()))?;
        text.parse::<u32>()
            .map_err(|e| IoError::InvalidData(format!("bad PNM {what} '{text}': {e}")))
    }
}

/// Parse the header at the start of `data`.
///
/// # Errors
///
/// Returns [`IoError::UnsupportedFormat`] for magic numbers other than
/// `P5`/`P6` or a maxval other than 255, and [`IoError::InvalidData`] for
/// malformed or zero-sized headers.
pub fn parse_pnm_header(data: &[u8]) -> IoResult<PnmHeader> {
    if data.len() < 2 || data[0] != b'P' {
        return Err(IoError::InvalidData("not a PNM file".to_string()));
    }
    let channels = match data[1] {
        b'5' => Channels::Gray,
        b'6' => Channels::Rgb,
        other => {
            return Err(IoError::UnsupportedFormat(format!(
                "PNM type P{}",
                other as char
            )));
        }
    };

    let mut cur = HeaderCursor { data, pos: 2 };
    let width = cur.read_uint("width")?;
    let height = cur.read_uint("height")?;
    let maxval = cur.read_uint("maxval")?;

    if width == 0 || height == 0 {
        return Err(IoError::InvalidData(format!(
            "invalid PNM dimensions {width}x{height}"
        )));
    }
    if maxval != 255 {
        return Err(IoError::UnsupportedFormat(format!(
            "PNM maxval {maxval} (only 8-bit samples are supported)"
        )));
    }

    match data.get(cur.pos) {
        Some(b) if b.is_ascii_whitespace() => cur.pos += 1,
        _ => {
            return Err(IoError::InvalidData(
                "PNM header must end with a single whitespace byte".to_string(),
            ));
        }
    }

    Ok(PnmHeader {
        width,
        height,
        channels,
        maxval,
        len: cur.pos,
    })
}

/// Decode a PNM image held in memory.
pub fn read_pnm_mem(data: &[u8]) -> IoResult<PnmImage> {
    let header = parse_pnm_header(data)?;
    let expected = PixelBuffer::byte_len(header.width, header.height, header.channels)?;
    let raster = &data[header.len..];
    if raster.len() < expected {
        return Err(IoError::InvalidData(format!(
            "PNM raster truncated: expected {expected} bytes, found {}",
            raster.len()
        )));
    }
    if raster.len() > expected {
        tracing::debug!(
            extra = raster.len() - expected,
            "ignoring trailing bytes after PNM raster"
        );
    }

    let mut pixels = Vec::new();
    pixels
        .try_reserve_exact(expected)
        .map_err(|_| pixbatch_core::Error::AllocationFailed { bytes: expected })?;
    pixels.extend_from_slice(&raster[..expected]);

    let buffer = PixelBuffer::from_bytes(header.width, header.height, header.channels, pixels)?;
    Ok(PnmImage {
        header: data[..header.len].to_vec(),
        buffer,
    })
}

/// Read a binary PNM image (P5/P6) from a reader.
///
/// The whole stream is consumed.
pub fn read_pnm<R: Read>(mut reader: R) -> IoResult<PnmImage> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    read_pnm_mem(&data)
}

/// Write a PNM image: the stored header bytes, then the raster.
pub fn write_pnm<W: Write>(image: &PnmImage, mut writer: W) -> IoResult<()> {
    writer.write_all(image.header())?;
    writer.write_all(image.buffer().data())?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn ppm_bytes(header: &[u8], pixels: &[u8]) -> Vec<u8> {
        let mut data = header.to_vec();
        data.extend_from_slice(pixels);
        data
    }

    #[test]
    fn test_parse_header_with_comment() {
        let data = b"P6\n# created by hand\n2 1\n255\n\x01\x02\x03\x04\x05\x06";
        let header = parse_pnm_header(data).unwrap();
        assert_eq!(header.width, 2);
        assert_eq!(header.height, 1);
        assert_eq!(header.channels, Channels::Rgb);
        assert_eq!(header.maxval, 255);
        assert_eq!(&data[header.len..], b"\x01\x02\x03\x04\x05\x06");
    }

    #[test]
    fn test_parse_header_single_line() {
        let header = parse_pnm_header(b"P5 3 2 255 ").unwrap();
        assert_eq!((header.width, header.height), (3, 2));
        assert_eq!(header.channels, Channels::Gray);
        assert_eq!(header.len, 11);
    }

    #[test]
    fn test_parse_header_raster_starting_with_whitespace_byte() {
        // The first sample is 0x0A; only one separator byte belongs to the header
        let data = b"P5\n1 1\n255\n\n";
        let header = parse_pnm_header(data).unwrap();
        assert_eq!(header.len, 11);
        let image = read_pnm_mem(data).unwrap();
        assert_eq!(image.buffer().data(), &[0x0A]);
    }

    #[test]
    fn test_parse_header_errors() {
        assert!(matches!(
            parse_pnm_header(b"P3\n1 1\n255\n"),
            Err(IoError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            parse_pnm_header(b"P6\n1 1\n65535\n"),
            Err(IoError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            parse_pnm_header(b"P6\n0 1\n255\n"),
            Err(IoError::InvalidData(_))
        ));
        assert!(matches!(
            parse_pnm_header(b"P6\n1\n"),
            Err(IoError::InvalidData(_))
        ));
        assert!(matches!(
            parse_pnm_header(b"GIF89a"),
            Err(IoError::InvalidData(_))
        ));
        assert!(matches!(
            parse_pnm_header(b"P6\n1 1\n255"),
            Err(IoError::InvalidData(_))
        ));
    }

    #[test]
    fn test_read_truncated_raster() {
        let data = ppm_bytes(b"P6\n2 2\n255\n", &[0; 11]);
        assert!(matches!(read_pnm_mem(&data), Err(IoError::InvalidData(_))));
    }

    #[test]
    fn test_read_ignores_trailing_bytes() {
        let data = ppm_bytes(b"P5\n2 1\n255\n", &[9, 8, 7]);
        let image = read_pnm_mem(&data).unwrap();
        assert_eq!(image.buffer().data(), &[9, 8]);
    }

    #[test]
    fn test_header_copy_through() {
        let header = b"P6\n# keep me\n1 2\n255\n";
        let data = ppm_bytes(header, &[1, 2, 3, 4, 5, 6]);
        let image = read_pnm(Cursor::new(&data)).unwrap();
        assert_eq!(image.header(), header);

        let mut out = Vec::new();
        write_pnm(&image, &mut out).unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn test_with_buffer_keeps_header() {
        let header = b"P5\n# note\n2 2\n255\n";
        let data = ppm_bytes(header, &[1, 2, 3, 4]);
        let image = read_pnm_mem(&data).unwrap();
        let (_, buffer) = image.clone().into_parts();
        let mut bytes = buffer.into_bytes();
        bytes.iter_mut().for_each(|b| *b = 255 - *b);
        let buffer = PixelBuffer::from_bytes(2, 2, Channels::Gray, bytes).unwrap();

        let image = image.with_buffer(buffer).unwrap();
        assert_eq!(image.header(), header);
        assert_eq!(image.buffer().data(), &[254, 253, 252, 251]);
    }

    #[test]
    fn test_with_buffer_rejects_geometry_change() {
        let image = PnmImage::new(PixelBuffer::new(2, 2, Channels::Gray).unwrap());
        let other = PixelBuffer::new(2, 2, Channels::Rgb).unwrap();
        assert!(image.with_buffer(other).is_err());
    }

    #[test]
    fn test_new_encodes_header() {
        let image = PnmImage::new(PixelBuffer::new(3, 2, Channels::Rgb).unwrap());
        assert_eq!(image.header(), b"P6\n3 2\n255\n");
        assert_eq!(image.format(), ImageFormat::Ppm);
        assert_eq!(encode_pnm_header(7, 1, Channels::Gray), b"P5\n7 1\n255\n");
    }

    #[test]
    fn test_from_parts_validation() {
        let buffer = PixelBuffer::new(3, 2, Channels::Gray).unwrap();
        assert!(PnmImage::from_parts(b"P5\n3 2\n255\n".to_vec(), buffer.clone()).is_ok());
        assert!(PnmImage::from_parts(b"P5\n3 3\n255\n".to_vec(), buffer.clone()).is_err());
        assert!(PnmImage::from_parts(b"P5\n3 2\n255\nxx".to_vec(), buffer).is_err());
    }
}
