//! PNG export
//!
//! Writes a [`PixelBuffer`] as an 8-bit greyscale or RGB PNG. Used to
//! produce a viewable copy of an enhanced PNM image.

use crate::{IoError, IoResult};
use pixbatch_core::{Channels, PixelBuffer};
use png::{BitDepth, ColorType, Encoder};
use std::io::Write;

/// Write a PNG image
pub fn write_png<W: Write>(buffer: &PixelBuffer, writer: W) -> IoResult<()> {
    let color_type = match buffer.channels() {
        Channels::Gray => ColorType::Grayscale,
        Channels::Rgb => ColorType::Rgb,
    };

    let mut encoder = Encoder::new(writer, buffer.width(), buffer.height());
    encoder.set_color(color_type);
    encoder.set_depth(BitDepth::Eight);

    let mut writer = encoder
        .write_header()
        .map_err(|e| IoError::EncodeError(format!("PNG header error: {}", e)))?;

    // Rows are unpadded, which is exactly PNG's 8-bit scanline layout
    writer
        .write_image_data(buffer.data())
        .map_err(|e| IoError::EncodeError(format!("PNG write error: {}", e)))?;

    writer
        .finish()
        .map_err(|e| IoError::EncodeError(format!("PNG finish error: {}", e)))?;

    Ok(())
}
