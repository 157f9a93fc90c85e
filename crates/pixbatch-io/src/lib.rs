//! pixbatch-io - Image I/O for the pixbatch engine
//!
//! Decodes binary PNM files into a [`PnmImage`] (original header bytes plus
//! a [`PixelBuffer`](pixbatch_core::PixelBuffer)), writes them back with the
//! header untouched, and optionally exports PNG copies.
//!
//! # Supported formats
//!
//! | Format | Read | Write | Feature |
//! |--------|------|-------|---------|
//! | PGM (P5) | yes | yes | always |
//! | PPM (P6) | yes | yes | always |
//! | PNG | no | yes | `png-format` |

mod error;
pub mod format;
#[cfg(feature = "png-format")]
pub mod png;
pub mod pnm;

pub use error::{IoError, IoResult};
pub use format::ImageFormat;
pub use pnm::{
    PnmHeader, PnmImage, encode_pnm_header, parse_pnm_header, read_pnm, read_pnm_mem, write_pnm,
};

use std::fs::File;
use std::io::{BufWriter, Read};
use std::path::Path;

/// Read a PNM image from a file path.
///
/// The expected channel layout comes from the file name: `.pgm` files must
/// hold a `P5` raster, `.ppm` files (and names with any other extension) a
/// `P6` raster. `.pnm` files accept either.
///
/// # Errors
///
/// Returns [`IoError::InvalidData`] if the magic number contradicts the
/// extension, plus any error from [`read_pnm_mem`].
pub fn read_image<P: AsRef<Path>>(path: P) -> IoResult<PnmImage> {
    let path = path.as_ref();
    let expected = ImageFormat::for_input(path).channels();

    let mut data = Vec::new();
    File::open(path)?.read_to_end(&mut data)?;
    let image = read_pnm_mem(&data)?;

    if let Some(channels) = expected
        && channels != image.buffer().channels()
    {
        return Err(IoError::InvalidData(format!(
            "{} holds {}-channel data but its extension implies {} channels",
            path.display(),
            image.buffer().channels().count(),
            channels.count()
        )));
    }
    tracing::debug!(
        path = %path.display(),
        width = image.buffer().width(),
        height = image.buffer().height(),
        channels = image.buffer().channels().count(),
        "decoded PNM image"
    );
    Ok(image)
}

/// Decode a PNM image from memory.
pub fn read_image_mem(data: &[u8]) -> IoResult<PnmImage> {
    read_pnm_mem(data)
}

/// Write a PNM image to a file path.
///
/// The file is only created once encoding can start; a failed write may
/// leave a partial file behind, so callers write only finished buffers.
pub fn write_image<P: AsRef<Path>>(image: &PnmImage, path: P) -> IoResult<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    write_pnm(image, BufWriter::new(file))?;
    tracing::debug!(path = %path.display(), "wrote PNM image");
    Ok(())
}

/// Encode a PNM image into memory.
pub fn write_image_mem(image: &PnmImage) -> IoResult<Vec<u8>> {
    let mut out = Vec::with_capacity(image.header().len() + image.buffer().data().len());
    write_pnm(image, &mut out)?;
    Ok(out)
}

/// Export a buffer as a PNG file.
#[cfg(feature = "png-format")]
pub fn export_png<P: AsRef<Path>>(buffer: &pixbatch_core::PixelBuffer, path: P) -> IoResult<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    crate::png::write_png(buffer, BufWriter::new(file))?;
    tracing::debug!(path = %path.display(), "exported PNG image");
    Ok(())
}
