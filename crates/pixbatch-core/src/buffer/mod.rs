//! PixelBuffer - The interleaved 8-bit image container
//!
//! # Pixel layout
//!
//! - One byte per sample, 8 bits per channel
//! - Samples are interleaved: `R G B R G B ...` for RGB, one byte per
//!   pixel for greyscale
//! - Rows are packed with no padding, so the row stride is
//!   `width * channels`
//! - The sample at `(x, y, c)` lives at `y * stride + x * channels + c`
//!
//! # Ownership model
//!
//! A `PixelBuffer` is a single owned allocation. It is moved into the
//! orchestrator for the duration of a run and moved back out afterwards;
//! it is never shared. Workers get exclusive access to disjoint row bands
//! through [`PixelBuffer::split_rows_mut`].

mod rows;

pub use rows::RowBand;

use crate::error::{Error, Result};

/// Number of interleaved samples per pixel
///
/// Only 8-bit greyscale and 8-bit RGB are supported; alpha channels are not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Channels {
    /// Single-channel greyscale (PGM)
    Gray = 1,
    /// Three-channel RGB (PPM)
    Rgb = 3,
}

impl Channels {
    /// Create `Channels` from a raw sample count.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidChannels`] if `count` is not 1 or 3.
    pub fn from_count(count: u32) -> Result<Self> {
        match count {
            1 => Ok(Channels::Gray),
            3 => Ok(Channels::Rgb),
            _ => Err(Error::InvalidChannels(count)),
        }
    }

    /// Get the number of samples per pixel.
    #[inline]
    pub fn count(self) -> u32 {
        self as u32
    }

    /// Get the number of samples per pixel as a `usize`.
    #[inline]
    pub fn samples(self) -> usize {
        self as usize
    }
}

/// Interleaved 8-bit pixel buffer
///
/// # Examples
///
/// ```
/// use pixbatch_core::{Channels, PixelBuffer};
///
/// let buf = PixelBuffer::new(640, 480, Channels::Rgb).unwrap();
/// assert_eq!(buf.width(), 640);
/// assert_eq!(buf.row_stride(), 640 * 3);
/// assert_eq!(buf.data().len(), 640 * 480 * 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    channels: Channels,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Create a new buffer with every sample set to zero.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] if width or height is 0, and
    /// [`Error::AllocationFailed`] if the storage cannot be reserved.
    pub fn new(width: u32, height: u32, channels: Channels) -> Result<Self> {
        let len = Self::byte_len(width, height, channels)?;
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| Error::AllocationFailed { bytes: len })?;
        data.resize(len, 0);
        Ok(PixelBuffer {
            width,
            height,
            channels,
            data,
        })
    }

    /// Wrap already-decoded sample bytes.
    ///
    /// The vector is taken over without copying.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] if width or height is 0, and
    /// [`Error::DimensionMismatch`] if `data.len()` is not
    /// `width * height * channels`.
    pub fn from_bytes(width: u32, height: u32, channels: Channels, data: Vec<u8>) -> Result<Self> {
        let expected = Self::byte_len(width, height, channels)?;
        if data.len() != expected {
            return Err(Error::DimensionMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(PixelBuffer {
            width,
            height,
            channels,
            data,
        })
    }

    /// Compute `width * height * channels`, rejecting empty images.
    ///
    /// A product that does not fit in `usize` can never be allocated, so it
    /// is reported as an allocation failure.
    pub fn byte_len(width: u32, height: u32, channels: Channels) -> Result<usize> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }
        (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(channels.samples()))
            .ok_or(Error::AllocationFailed { bytes: usize::MAX })
    }

    /// Get the image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the image height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the samples per pixel.
    #[inline]
    pub fn channels(&self) -> Channels {
        self.channels
    }

    /// Get the number of pixels (`width * height`).
    #[inline]
    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Get the number of bytes in one row.
    #[inline]
    pub fn row_stride(&self) -> usize {
        self.width as usize * self.channels.samples()
    }

    /// Byte offset of sample `c` of pixel `(x, y)`.
    #[inline]
    pub fn offset(&self, x: u32, y: u32, c: usize) -> usize {
        y as usize * self.row_stride() + x as usize * self.channels.samples() + c
    }

    /// Get raw access to the sample bytes.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get mutable access to the sample bytes.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Give up the buffer and return its sample bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Get the bytes of row `y`.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row(&self, y: u32) -> &[u8] {
        let stride = self.row_stride();
        let start = y as usize * stride;
        &self.data[start..start + stride]
    }

    /// Get mutable access to row `y`.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let stride = self.row_stride();
        let start = y as usize * stride;
        &mut self.data[start..start + stride]
    }

    /// Get one sample, or `None` if the coordinates are out of bounds.
    pub fn get_sample(&self, x: u32, y: u32, c: usize) -> Option<u8> {
        if x >= self.width || y >= self.height || c >= self.channels.samples() {
            return None;
        }
        Some(self.data[self.offset(x, y, c)])
    }

    /// Set one sample.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] if the coordinates fall outside
    /// the image.
    pub fn set_sample(&mut self, x: u32, y: u32, c: usize, val: u8) -> Result<()> {
        if x >= self.width || y >= self.height || c >= self.channels.samples() {
            return Err(Error::IndexOutOfBounds {
                index: self.offset(x, y, c),
                len: self.data.len(),
            });
        }
        let idx = self.offset(x, y, c);
        self.data[idx] = val;
        Ok(())
    }

    /// Get all samples of pixel `(x, y)`.
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let start = self.offset(x, y, 0);
        Some(&self.data[start..start + self.channels.samples()])
    }

    /// Set all samples of pixel `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] if the pixel is outside the
    /// image, or [`Error::InvalidParameter`] if `samples` has the wrong
    /// length.
    pub fn set_pixel(&mut self, x: u32, y: u32, samples: &[u8]) -> Result<()> {
        if samples.len() != self.channels.samples() {
            return Err(Error::InvalidParameter(format!(
                "expected {} samples per pixel, got {}",
                self.channels.samples(),
                samples.len()
            )));
        }
        if x >= self.width || y >= self.height {
            return Err(Error::IndexOutOfBounds {
                index: self.offset(x, y, 0),
                len: self.data.len(),
            });
        }
        let start = self.offset(x, y, 0);
        self.data[start..start + samples.len()].copy_from_slice(samples);
        Ok(())
    }
}
