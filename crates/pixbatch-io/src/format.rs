//! Image format selection
//!
//! Formats are chosen from file extensions. Decoding only handles the
//! binary PNM family; PNG is an export-only target.

use pixbatch_core::Channels;
use std::path::Path;

/// Image file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    /// Binary greyscale PNM (`P5`)
    Pgm,
    /// Binary RGB PNM (`P6`)
    Ppm,
    /// Generic PNM; the magic number decides the channel count
    Pnm,
    /// PNG (write only)
    Png,
}

impl ImageFormat {
    /// Get the file extension for this format.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Pgm => "pgm",
            Self::Ppm => "ppm",
            Self::Pnm => "pnm",
            Self::Png => "png",
        }
    }

    /// Parse a file extension (case-insensitive, without the dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pgm" => Some(Self::Pgm),
            "ppm" => Some(Self::Ppm),
            "pnm" => Some(Self::Pnm),
            "png" => Some(Self::Png),
            _ => None,
        }
    }

    /// Determine the format from a path's extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Format assumed for an input path.
    ///
    /// `.pgm` files are greyscale; every other name is treated as RGB.
    pub fn for_input<P: AsRef<Path>>(path: P) -> Self {
        match Self::from_path(path) {
            Some(Self::Pgm) => Self::Pgm,
            Some(Self::Pnm) => Self::Pnm,
            _ => Self::Ppm,
        }
    }

    /// Channel count implied by the format, if it fixes one.
    pub fn channels(self) -> Option<Channels> {
        match self {
            Self::Pgm => Some(Channels::Gray),
            Self::Ppm => Some(Channels::Rgb),
            Self::Pnm | Self::Png => None,
        }
    }

    /// PNM format for a given channel layout.
    pub fn pnm_for(channels: Channels) -> Self {
        match channels {
            Channels::Gray => Self::Pgm,
            Channels::Rgb => Self::Ppm,
        }
    }
}
