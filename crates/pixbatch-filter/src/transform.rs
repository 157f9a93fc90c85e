//! Enhancement transforms
//!
//! The set of transforms is closed: each variant maps to one row kernel
//! and to one command-line name.

use crate::enhance::{TrcLut, apply_trc_row, greyscale_row, invert_lut, srgb_lut};
use crate::histogram::HistogramStats;
use crate::{FilterError, FilterResult};
use pixbatch_core::Channels;
use std::fmt;
use std::str::FromStr;

/// Enhancement applied to every row of an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transform {
    /// sRGB encoding curve (`clrspc-sRGB`)
    GammaCorrect,
    /// `v -> 255 - v` (`invert`)
    Invert,
    /// Luma written to every channel (`greyscale`)
    Greyscale,
    /// Per-channel histogram equalization (`histeq`)
    HistogramEqualize,
}

impl Transform {
    /// Every transform, in command-line listing order.
    pub const ALL: [Transform; 4] = [
        Transform::GammaCorrect,
        Transform::Invert,
        Transform::Greyscale,
        Transform::HistogramEqualize,
    ];

    /// Command-line name of the transform.
    pub fn name(self) -> &'static str {
        match self {
            Transform::GammaCorrect => "clrspc-sRGB",
            Transform::Invert => "invert",
            Transform::Greyscale => "greyscale",
            Transform::HistogramEqualize => "histeq",
        }
    }

    /// Whether the transform needs whole-image statistics before any row
    /// can be rewritten.
    pub fn needs_statistics(self) -> bool {
        matches!(self, Transform::HistogramEqualize)
    }

    /// Row kernel for this transform.
    ///
    /// `stats` is required for [`Transform::HistogramEqualize`] and ignored
    /// otherwise.
    pub fn kernel(self, stats: Option<&HistogramStats>) -> FilterResult<RowKernel<'_>> {
        match self {
            Transform::GammaCorrect => Ok(RowKernel::Lut(srgb_lut())),
            Transform::Invert => Ok(RowKernel::Lut(invert_lut())),
            Transform::Greyscale => Ok(RowKernel::Luma),
            Transform::HistogramEqualize => stats.map(RowKernel::Remap).ok_or_else(|| {
                FilterError::Internal(
                    "histogram equalization dispatched before statistics".to_string(),
                )
            }),
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Transform {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Transform::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| FilterError::UnknownTransform(s.to_string()))
    }
}

/// Per-row rewrite rule shared read-only by all workers of one pass
#[derive(Debug, Clone, Copy)]
pub enum RowKernel<'a> {
    /// Same lookup table for every channel
    Lut(&'a TrcLut),
    /// RGB pixels replaced by their luma
    Luma,
    /// Per-channel equalization tables
    Remap(&'a HistogramStats),
}

impl RowKernel<'_> {
    /// Rewrite one packed row in place.
    pub fn apply(&self, row: &mut [u8], channels: Channels) -> FilterResult<()> {
        match self {
            RowKernel::Lut(lut) => {
                apply_trc_row(row, lut);
                Ok(())
            }
            RowKernel::Luma => greyscale_row(row, channels),
            RowKernel::Remap(stats) => stats.apply_row(row),
        }
    }
}
