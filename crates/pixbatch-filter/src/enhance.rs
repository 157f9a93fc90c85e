//! Per-sample enhancement kernels
//!
//! Tone reproduction curve (TRC) lookup tables for the sRGB encoding curve
//! and inversion, plus the luma-based greyscale conversion. Every kernel
//! works on one packed row of interleaved 8-bit samples.

use crate::{FilterError, FilterResult};
use pixbatch_core::{Channels, color};
use std::sync::OnceLock;

/// A 256-entry lookup table for tone reproduction curve mapping.
///
/// Maps input sample values [0..255] to output sample values [0..255].
pub type TrcLut = [u8; 256];

/// Linear segment threshold of the sRGB encoding curve.
const SRGB_LINEAR_THRESHOLD: f64 = 0.0031308;

/// Luma weights for R, G and B, in thousandths.
const LUMA_WEIGHTS: [u32; 3] = [299, 587, 114];

/// Round and clamp a value in sample units to a byte.
#[inline]
fn to_byte(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Encode one linear sample with the sRGB transfer curve.
///
/// `n = v / 255`; below the threshold the curve is `12.92 n`, above it
/// `1.055 n^(1/2.4) - 0.055`. The result is rounded and clamped.
pub fn srgb_encode(v: u8) -> u8 {
    let n = f64::from(v) / 255.0;
    let encoded = if n < SRGB_LINEAR_THRESHOLD {
        12.92 * n
    } else {
        1.055 * n.powf(1.0 / 2.4) - 0.055
    };
    to_byte(encoded * 255.0)
}

/// Generate the sRGB encoding TRC.
pub fn srgb_trc() -> TrcLut {
    let mut lut = [0u8; 256];
    for (i, entry) in lut.iter_mut().enumerate() {
        *entry = srgb_encode(i as u8);
    }
    lut
}

/// Shared sRGB TRC, built on first use.
pub fn srgb_lut() -> &'static TrcLut {
    static LUT: OnceLock<TrcLut> = OnceLock::new();
    LUT.get_or_init(srgb_trc)
}

/// Generate the inversion TRC: `v -> 255 - v`.
pub fn invert_trc() -> TrcLut {
    let mut lut = [0u8; 256];
    for (i, entry) in lut.iter_mut().enumerate() {
        *entry = 255 - i as u8;
    }
    lut
}

/// Shared inversion TRC.
pub fn invert_lut() -> &'static TrcLut {
    static LUT: OnceLock<TrcLut> = OnceLock::new();
    LUT.get_or_init(invert_trc)
}

/// Map every sample of a row through a TRC.
#[inline]
pub fn apply_trc_row(row: &mut [u8], lut: &TrcLut) {
    for v in row.iter_mut() {
        *v = lut[*v as usize];
    }
}

/// Luma of one RGB pixel: `round(0.299 R + 0.587 G + 0.114 B)`.
///
/// Computed in thousandths so that exact halves round up. The weights sum
/// to 1000, so the result never exceeds 255.
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    let sum = LUMA_WEIGHTS[color::RED] * u32::from(r)
        + LUMA_WEIGHTS[color::GREEN] * u32::from(g)
        + LUMA_WEIGHTS[color::BLUE] * u32::from(b);
    ((sum + 500) / 1000) as u8
}

/// Replace every RGB pixel of a row with its luma.
///
/// Greyscale rows are left untouched.
///
/// # Errors
///
/// Returns [`FilterError::Internal`] if an RGB row does not hold a whole
/// number of pixels.
pub fn greyscale_row(row: &mut [u8], channels: Channels) -> FilterResult<()> {
    if channels == Channels::Gray {
        return Ok(());
    }
    if row.len() % channels.samples() != 0 {
        return Err(FilterError::Internal(format!(
            "row of {} bytes is not a whole number of RGB pixels",
            row.len()
        )));
    }
    for px in row.chunks_exact_mut(channels.samples()) {
        let y = luma(px[color::RED], px[color::GREEN], px[color::BLUE]);
        px.fill(y);
    }
    Ok(())
}
