//! Histogram statistics for equalization
//!
//! Equalization needs the distribution of the whole image before any
//! sample can be rewritten, so it runs in two steps:
//!
//! 1. Every worker counts the samples of its own row range into a private
//!    per-channel histogram. The orchestrating thread sums the shards after
//!    all workers have joined.
//! 2. The merged counts are turned into one remap table per channel using
//!    the inclusive cumulative distribution: `remap[v] = round(cdf(v) * 255)`.
//!
//! The resulting [`HistogramStats`] is read-only and shared by reference
//! during the apply pass.

use crate::enhance::TrcLut;
use crate::{FilterError, FilterResult, pool};
use pixbatch_core::{Channels, NUM_COLOR_VALUES, PixelBuffer, RowRange};

/// Bucket counts for one channel.
pub type Histogram = [u64; NUM_COLOR_VALUES];

/// Count the samples of a packed byte run, one histogram per channel.
fn count_samples(bytes: &[u8], channels: Channels) -> Vec<Histogram> {
    let samples = channels.samples();
    let mut counts = vec![[0u64; NUM_COLOR_VALUES]; samples];
    for px in bytes.chunks_exact(samples) {
        for (c, &v) in px.iter().enumerate() {
            counts[c][v as usize] += 1;
        }
    }
    counts
}

/// Remap table from one channel's counts.
fn derive_remap(counts: &Histogram, total: u64) -> TrcLut {
    let mut lut = [0u8; 256];
    let mut cumulative = 0u64;
    for (entry, &n) in lut.iter_mut().zip(counts.iter()) {
        cumulative += n;
        let cdf = cumulative as f64 / total as f64;
        *entry = (cdf * 255.0).round().clamp(0.0, 255.0) as u8;
    }
    lut
}

/// Per-channel histograms and the equalization tables derived from them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistogramStats {
    channels: Channels,
    pixel_count: u64,
    counts: Vec<Histogram>,
    remap: Vec<TrcLut>,
}

impl HistogramStats {
    /// Build statistics from already-merged per-channel counts.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::Internal`] if the number of histograms does
    /// not match the channel count or if the channels disagree on the
    /// number of pixels.
    pub fn from_counts(channels: Channels, counts: Vec<Histogram>) -> FilterResult<Self> {
        if counts.len() != channels.samples() {
            return Err(FilterError::Internal(format!(
                "{} histograms for {} channels",
                counts.len(),
                channels.count()
            )));
        }
        let pixel_count: u64 = counts[0].iter().sum();
        if pixel_count == 0 {
            return Err(FilterError::Internal("empty histogram".to_string()));
        }
        if let Some(c) = counts
            .iter()
            .position(|h| h.iter().sum::<u64>() != pixel_count)
        {
            return Err(FilterError::Internal(format!(
                "channel {} does not count {} pixels",
                c, pixel_count
            )));
        }

        let remap = counts
            .iter()
            .map(|h| derive_remap(h, pixel_count))
            .collect();
        Ok(HistogramStats {
            channels,
            pixel_count,
            counts,
            remap,
        })
    }

    /// Collect statistics with one worker per range and merge the shards.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::WorkerFailure`] if a counting worker fails,
    /// and [`FilterError::Internal`] if the ranges do not cover the image.
    pub fn collect(buffer: &PixelBuffer, ranges: &[RowRange]) -> FilterResult<Self> {
        let channels = buffer.channels();
        let shards = pool::gather(buffer, ranges, |_, bytes| {
            Ok(count_samples(bytes, channels))
        })?;
        let merged = Self::merge(channels, shards);

        let stats = Self::from_counts(channels, merged)?;
        if stats.pixel_count != buffer.pixel_count() {
            return Err(FilterError::Internal(format!(
                "statistics counted {} of {} pixels",
                stats.pixel_count,
                buffer.pixel_count()
            )));
        }
        tracing::debug!(
            shards = ranges.len(),
            pixels = stats.pixel_count,
            "merged histogram shards"
        );
        Ok(stats)
    }

    /// Collect statistics on the calling thread.
    pub fn from_buffer(buffer: &PixelBuffer) -> FilterResult<Self> {
        let channels = buffer.channels();
        let counts = count_samples(buffer.data(), channels);
        let stats = Self::from_counts(channels, counts)?;
        debug_assert_eq!(stats.pixel_count, buffer.pixel_count());
        Ok(stats)
    }

    /// Sum per-worker shards bucket by bucket.
    fn merge(channels: Channels, shards: Vec<Vec<Histogram>>) -> Vec<Histogram> {
        let mut merged = vec![[0u64; NUM_COLOR_VALUES]; channels.samples()];
        for shard in shards {
            for (total, part) in merged.iter_mut().zip(shard.iter()) {
                for (t, p) in total.iter_mut().zip(part.iter()) {
                    *t += p;
                }
            }
        }
        merged
    }

    /// Channel layout the statistics were built for.
    pub fn channels(&self) -> Channels {
        self.channels
    }

    /// Number of pixels counted in each channel.
    pub fn pixel_count(&self) -> u64 {
        self.pixel_count
    }

    /// Bucket counts of channel `c`.
    pub fn counts(&self, c: usize) -> Option<&Histogram> {
        self.counts.get(c)
    }

    /// Equalization table of channel `c`.
    pub fn remap(&self, c: usize) -> Option<&TrcLut> {
        self.remap.get(c)
    }

    /// Rewrite every sample of a row through its channel's table.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::Internal`] if the row does not hold a whole
    /// number of pixels.
    pub fn apply_row(&self, row: &mut [u8]) -> FilterResult<()> {
        let samples = self.channels.samples();
        if row.len() % samples != 0 {
            return Err(FilterError::Internal(format!(
                "row of {} bytes is not a whole number of {}-channel pixels",
                row.len(),
                samples
            )));
        }
        for px in row.chunks_exact_mut(samples) {
            for (v, lut) in px.iter_mut().zip(self.remap.iter()) {
                *v = lut[*v as usize];
            }
        }
        Ok(())
    }
}

/// Largest gap between a histogram's cumulative distribution and the
/// uniform one, in [0, 1].
///
/// Lower is flatter; a perfectly uniform histogram scores close to 0.
pub fn uniformity_distance(counts: &Histogram) -> f64 {
    let total: u64 = counts.iter().sum();
    if total == 0 {
        return 0.0;
    }
    let mut cumulative = 0u64;
    let mut worst = 0.0f64;
    for (i, &n) in counts.iter().enumerate() {
        cumulative += n;
        let cdf = cumulative as f64 / total as f64;
        let uniform = (i + 1) as f64 / NUM_COLOR_VALUES as f64;
        worst = worst.max((cdf - uniform).abs());
    }
    worst
}
