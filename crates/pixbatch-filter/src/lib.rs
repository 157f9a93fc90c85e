//! pixbatch-filter - Parallel enhancement transforms
//!
//! This crate applies one enhancement to a whole [`PixelBuffer`] with
//! one worker thread per row range:
//!
//! - sRGB encoding curve (`clrspc-sRGB`)
//! - Inversion (`invert`)
//! - Luma greyscale conversion (`greyscale`)
//! - Per-channel histogram equalization (`histeq`), built from sharded
//!   per-worker histograms merged after a join barrier
//!
//! [`PixelBuffer`]: pixbatch_core::PixelBuffer

pub mod enhance;
mod error;
pub mod histogram;
pub mod orchestrator;
mod pool;
pub mod transform;

pub use enhance::{TrcLut, invert_trc, luma, srgb_encode, srgb_trc};
pub use error::{FilterError, FilterResult};
pub use histogram::{Histogram, HistogramStats, uniformity_distance};
pub use orchestrator::{Orchestrator, Phase, RunSummary, run};
pub use transform::{RowKernel, Transform};
