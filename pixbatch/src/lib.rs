//! pixbatch - Parallel batch image enhancement
//!
//! Loads a binary PGM/PPM image, applies one enhancement with a fixed
//! number of worker threads (one per row range) and writes the result
//! back with the original header.
//!
//! # Example
//!
//! ```
//! use pixbatch::filter::{Transform, run};
//! use pixbatch::{Channels, PixelBuffer};
//!
//! let buf = PixelBuffer::from_bytes(1, 1, Channels::Rgb, vec![100, 150, 200]).unwrap();
//! let out = run(buf, Transform::Greyscale, 4).unwrap();
//! assert_eq!(out.data(), &[141, 141, 141]);
//! ```

pub mod cli;
pub mod pipeline;

// Re-export core types (primary data structures used everywhere)
pub use pixbatch_core::*;

// Re-export domain crates as modules to avoid name conflicts
pub use pixbatch_filter as filter;
pub use pixbatch_io as io;

pub use pipeline::{EnhanceJob, EnhanceReport, PipelineError, enhance_file};
