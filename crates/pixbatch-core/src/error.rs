//! Error types for pixbatch-core
//!
//! Provides a unified error type for buffer construction, row access and
//! row partitioning. Each variant carries enough context for diagnostics
//! without exposing the buffer internals.

use thiserror::Error;

/// pixbatch-core error type
#[derive(Error, Debug)]
pub enum Error {
    /// Width or height is zero
    #[error("invalid image dimensions: {width}x{height}")]
    InvalidDimension { width: u32, height: u32 },

    /// Channel count other than 1 (greyscale) or 3 (RGB)
    #[error("invalid channel count: {0}")]
    InvalidChannels(u32),

    /// Byte length does not match width * height * channels
    #[error("buffer length mismatch: expected {expected} bytes, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Row or sample index out of bounds
    #[error("index out of bounds: {index} >= {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// Invalid parameter value
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Pixel storage could not be reserved
    #[error("memory allocation failed for {bytes} bytes")]
    AllocationFailed { bytes: usize },
}

/// Result type alias for pixbatch-core operations
pub type Result<T> = std::result::Result<T, Error>;
