//! pixbatch Core - Basic data structures for batch image enhancement
//!
//! This crate provides the data structures shared by the I/O adapters and
//! the parallel transform engine:
//!
//! - [`PixelBuffer`] - Owned, interleaved 8-bit pixel storage
//! - [`Channels`] - Greyscale or RGB sample layout
//! - [`RowRange`] / [`partition_rows`] - Row partitioning across workers
//! - [`RowBand`] - Exclusive mutable view over a range of rows

pub mod buffer;
pub mod error;
pub mod partition;

pub use buffer::{Channels, PixelBuffer, RowBand};
pub use error::{Error, Result};
pub use partition::{RowRange, effective_workers, partition_rows};

/// Number of distinct 8-bit sample values.
pub const NUM_COLOR_VALUES: usize = 256;

/// Channel indices for interleaved RGB samples.
pub mod color {
    /// Red channel
    pub const RED: usize = 0;
    /// Green channel
    pub const GREEN: usize = 1;
    /// Blue channel
    pub const BLUE: usize = 2;
}
