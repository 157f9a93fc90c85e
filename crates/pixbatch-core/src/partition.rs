//! Row partitioning
//!
//! Splits the rows of an image into contiguous, non-overlapping ranges,
//! one per worker. The first `height % workers` ranges receive one extra
//! row each, so range sizes differ by at most one.

use crate::error::{Error, Result};

/// An inclusive range of image rows `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowRange {
    /// First row (inclusive)
    pub start: u32,
    /// Last row (inclusive)
    pub end: u32,
}

impl RowRange {
    /// Number of rows in the range (always >= 1).
    #[inline]
    pub fn len(&self) -> u32 {
        self.end - self.start + 1
    }

    /// Always `false`; a range holds at least one row.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl std::fmt::Display for RowRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

/// Number of workers that actually receive rows: `min(workers, height)`.
#[inline]
pub fn effective_workers(height: u32, workers: usize) -> usize {
    workers.min(height as usize)
}

/// Partition `height` rows among `workers` workers.
///
/// Worker `t` gets `height / workers` rows, plus one if
/// `t < height % workers`. When there are more workers than rows the
/// worker count is clamped to `height`, so every returned range is
/// non-empty.
///
/// # Errors
///
/// Returns [`Error::InvalidDimension`] if `height` is 0 and
/// [`Error::InvalidParameter`] if `workers` is 0.
///
/// # Examples
///
/// ```
/// use pixbatch_core::{RowRange, partition_rows};
///
/// let ranges = partition_rows(4, 3).unwrap();
/// assert_eq!(
///     ranges,
///     vec![
///         RowRange { start: 0, end: 1 },
///         RowRange { start: 2, end: 2 },
///         RowRange { start: 3, end: 3 },
///     ]
/// );
/// ```
pub fn partition_rows(height: u32, workers: usize) -> Result<Vec<RowRange>> {
    if height == 0 {
        return Err(Error::InvalidDimension { width: 0, height });
    }
    if workers == 0 {
        return Err(Error::InvalidParameter(
            "worker count must be >= 1".to_string(),
        ));
    }

    let n = effective_workers(height, workers) as u32;
    let base = height / n;
    let remainder = height % n;

    let mut ranges = Vec::with_capacity(n as usize);
    let mut start = 0u32;
    for t in 0..n {
        let rows = base + u32::from(t < remainder);
        ranges.push(RowRange {
            start,
            end: start + rows - 1,
        });
        start += rows;
    }
    debug_assert_eq!(start, height);
    Ok(ranges)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_exact_cover(ranges: &[RowRange], height: u32) {
        assert_eq!(ranges.first().map(|r| r.start), Some(0));
        assert_eq!(ranges.last().map(|r| r.end), Some(height - 1));
        for pair in ranges.windows(2) {
            assert_eq!(pair[0].end + 1, pair[1].start, "gap or overlap");
        }
        let total: u32 = ranges.iter().map(|r| r.len()).sum();
        assert_eq!(total, height);
        let min = ranges.iter().map(|r| r.len()).min().unwrap();
        let max = ranges.iter().map(|r| r.len()).max().unwrap();
        assert!(max - min <= 1, "unbalanced: {min}..{max}");
    }

    #[test]
    fn test_partition_four_rows_three_workers() {
        let ranges = partition_rows(4, 3).unwrap();
        assert_eq!(
            ranges,
            vec![
                RowRange { start: 0, end: 1 },
                RowRange { start: 2, end: 2 },
                RowRange { start: 3, end: 3 },
            ]
        );
    }

    #[test]
    fn test_partition_even_split() {
        let ranges = partition_rows(512, 4).unwrap();
        assert_eq!(ranges.len(), 4);
        assert!(ranges.iter().all(|r| r.len() == 128));
        assert_exact_cover(&ranges, 512);
    }

    #[test]
    fn test_partition_single_worker() {
        let ranges = partition_rows(7, 1).unwrap();
        assert_eq!(ranges, vec![RowRange { start: 0, end: 6 }]);
    }

    #[test]
    fn test_partition_clamps_workers() {
        let ranges = partition_rows(3, 10).unwrap();
        assert_eq!(ranges.len(), 3);
        assert!(ranges.iter().all(|r| r.len() == 1));
        assert_eq!(effective_workers(3, 10), 3);
        assert_eq!(effective_workers(30, 10), 10);
    }

    #[test]
    fn test_partition_remainder_goes_first() {
        let ranges = partition_rows(10, 4).unwrap();
        let sizes: Vec<u32> = ranges.iter().map(|r| r.len()).collect();
        assert_eq!(sizes, vec![3, 3, 2, 2]);
    }

    #[test]
    fn test_partition_cover_exhaustive() {
        for height in 1..=64 {
            for workers in 1..=70 {
                let ranges = partition_rows(height, workers).unwrap();
                assert_eq!(ranges.len(), workers.min(height as usize));
                assert_exact_cover(&ranges, height);
            }
        }
    }

    #[test]
    fn test_partition_deterministic() {
        assert_eq!(partition_rows(97, 6).unwrap(), partition_rows(97, 6).unwrap());
    }

    #[test]
    fn test_partition_invalid() {
        assert!(matches!(
            partition_rows(0, 4),
            Err(Error::InvalidDimension { .. })
        ));
        assert!(matches!(
            partition_rows(4, 0),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_row_range() {
        let r = RowRange { start: 2, end: 5 };
        assert_eq!(r.len(), 4);
        assert!(!r.is_empty());
        assert_eq!(r.to_string(), "[2, 5]");
    }
}
