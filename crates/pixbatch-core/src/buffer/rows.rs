//! Row band views
//!
//! Splits a [`PixelBuffer`] into exclusive, non-overlapping mutable views,
//! one per [`RowRange`]. The split goes through `split_at_mut`, so two
//! bands can never alias.

use super::PixelBuffer;
use crate::error::{Error, Result};
use crate::partition::RowRange;
use std::slice::{ChunksExact, ChunksExactMut};

/// Exclusive mutable view over the rows of one [`RowRange`].
#[derive(Debug)]
pub struct RowBand<'a> {
    range: RowRange,
    stride: usize,
    data: &'a mut [u8],
}

impl<'a> RowBand<'a> {
    /// Rows covered by this band.
    #[inline]
    pub fn range(&self) -> RowRange {
        self.range
    }

    /// Bytes per row.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Raw bytes of the band.
    #[inline]
    pub fn data(&self) -> &[u8] {
        self.data
    }

    /// Mutable raw bytes of the band.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        self.data
    }

    /// Iterate over the rows of the band.
    pub fn rows(&self) -> ChunksExact<'_, u8> {
        self.data.chunks_exact(self.stride)
    }

    /// Iterate mutably over the rows of the band.
    pub fn rows_mut(&mut self) -> ChunksExactMut<'_, u8> {
        self.data.chunks_exact_mut(self.stride)
    }
}

impl PixelBuffer {
    /// Check that `ranges` are in bounds, ordered and pairwise disjoint.
    fn validate_ranges(&self, ranges: &[RowRange]) -> Result<()> {
        let mut next_free = 0u32;
        for (i, r) in ranges.iter().enumerate() {
            if r.end < r.start {
                return Err(Error::InvalidParameter(format!(
                    "row range {i} is reversed: {r}"
                )));
            }
            if r.end >= self.height {
                return Err(Error::IndexOutOfBounds {
                    index: r.end as usize,
                    len: self.height as usize,
                });
            }
            if i > 0 && r.start < next_free {
                return Err(Error::InvalidParameter(format!(
                    "row range {i} {r} overlaps or precedes the previous range"
                )));
            }
            next_free = r.end + 1;
        }
        Ok(())
    }

    /// Read-only bytes of the rows in `range`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] if the range extends past the
    /// last row.
    pub fn band(&self, range: RowRange) -> Result<&[u8]> {
        self.validate_ranges(std::slice::from_ref(&range))?;
        let stride = self.row_stride();
        let start = range.start as usize * stride;
        let end = (range.end as usize + 1) * stride;
        Ok(&self.data[start..end])
    }

    /// Split the buffer into one exclusive mutable band per range.
    ///
    /// Ranges must be ordered, pairwise disjoint and inside the image.
    /// Gaps between ranges are allowed; rows in a gap are simply not
    /// handed out.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] for reversed or overlapping
    /// ranges and [`Error::IndexOutOfBounds`] for ranges past the last row.
    pub fn split_rows_mut(&mut self, ranges: &[RowRange]) -> Result<Vec<RowBand<'_>>> {
        self.validate_ranges(ranges)?;
        let stride = self.row_stride();

        let mut bands = Vec::with_capacity(ranges.len());
        let mut rest: &mut [u8] = &mut self.data;
        let mut consumed_rows = 0u32;
        for &range in ranges {
            let skip = (range.start - consumed_rows) as usize * stride;
            let (_, tail) = std::mem::take(&mut rest).split_at_mut(skip);
            let (band, tail) = tail.split_at_mut(range.len() as usize * stride);
            bands.push(RowBand {
                range,
                stride,
                data: band,
            });
            rest = tail;
            consumed_rows = range.end + 1;
        }
        Ok(bands)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Channels, partition_rows};

    fn ramp(width: u32, height: u32) -> PixelBuffer {
        let len = (width * height) as usize;
        let data = (0..len).map(|i| i as u8).collect();
        PixelBuffer::from_bytes(width, height, Channels::Gray, data).unwrap()
    }

    #[test]
    fn test_split_covers_every_row() {
        let mut buf = ramp(4, 5);
        let ranges = partition_rows(5, 2).unwrap();
        let mut bands = buf.split_rows_mut(&ranges).unwrap();
        assert_eq!(bands.len(), 2);
        assert_eq!(bands[0].range(), RowRange { start: 0, end: 2 });
        assert_eq!(bands[0].data().len(), 12);
        assert_eq!(bands[1].data(), &[12, 13, 14, 15, 16, 17, 18, 19]);

        for band in bands.iter_mut() {
            for row in band.rows_mut() {
                row[0] = 255;
            }
        }
        drop(bands);
        for y in 0..5 {
            assert_eq!(buf.row(y)[0], 255);
        }
    }

    #[test]
    fn test_split_with_gap() {
        let mut buf = ramp(2, 4);
        let ranges = [RowRange { start: 0, end: 0 }, RowRange { start: 2, end: 3 }];
        let bands = buf.split_rows_mut(&ranges).unwrap();
        assert_eq!(bands[0].data(), &[0, 1]);
        assert_eq!(bands[1].data(), &[4, 5, 6, 7]);
        assert_eq!(bands[1].rows().count(), 2);
        assert_eq!(bands[1].stride(), 2);
    }

    #[test]
    fn test_split_rejects_overlap() {
        let mut buf = ramp(2, 4);
        let ranges = [RowRange { start: 0, end: 1 }, RowRange { start: 1, end: 3 }];
        assert!(matches!(
            buf.split_rows_mut(&ranges),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_split_rejects_out_of_bounds() {
        let mut buf = ramp(2, 4);
        let ranges = [RowRange { start: 2, end: 4 }];
        assert!(matches!(
            buf.split_rows_mut(&ranges),
            Err(Error::IndexOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_band_read() {
        let buf = ramp(3, 3);
        assert_eq!(
            buf.band(RowRange { start: 1, end: 1 }).unwrap(),
            &[3, 4, 5]
        );
        assert!(buf.band(RowRange { start: 0, end: 3 }).is_err());
    }
}
