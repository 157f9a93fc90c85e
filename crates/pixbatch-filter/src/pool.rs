//! Scoped worker threads
//!
//! One named thread is spawned per row range and every thread is joined
//! before the call returns. A worker that returns an error or panics is
//! reported as [`FilterError::WorkerFailure`] once all workers have
//! finished.

use crate::{FilterError, FilterResult};
use pixbatch_core::{PixelBuffer, RowBand, RowRange};
use std::any::Any;
use std::thread::{self, Scope, ScopedJoinHandle};

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {}", s)
    } else {
        "panicked".to_string()
    }
}

fn spawn_worker<'scope, 'env, T, F>(
    scope: &'scope Scope<'scope, 'env>,
    worker: usize,
    f: F,
) -> FilterResult<ScopedJoinHandle<'scope, FilterResult<T>>>
where
    T: Send + 'scope,
    F: FnOnce() -> FilterResult<T> + Send + 'scope,
{
    thread::Builder::new()
        .name(format!("pixbatch-worker-{}", worker))
        .spawn_scoped(scope, f)
        .map_err(|e| FilterError::WorkerFailure {
            worker,
            message: format!("could not spawn thread: {}", e),
        })
}

/// Join every handle, keeping the first failure.
fn join_all<T>(handles: Vec<ScopedJoinHandle<'_, FilterResult<T>>>) -> FilterResult<Vec<T>> {
    let mut results = Vec::with_capacity(handles.len());
    let mut first_err = None;

    for (worker, handle) in handles.into_iter().enumerate() {
        let outcome = match handle.join() {
            Ok(Ok(value)) => {
                results.push(value);
                continue;
            }
            Ok(Err(e)) => FilterError::WorkerFailure {
                worker,
                message: e.to_string(),
            },
            Err(payload) => FilterError::WorkerFailure {
                worker,
                message: panic_message(payload.as_ref()),
            },
        };
        tracing::warn!(worker, error = %outcome, "worker failed");
        first_err.get_or_insert(outcome);
    }

    match first_err {
        Some(e) => Err(e),
        None => Ok(results),
    }
}

/// Run `f` on every band, one thread per band, in place.
///
/// # Errors
///
/// Returns [`FilterError::WorkerFailure`] for the lowest-numbered worker
/// that failed.
pub fn dispatch<F>(bands: Vec<RowBand<'_>>, f: F) -> FilterResult<()>
where
    F: Fn(&mut RowBand<'_>) -> FilterResult<()> + Sync,
{
    let f = &f;
    thread::scope(|s| {
        let mut handles = Vec::with_capacity(bands.len());
        for (worker, mut band) in bands.into_iter().enumerate() {
            tracing::trace!(worker, range = %band.range(), "dispatching band");
            match spawn_worker(s, worker, move || f(&mut band)) {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    // Already spawned workers still have to finish before the
                    // scope ends
                    let _ = join_all(handles);
                    return Err(e);
                }
            }
        }
        join_all(handles).map(|_| ())
    })
}

/// Run `f` on the read-only bytes of every range, one thread per range,
/// and collect the results in range order.
///
/// # Errors
///
/// Returns any error from slicing the buffer, or
/// [`FilterError::WorkerFailure`] for the lowest-numbered failed worker.
pub fn gather<T, F>(buffer: &PixelBuffer, ranges: &[RowRange], f: F) -> FilterResult<Vec<T>>
where
    T: Send,
    F: Fn(RowRange, &[u8]) -> FilterResult<T> + Sync,
{
    let bands = ranges
        .iter()
        .map(|&r| buffer.band(r).map(|bytes| (r, bytes)))
        .collect::<Result<Vec<_>, _>>()?;

    let f = &f;
    thread::scope(|s| {
        let mut handles = Vec::with_capacity(bands.len());
        for (worker, (range, bytes)) in bands.into_iter().enumerate() {
            tracing::trace!(worker, range = %range, "gathering band");
            match spawn_worker(s, worker, move || f(range, bytes)) {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    let _ = join_all(handles);
                    return Err(e);
                }
            }
        }
        join_all(handles)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixbatch_core::{Channels, partition_rows};

    fn ramp(width: u32, height: u32) -> PixelBuffer {
        let data = (0..width * height).map(|i| (i % 256) as u8).collect();
        PixelBuffer::from_bytes(width, height, Channels::Gray, data).unwrap()
    }

    #[test]
    fn test_dispatch_touches_every_row_once() {
        let mut buf = ramp(8, 11);
        let ranges = partition_rows(11, 4).unwrap();
        let bands = buf.split_rows_mut(&ranges).unwrap();
        dispatch(bands, |band| {
            for v in band.data_mut() {
                *v = v.wrapping_add(1);
            }
            Ok(())
        })
        .unwrap();

        let expected: Vec<u8> = (0..88u32).map(|i| (i % 256) as u8 + 1).collect();
        assert_eq!(buf.data(), expected.as_slice());
    }

    #[test]
    fn test_gather_in_range_order() {
        let buf = ramp(2, 5);
        let ranges = partition_rows(5, 3).unwrap();
        let firsts = gather(&buf, &ranges, |range, bytes| Ok((range.start, bytes[0]))).unwrap();
        assert_eq!(firsts, vec![(0, 0), (2, 4), (4, 8)]);
    }

    #[test]
    fn test_dispatch_reports_error() {
        let mut buf = ramp(4, 4);
        let ranges = partition_rows(4, 4).unwrap();
        let bands = buf.split_rows_mut(&ranges).unwrap();
        let err = dispatch(bands, |band| {
            if band.range().start == 2 {
                Err(FilterError::Internal("bad row".into()))
            } else {
                Ok(())
            }
        })
        .unwrap_err();
        match err {
            FilterError::WorkerFailure { worker, message } => {
                assert_eq!(worker, 2);
                assert!(message.contains("bad row"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_dispatch_reports_panic() {
        let mut buf = ramp(4, 4);
        let ranges = partition_rows(4, 2).unwrap();
        let bands = buf.split_rows_mut(&ranges).unwrap();
        let err = dispatch(bands, |band| {
            if band.range().start > 0 {
                panic!("boom");
            }
            Ok(())
        })
        .unwrap_err();
        match err {
            FilterError::WorkerFailure { worker, message } => {
                assert_eq!(worker, 1);
                assert!(message.contains("boom"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_gather_reports_panic() {
        let buf = ramp(4, 4);
        let ranges = partition_rows(4, 2).unwrap();
        let result: FilterResult<Vec<()>> = gather(&buf, &ranges, |_, _| panic!("stats"));
        assert!(matches!(
            result,
            Err(FilterError::WorkerFailure { worker: 0, .. })
        ));
    }
}
