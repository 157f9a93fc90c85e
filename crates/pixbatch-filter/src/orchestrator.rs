//! Run orchestration
//!
//! A run takes ownership of a [`PixelBuffer`], partitions its rows, builds
//! histogram statistics when the transform needs them, dispatches one
//! worker per row range, joins them all and hands the buffer back.
//!
//! The phases of a run are strictly linear:
//!
//! ```text
//! Idle -> Partitioned -> (StatsBuilt ->)? Dispatched -> Joined -> Done
//! ```
//!
//! If any worker fails the buffer is dropped and only the error is
//! returned, so a caller can never write out a partially transformed image.

use crate::histogram::HistogramStats;
use crate::transform::Transform;
use crate::{FilterError, FilterResult, pool};
use pixbatch_core::{PixelBuffer, RowRange, partition_rows};
use std::fmt;
use std::time::{Duration, Instant};

/// Phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Nothing has happened yet
    Idle,
    /// Row ranges computed
    Partitioned,
    /// Histogram shards merged and remap tables derived
    StatsBuilt,
    /// Workers spawned
    Dispatched,
    /// Every worker finished
    Joined,
    /// Buffer handed back
    Done,
}

impl Phase {
    fn can_advance_to(self, next: Phase) -> bool {
        matches!(
            (self, next),
            (Phase::Idle, Phase::Partitioned)
                | (Phase::Partitioned, Phase::StatsBuilt)
                | (Phase::Partitioned, Phase::Dispatched)
                | (Phase::StatsBuilt, Phase::Dispatched)
                | (Phase::Dispatched, Phase::Joined)
                | (Phase::Joined, Phase::Done)
        )
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Partitioned => "partitioned",
            Phase::StatsBuilt => "stats-built",
            Phase::Dispatched => "dispatched",
            Phase::Joined => "joined",
            Phase::Done => "done",
        };
        f.write_str(name)
    }
}

/// Ordered record of the phases a run went through.
#[derive(Debug)]
struct PhaseLog {
    phases: Vec<Phase>,
}

impl PhaseLog {
    fn new() -> Self {
        PhaseLog {
            phases: vec![Phase::Idle],
        }
    }

    fn current(&self) -> Phase {
        self.phases.last().copied().unwrap_or(Phase::Idle)
    }

    fn advance(&mut self, next: Phase) -> FilterResult<()> {
        let current = self.current();
        if !current.can_advance_to(next) {
            return Err(FilterError::Internal(format!(
                "invalid phase transition {} -> {}",
                current, next
            )));
        }
        tracing::debug!(from = %current, to = %next, "phase");
        self.phases.push(next);
        Ok(())
    }
}

/// What a completed run did
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Transform that was applied
    pub transform: Transform,
    /// Row ranges, one per worker actually spawned
    pub ranges: Vec<RowRange>,
    /// Phases in the order they were entered, starting with `Idle`
    pub phases: Vec<Phase>,
    /// Wall-clock time of the whole run
    pub elapsed: Duration,
}

impl RunSummary {
    /// Number of workers that received rows.
    pub fn workers(&self) -> usize {
        self.ranges.len()
    }
}

/// Runs transforms with a fixed number of worker threads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Orchestrator {
    workers: usize,
}

impl Orchestrator {
    /// Create an orchestrator that uses up to `workers` threads per pass.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::Core`] with an invalid-parameter error if
    /// `workers` is 0.
    pub fn new(workers: usize) -> FilterResult<Self> {
        if workers == 0 {
            return Err(pixbatch_core::Error::InvalidParameter(
                "worker count must be >= 1".to_string(),
            )
            .into());
        }
        Ok(Orchestrator { workers })
    }

    /// Requested worker count.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Apply `transform` to every row of `buffer`.
    pub fn run(&self, buffer: PixelBuffer, transform: Transform) -> FilterResult<PixelBuffer> {
        self.run_with_summary(buffer, transform)
            .map(|(buffer, _)| buffer)
    }

    /// Apply `transform` to every row of `buffer` and report what was done.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::WorkerFailure`] if any worker fails; the
    /// buffer is dropped in that case.
    pub fn run_with_summary(
        &self,
        mut buffer: PixelBuffer,
        transform: Transform,
    ) -> FilterResult<(PixelBuffer, RunSummary)> {
        let start = Instant::now();
        let mut log = PhaseLog::new();

        let ranges = partition_rows(buffer.height(), self.workers)?;
        log.advance(Phase::Partitioned)?;
        tracing::debug!(
            transform = %transform,
            requested = self.workers,
            effective = ranges.len(),
            height = buffer.height(),
            "partitioned rows"
        );

        let stats = if transform.needs_statistics() {
            let stats = HistogramStats::collect(&buffer, &ranges)?;
            log.advance(Phase::StatsBuilt)?;
            Some(stats)
        } else {
            None
        };
        let kernel = transform.kernel(stats.as_ref())?;

        let channels = buffer.channels();
        let bands = buffer.split_rows_mut(&ranges)?;
        log.advance(Phase::Dispatched)?;
        pool::dispatch(bands, |band| {
            for row in band.rows_mut() {
                kernel.apply(row, channels)?;
            }
            Ok(())
        })?;
        log.advance(Phase::Joined)?;
        log.advance(Phase::Done)?;

        let summary = RunSummary {
            transform,
            ranges,
            phases: log.phases,
            elapsed: start.elapsed(),
        };
        tracing::info!(
            transform = %transform,
            workers = summary.workers(),
            width = buffer.width(),
            height = buffer.height(),
            elapsed_ms = summary.elapsed.as_secs_f64() * 1000.0,
            "transform complete"
        );
        Ok((buffer, summary))
    }
}

/// Apply `transform` to `buffer` with up to `workers` threads.
///
/// # Examples
///
/// ```
/// use pixbatch_core::{Channels, PixelBuffer};
/// use pixbatch_filter::{Transform, run};
///
/// let buf = PixelBuffer::from_bytes(2, 1, Channels::Gray, vec![0, 200]).unwrap();
/// let out = run(buf, Transform::Invert, 2).unwrap();
/// assert_eq!(out.data(), &[255, 55]);
/// ```
pub fn run(buffer: PixelBuffer, transform: Transform, workers: usize) -> FilterResult<PixelBuffer> {
    Orchestrator::new(workers)?.run(buffer, transform)
}
