//! Error types for pixbatch-filter

use thiserror::Error;

/// Errors that can occur while running a transform
#[derive(Debug, Error)]
pub enum FilterError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] pixbatch_core::Error),

    /// Enhancement name that does not match any transform
    #[error("unknown enhancement: '{0}'")]
    UnknownTransform(String),

    /// A worker thread failed or panicked
    #[error("worker {worker} failed: {message}")]
    WorkerFailure {
        /// Index of the failing worker
        worker: usize,
        /// Failure description
        message: String,
    },

    /// Orchestrator invariant violated
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for filter operations
pub type FilterResult<T> = Result<T, FilterError>;
