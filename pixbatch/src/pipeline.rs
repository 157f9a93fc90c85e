//! File-to-file enhancement
//!
//! Reads an image, checks it against the requested geometry, runs the
//! transform and only then writes the output. Nothing is written when any
//! earlier step fails.

use pixbatch_filter::{FilterError, Orchestrator, RunSummary, Transform};
use pixbatch_io::{ImageFormat, IoError};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from a file-to-file run
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Reading or writing an image failed
    #[error(transparent)]
    Io(#[from] IoError),

    /// The transform failed
    #[error(transparent)]
    Filter(#[from] FilterError),

    /// Requested width or height disagrees with the file header
    #[error("{what} mismatch: requested {requested}, image has {actual}")]
    DimensionMismatch {
        /// "width" or "height"
        what: &'static str,
        /// Value given on the command line
        requested: u32,
        /// Value in the file header
        actual: u32,
    },
}

/// One enhancement run from an input file to an output file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnhanceJob {
    /// Input PGM/PPM file
    pub input: PathBuf,
    /// Output path without extension; `.pgm`/`.ppm` is appended
    pub output_stem: PathBuf,
    /// Transform to apply
    pub transform: Transform,
    /// Number of worker threads
    pub workers: usize,
    /// Expected width, checked against the header when set
    pub width: Option<u32>,
    /// Expected height, checked against the header when set
    pub height: Option<u32>,
    /// Also write `<output_stem>.png`
    pub export_png: bool,
}

/// Result of a successful run
#[derive(Debug, Clone)]
pub struct EnhanceReport {
    /// PNM file written
    pub output: PathBuf,
    /// PNG file written, if requested
    pub png: Option<PathBuf>,
    /// What the orchestrator did
    pub summary: RunSummary,
}

/// Append an extension to a path without replacing an existing one.
fn with_suffix(stem: &Path, ext: &str) -> PathBuf {
    let mut name = stem.as_os_str().to_owned();
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

/// Output path for a decoded image: the stem plus its PNM extension.
pub fn output_path(stem: &Path, format: ImageFormat) -> PathBuf {
    with_suffix(stem, format.extension())
}

fn check_dimension(what: &'static str, requested: Option<u32>, actual: u32) -> Result<(), PipelineError> {
    match requested {
        Some(requested) if requested != actual => Err(PipelineError::DimensionMismatch {
            what,
            requested,
            actual,
        }),
        _ => Ok(()),
    }
}

/// Run `job`: read, transform, then write.
///
/// # Errors
///
/// Returns the first failure; no output file is created unless the
/// transform succeeded.
pub fn enhance_file(job: &EnhanceJob) -> Result<EnhanceReport, PipelineError> {
    let orchestrator = Orchestrator::new(job.workers)?;

    let image = pixbatch_io::read_image(&job.input)?;
    let buffer = image.buffer();
    check_dimension("width", job.width, buffer.width())?;
    check_dimension("height", job.height, buffer.height())?;
    tracing::info!(
        input = %job.input.display(),
        width = buffer.width(),
        height = buffer.height(),
        channels = buffer.channels().count(),
        "loaded image"
    );

    let (header, buffer) = image.into_parts();
    let (buffer, summary) = orchestrator.run_with_summary(buffer, job.transform)?;
    let image = pixbatch_io::PnmImage::from_parts(header, buffer)?;

    let output = output_path(&job.output_stem, image.format());
    pixbatch_io::write_image(&image, &output)?;
    tracing::info!(output = %output.display(), "wrote image");

    let png = if job.export_png {
        Some(export_png(&image, &job.output_stem)?)
    } else {
        None
    };

    Ok(EnhanceReport {
        output,
        png,
        summary,
    })
}

#[cfg(feature = "png-format")]
fn export_png(image: &pixbatch_io::PnmImage, stem: &Path) -> Result<PathBuf, PipelineError> {
    let path = output_path(stem, ImageFormat::Png);
    pixbatch_io::export_png(image.buffer(), &path)?;
    tracing::info!(png = %path.display(), "exported PNG");
    Ok(path)
}

#[cfg(not(feature = "png-format"))]
fn export_png(_image: &pixbatch_io::PnmImage, _stem: &Path) -> Result<PathBuf, PipelineError> {
    Err(IoError::UnsupportedFormat("PNG export (png-format feature disabled)".to_string()).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path() {
        assert_eq!(
            output_path(Path::new("images/output"), ImageFormat::Pgm),
            PathBuf::from("images/output.pgm")
        );
        assert_eq!(
            output_path(Path::new("out.v2"), ImageFormat::Ppm),
            PathBuf::from("out.v2.ppm")
        );
    }

    #[test]
    fn test_check_dimension() {
        assert!(check_dimension("width", None, 10).is_ok());
        assert!(check_dimension("width", Some(10), 10).is_ok());
        let err = check_dimension("height", Some(512), 16).unwrap_err();
        assert_eq!(
            err.to_string(),
            "height mismatch: requested 512, image has 16"
        );
    }
}
