//! Command-line interface

use crate::pipeline::EnhanceJob;
use clap::{ArgAction, Parser, builder::BoolishValueParser};
use pixbatch_filter::{FilterResult, Transform};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "pixbatch")]
#[command(about = "Enhance a PGM/PPM image with a fixed number of worker threads")]
#[command(version)]
pub struct Cli {
    /// Expected image width in pixels (checked against the file header)
    #[arg(short = 'W', long)]
    pub width: Option<u32>,

    /// Expected image height in pixels (checked against the file header)
    #[arg(short = 'H', long)]
    pub height: Option<u32>,

    /// Number of worker threads
    #[arg(short, long, default_value_t = 1)]
    pub threads: usize,

    /// Enhancement to apply [histeq, invert, clrspc-sRGB, greyscale]
    #[arg(short, long, default_value = "clrspc-sRGB")]
    pub enhancement: String,

    /// Input file name, including the extension
    #[arg(short, long, default_value = "airplane.ppm")]
    pub input: String,

    /// Output file name without extension
    #[arg(short, long, default_value = "output")]
    pub output: String,

    /// Directory holding input and output images
    #[arg(long, env = "PIXBATCH_IMAGE_DIR", default_value = "images")]
    pub image_dir: PathBuf,

    /// Open the result with the external `display` program [0|1, bare flag means 1]
    #[arg(short, long, num_args = 0..=1, default_value = "0", default_missing_value = "1",
          value_parser = BoolishValueParser::new(), action = ArgAction::Set)]
    pub display: bool,

    /// Also write the result as `<output>.png` [0|1, bare flag means 1]
    #[arg(short, long, num_args = 0..=1, default_value = "0", default_missing_value = "1",
          value_parser = BoolishValueParser::new(), action = ArgAction::Set)]
    pub convert: bool,
}

impl Cli {
    /// Resolve the arguments into a job.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::UnknownTransform`](pixbatch_filter::FilterError::UnknownTransform)
    /// for an unrecognized enhancement name.
    pub fn job(&self) -> FilterResult<EnhanceJob> {
        let transform: Transform = self.enhancement.parse()?;
        Ok(EnhanceJob {
            input: self.image_dir.join(&self.input),
            output_stem: self.image_dir.join(&self.output),
            transform,
            workers: self.threads,
            width: self.width,
            height: self.height,
            export_png: self.convert,
        })
    }
}
