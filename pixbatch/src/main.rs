use anyhow::Context;
use clap::Parser;
use std::path::Path;
use std::process::Command;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pixbatch::cli::Cli;
use pixbatch::enhance_file;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pixbatch=info,pixbatch_filter=info,pixbatch_io=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time().compact())
        .init();

    let cli = Cli::parse();
    let job = cli.job().context("invalid enhancement")?;

    let report = enhance_file(&job)
        .with_context(|| format!("failed to enhance {}", job.input.display()))?;

    tracing::info!(
        transform = %report.summary.transform,
        workers = report.summary.workers(),
        elapsed_ms = report.summary.elapsed.as_secs_f64() * 1000.0,
        output = %report.output.display(),
        "done"
    );

    if cli.display {
        show(&report.output);
    }

    Ok(())
}

/// Open an image with the external `display` program.
///
/// Failures are logged; the image has already been written.
fn show(path: &Path) {
    match Command::new("display").arg(path).status() {
        Ok(status) if status.success() => {}
        Ok(status) => tracing::warn!(%status, path = %path.display(), "display exited with an error"),
        Err(e) => tracing::warn!(error = %e, "could not run display"),
    }
}
