//! Average command handler
//!
//! Combines reports written by separate runs into one averaged report.

use super::summarize::render_report;
use crate::cli::args::OutputFormat;
use crate::statistics::{ExperimentReport, MappingExperimentResult};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Handle the average command
pub fn handle_average_command(
    reports: &[PathBuf],
    output: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let averaged = average_reports(reports)?;
    let rendered = render_report(&averaged, format)?;

    if let Some(output_path) = output {
        std::fs::write(output_path, rendered)?;
        log::info!("Wrote averaged report to {}", output_path.display());
    } else {
        print!("{}", rendered);
    }
    Ok(())
}

/// Load every report and average the results they describe.
pub(crate) fn average_reports(paths: &[PathBuf]) -> Result<ExperimentReport> {
    let results = paths
        .iter()
        .map(|path| {
            ExperimentReport::load(path)
                .map(|report| MappingExperimentResult::from_report(&report))
                .with_context(|| format!("Failed to read report {}", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    let settings = results
        .first()
        .map(|result| result.settings().clone())
        .context("No reports given")?;
    let averaged = MappingExperimentResult::average_results(&results, &settings)?;
    Ok(averaged.to_report()?)
}
