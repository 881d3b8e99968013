//! Summarize command handler

use crate::cli::args::OutputFormat;
use crate::statistics::{ExperimentReport, JsonWriter, MarkdownWriter, ReportWriter, TerminalWriter};
use anyhow::{Context, Result};
use std::path::Path;

/// Handle the summarize command
pub fn handle_summarize_command(report: &Path, format: OutputFormat) -> Result<()> {
    let report = ExperimentReport::load(report)
        .with_context(|| format!("Failed to read report {}", report.display()))?;
    print!("{}", render_report(&report, format)?);
    Ok(())
}

/// Render a report with the writer matching `format`.
pub fn render_report(report: &ExperimentReport, format: OutputFormat) -> Result<String> {
    let mut buffer = Vec::new();
    match format {
        OutputFormat::Json => JsonWriter::new(&mut buffer).write_report(report)?,
        OutputFormat::Markdown => MarkdownWriter::new(&mut buffer).write_report(report)?,
        OutputFormat::Terminal => TerminalWriter::new(&mut buffer).write_report(report)?,
    }
    Ok(String::from_utf8(buffer)?)
}
