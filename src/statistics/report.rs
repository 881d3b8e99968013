//! Structured reports of experiment results and the writers that render
//! them.
//!
//! [`ExperimentReport`] is plain serde data. JSON output can be parsed
//! back and averaged with other runs later.

use super::candidate::{CandidateStatistic, MappingStep};
use super::experiment::ResultSummary;
use crate::attract::AttractFunctionConfig;
use crate::context::ExperimentContext;
use crate::filter::FilterKind;
use chrono::{DateTime, Utc};
use colored::*;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentReport {
    pub generated_at: DateTime<Utc>,
    pub context: ExperimentContext,
    #[serde(default)]
    pub averaged: bool,
    pub candidate_type: String,
    pub cluster_type: String,
    #[serde(default)]
    pub filter: FilterKind,
    pub summary: ResultSummary,
    #[serde(default)]
    pub attract_function: AttractFunctionConfig,
    #[serde(default)]
    pub candidates: Vec<CandidateRecord>,
}

impl ExperimentReport {
    pub fn from_json(contents: &str) -> crate::core::Result<Self> {
        Ok(serde_json::from_str(contents)?)
    }

    pub fn load(path: &Path) -> crate::core::Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }
}

/// Outcome for a single candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub candidate_id: String,
    pub mapped_cluster_id: Option<String>,
    pub expected_cluster_id: Option<String>,
    pub hit: bool,
    pub mapped_at_mapping_step: MappingStep,
    pub attraction_value: f64,
    pub average_percentile_rank: f64,
}

impl From<&CandidateStatistic> for CandidateRecord {
    fn from(statistic: &CandidateStatistic) -> Self {
        Self {
            candidate_id: statistic.candidate_id.clone(),
            mapped_cluster_id: statistic.mapped_cluster_id.clone(),
            expected_cluster_id: statistic.expected_cluster_id.clone(),
            hit: statistic.hit,
            mapped_at_mapping_step: statistic.mapped_at_mapping_step,
            attraction_value: statistic.attraction_value,
            average_percentile_rank: statistic.average_percentile_rank,
        }
    }
}

impl From<&CandidateRecord> for CandidateStatistic {
    fn from(record: &CandidateRecord) -> Self {
        let mut statistic = CandidateStatistic::new(record.candidate_id.clone());
        statistic.mapped_cluster_id = record.mapped_cluster_id.clone();
        statistic.expected_cluster_id = record.expected_cluster_id.clone();
        statistic.hit = record.hit;
        statistic.mapped_at_mapping_step = record.mapped_at_mapping_step;
        statistic.attraction_value = record.attraction_value;
        statistic.average_percentile_rank = record.average_percentile_rank;
        statistic
    }
}

pub trait ReportWriter {
    fn write_report(&mut self, report: &ExperimentReport) -> anyhow::Result<()>;
}

pub struct JsonWriter<W: Write> {
    writer: W,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> ReportWriter for JsonWriter<W> {
    fn write_report(&mut self, report: &ExperimentReport) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        self.writer.write_all(json.as_bytes())?;
        writeln!(self.writer)?;
        Ok(())
    }
}

pub struct MarkdownWriter<W: Write> {
    writer: W,
}

impl<W: Write> MarkdownWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    fn write_header(&mut self, report: &ExperimentReport) -> anyhow::Result<()> {
        writeln!(self.writer, "# Mapping Experiment Report")?;
        writeln!(self.writer)?;
        writeln!(
            self.writer,
            "Generated: {}",
            report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        writeln!(
            self.writer,
            "Seeds: master {}, current {} ({} iteration{})",
            report.context.master_seed,
            report.context.current_seed,
            report.context.iterations,
            if report.context.iterations == 1 { "" } else { "s" }
        )?;
        writeln!(
            self.writer,
            "Mapping `{}` onto `{}` with the {} filter and {}",
            report.candidate_type, report.cluster_type, report.filter, report.attract_function.kind
        )?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_counts(&mut self, summary: &ResultSummary) -> anyhow::Result<()> {
        writeln!(self.writer, "## Candidates")?;
        writeln!(self.writer)?;
        writeln!(self.writer, "| Metric | Count |")?;
        writeln!(self.writer, "|--------|-------|")?;
        for (name, value) in counts(summary) {
            writeln!(self.writer, "| {} | {} |", name, value)?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_rates(&mut self, summary: &ResultSummary) -> anyhow::Result<()> {
        writeln!(self.writer, "## Rates")?;
        writeln!(self.writer)?;
        writeln!(self.writer, "| Metric | Value | Std. dev. |")?;
        writeln!(self.writer, "|--------|-------|-----------|")?;
        for (name, value, std) in summary.rates() {
            writeln!(self.writer, "| {} | {:.4} | {} |", name, value, format_std(std))?;
        }
        writeln!(
            self.writer,
            "| Average percentile rank | {} | - |",
            format_rank(summary.average_percentile_rank_globally)
        )?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_candidates(&mut self, candidates: &[CandidateRecord]) -> anyhow::Result<()> {
        if candidates.is_empty() {
            return Ok(());
        }
        writeln!(self.writer, "## Candidates in Mapping Order")?;
        writeln!(self.writer)?;
        writeln!(
            self.writer,
            "| Candidate | Mapped | Expected | Step | Hit | Attraction | Percentile rank |"
        )?;
        writeln!(
            self.writer,
            "|-----------|--------|----------|------|-----|------------|-----------------|"
        )?;
        for record in candidates {
            writeln!(
                self.writer,
                "| {} | {} | {} | {} | {} | {:.4} | {} |",
                record.candidate_id,
                record.mapped_cluster_id.as_deref().unwrap_or("-"),
                record.expected_cluster_id.as_deref().unwrap_or("-"),
                record.mapped_at_mapping_step,
                if record.hit { "yes" } else { "no" },
                record.attraction_value,
                format_rank(record.average_percentile_rank)
            )?;
        }
        writeln!(self.writer)?;
        Ok(())
    }
}

impl<W: Write> ReportWriter for MarkdownWriter<W> {
    fn write_report(&mut self, report: &ExperimentReport) -> anyhow::Result<()> {
        self.write_header(report)?;
        self.write_counts(&report.summary)?;
        self.write_rates(&report.summary)?;
        self.write_candidates(&report.candidates)?;
        Ok(())
    }
}

/// Coloured tables for interactive use.
pub struct TerminalWriter<W: Write> {
    writer: W,
}

impl<W: Write> TerminalWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> ReportWriter for TerminalWriter<W> {
    fn write_report(&mut self, report: &ExperimentReport) -> anyhow::Result<()> {
        let title = if report.averaged {
            format!("Averaged over {} runs", report.context.iterations)
        } else {
            format!("Run with seed {}", report.context.current_seed)
        };
        writeln!(self.writer, "{}", title.bright_white().bold())?;
        writeln!(
            self.writer,
            "{} -> {} ({} filter)",
            report.candidate_type.cyan(),
            report.cluster_type.cyan(),
            report.filter
        )?;

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec!["Metric", "Value", "Std. dev."]);
        for (name, value) in counts(&report.summary) {
            table.add_row(vec![Cell::new(name), Cell::new(value), Cell::new("")]);
        }
        for (name, value, std) in report.summary.rates() {
            table.add_row(vec![
                Cell::new(name),
                Cell::new(format!("{:.4}", value)),
                Cell::new(format_std(std)),
            ]);
        }
        table.add_row(vec![
            Cell::new("Average percentile rank"),
            Cell::new(format_rank(report.summary.average_percentile_rank_globally)),
            Cell::new(""),
        ]);
        writeln!(self.writer, "{}", table)?;

        let summary = &report.summary;
        let verdict = format!(
            "{} hits, {} fails, {} left over",
            summary.total_hits, summary.total_fails, summary.candidates_left_over
        );
        let verdict = if summary.total_fails == 0 {
            verdict.green()
        } else {
            verdict.yellow()
        };
        writeln!(self.writer, "{}", verdict)?;
        Ok(())
    }
}

fn counts(summary: &ResultSummary) -> [(&'static str, usize); 6] {
    [
        ("Candidates total", summary.candidates_total),
        ("Considered", summary.candidates_considered),
        ("Initially mapped", summary.initially_mapped),
        ("Left over", summary.candidates_left_over),
        ("Hits", summary.total_hits),
        ("Fails", summary.total_fails),
    ]
}

fn format_std(std: f64) -> String {
    if std < 0.0 {
        "-".to_string()
    } else {
        format!("{:.4}", std)
    }
}

fn format_rank(rank: f64) -> String {
    if rank < 0.0 {
        "n/a".to_string()
    } else {
        format!("{:.4}", rank)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_report() -> ExperimentReport {
        let mut statistic = CandidateStatistic::new("c1");
        statistic.mapped_cluster_id = Some("A".into());
        statistic.expected_cluster_id = Some("A".into());
        statistic.hit = true;
        statistic.attraction_value = 0.8;
        statistic.average_percentile_rank = 0.5;

        ExperimentReport {
            generated_at: Utc::now(),
            context: ExperimentContext::new(3, 3),
            averaged: false,
            candidate_type: "Class".into(),
            cluster_type: "Cluster".into(),
            filter: FilterKind::Max,
            summary: ResultSummary {
                candidates_total: 1,
                candidates_considered: 1,
                total_hits: 1,
                precision: 1.0,
                ..ResultSummary::default()
            },
            attract_function: AttractFunctionConfig::new("CountAttract"),
            candidates: vec![CandidateRecord::from(&statistic)],
        }
    }

    #[test]
    fn test_json_report_parses_back() {
        let report = sample_report();
        let mut buffer = Vec::new();
        JsonWriter::new(&mut buffer).write_report(&report).unwrap();

        let parsed = ExperimentReport::from_json(&String::from_utf8(buffer).unwrap()).unwrap();
        assert_eq!(parsed, report);
    }

    #[test]
    fn test_json_uses_integer_mapping_steps() {
        let mut report = sample_report();
        report.candidates[0].mapped_at_mapping_step = MappingStep::InitiallyMapped;
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["candidates"][0]["mapped_at_mapping_step"], -1);
    }

    #[test]
    fn test_markdown_lists_rates_and_candidates() {
        let mut buffer = Vec::new();
        MarkdownWriter::new(&mut buffer)
            .write_report(&sample_report())
            .unwrap();
        let markdown = String::from_utf8(buffer).unwrap();

        assert!(markdown.contains("# Mapping Experiment Report"));
        assert!(markdown.contains("| Precision | 1.0000 | - |"));
        assert!(markdown.contains("| c1 | A | A | 0 | yes | 0.8000 | 0.5000 |"));
    }

    #[test]
    fn test_terminal_output_contains_summary() {
        colored::control::set_override(false);
        let mut buffer = Vec::new();
        TerminalWriter::new(&mut buffer)
            .write_report(&sample_report())
            .unwrap();
        let output = String::from_utf8(buffer).unwrap();

        assert!(output.contains("Run with seed 3"));
        assert!(output.contains("1 hits, 0 fails, 0 left over"));
    }
}
