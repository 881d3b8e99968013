//! Recommend command handler
//!
//! Replays a recorded event log into a fresh filter and prints the
//! selected view of its recommendations.

use crate::cli::args::OutputFormat;
use crate::config::RecommendationSettings;
use crate::core::MappingPair;
use crate::filter::{create_filter, load_events, replay, FilterKind};
use anyhow::{Context, Result};
use comfy_table::{presets::UTF8_FULL, Table};
use std::fmt::Write;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct RecommendOptions {
    pub events: PathBuf,
    pub filter: Option<FilterKind>,
    pub delta: Option<f64>,
    pub automatic: bool,
    pub candidate: Option<String>,
    pub cluster: Option<String>,
    pub format: OutputFormat,
}

/// Handle the recommend command
pub fn handle_recommend_command(
    options: &RecommendOptions,
    settings: &RecommendationSettings,
) -> Result<()> {
    let pairs = compute_pairs(options, settings)?;
    print!("{}", render_pairs(&pairs, options.format)?);
    Ok(())
}

fn compute_pairs(
    options: &RecommendOptions,
    settings: &RecommendationSettings,
) -> Result<Vec<MappingPair>> {
    let kind = options.filter.unwrap_or(settings.filter);
    let delta = options.delta.unwrap_or(settings.attraction_value_delta);
    let mut filter = create_filter(kind, delta)?;

    let events = load_events(&options.events)
        .with_context(|| format!("Failed to read events from {}", options.events.display()))?;
    replay(filter.as_mut(), &events)?;
    log::info!(
        "Replayed {} events into the {} filter ({} pairs)",
        events.len(),
        kind,
        filter.matrix().len()
    );

    Ok(match (&options.candidate, &options.cluster) {
        (Some(candidate), _) => filter.get_recommendation_for_candidate(candidate),
        (None, Some(cluster)) => filter.get_recommendation_for_cluster(cluster),
        (None, None) if options.automatic => filter.get_automatic_mappings(),
        (None, None) => filter.get_recommendations(),
    })
}

/// Pure function to render pairs in the requested format
pub fn render_pairs(pairs: &[MappingPair], format: OutputFormat) -> Result<String> {
    let mut output = String::new();
    match format {
        OutputFormat::Json => {
            output = serde_json::to_string_pretty(pairs)?;
            output.push('\n');
        }
        OutputFormat::Markdown => {
            writeln!(output, "| Candidate | Cluster | Attraction |")?;
            writeln!(output, "|-----------|---------|------------|")?;
            for pair in pairs {
                writeln!(
                    output,
                    "| {} | {} | {:.4} |",
                    pair.candidate_id(),
                    pair.cluster_id(),
                    pair.attraction_value()
                )?;
            }
        }
        OutputFormat::Terminal => {
            if pairs.is_empty() {
                writeln!(output, "No recommendations")?;
                return Ok(output);
            }
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_header(vec!["Candidate", "Cluster", "Attraction"]);
            for pair in pairs {
                table.add_row(vec![
                    pair.candidate_id().to_string(),
                    pair.cluster_id().to_string(),
                    format!("{:.4}", pair.attraction_value()),
                ]);
            }
            writeln!(output, "{}", table)?;
        }
    }
    Ok(output)
}
