use crate::filter::FilterKind;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Markdown,
    Terminal,
}

#[derive(Parser, Debug)]
#[command(name = "reflexmap")]
#[command(about = "Mapping recommendations and experiment statistics for reflexion analysis", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Configuration file (defaults to the nearest .reflexmap.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (can be repeated: -v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbosity: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay filter events and print the resulting recommendations
    Recommend {
        /// JSON file with the events to replay
        events: PathBuf,

        /// Recommendation strategy (overrides the configuration)
        #[arg(long, value_enum)]
        filter: Option<FilterKind>,

        /// Tolerance for equal attraction values (overrides the configuration)
        #[arg(long)]
        delta: Option<f64>,

        /// Print only the mappings that are safe to apply automatically
        #[arg(long, conflicts_with_all = ["candidate", "cluster"])]
        automatic: bool,

        /// Print the recommendations for one candidate
        #[arg(long, conflicts_with = "cluster")]
        candidate: Option<String>,

        /// Print the recommendations for one cluster
        #[arg(long)]
        cluster: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "terminal")]
        format: OutputFormat,
    },

    /// Average the reports of several experiment runs
    Average {
        /// Reports written by earlier runs
        #[arg(required = true)]
        reports: Vec<PathBuf>,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: OutputFormat,
    },

    /// Render a report for reading
    Summarize {
        /// Report to render
        report: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "terminal")]
        format: OutputFormat,
    },

    /// Initialize configuration file
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing_recommend_command() {
        let cli = Cli::parse_from([
            "reflexmap",
            "recommend",
            "events.json",
            "--filter",
            "hug-me",
            "--automatic",
            "-vv",
        ]);

        assert_eq!(cli.verbosity, 2);
        match cli.command {
            Commands::Recommend {
                events,
                filter,
                automatic,
                format,
                ..
            } => {
                assert_eq!(events, PathBuf::from("events.json"));
                assert_eq!(filter, Some(FilterKind::HugMe));
                assert!(automatic);
                assert_eq!(format, OutputFormat::Terminal);
            }
            _ => panic!("Expected Recommend command"),
        }
    }

    #[test]
    fn test_cli_parsing_average_requires_reports() {
        assert!(Cli::try_parse_from(["reflexmap", "average"]).is_err());

        let cli = Cli::parse_from(["reflexmap", "average", "a.json", "b.json", "-o", "out.json"]);
        match cli.command {
            Commands::Average {
                reports, output, ..
            } => {
                assert_eq!(reports.len(), 2);
                assert_eq!(output, Some(PathBuf::from("out.json")));
            }
            _ => panic!("Expected Average command"),
        }
    }

    #[test]
    fn test_automatic_conflicts_with_slices() {
        let result = Cli::try_parse_from([
            "reflexmap",
            "recommend",
            "events.json",
            "--automatic",
            "--candidate",
            "c1",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parsing_init_command() {
        let cli = Cli::parse_from(["reflexmap", "init", "--force"]);
        match cli.command {
            Commands::Init { force } => assert!(force),
            _ => panic!("Expected Init command"),
        }
    }
}
