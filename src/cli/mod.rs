//! CLI module for reflexmap
//!
//! - Argument parsing (`args`)
//! - Command handlers (`commands`)
//! - Runtime setup (`setup`)

pub mod args;
pub mod commands;
pub mod setup;

pub use args::{Cli, Commands, OutputFormat};
pub use commands::{
    handle_average_command, handle_init_command, handle_recommend_command,
    handle_summarize_command, RecommendOptions,
};
pub use setup::{init_logging, resolve_settings};

/// Parse CLI arguments using Clap
pub fn parse_args() -> Cli {
    use clap::Parser;
    Cli::parse()
}
