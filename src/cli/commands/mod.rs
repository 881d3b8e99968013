//! Command handlers for CLI subcommands

mod average;
mod init;
mod recommend;
mod summarize;

pub use average::handle_average_command;
pub use init::{handle_init_command, init_config_in};
pub use recommend::{handle_recommend_command, render_pairs, RecommendOptions};
pub use summarize::{handle_summarize_command, render_report};
