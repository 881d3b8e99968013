//! Runtime setup for the CLI: logging and settings resolution.

use crate::config::{load_config, load_config_from, RecommendationSettings};
use anyhow::{Context, Result};
use std::path::Path;

/// Map the `-v` count to a default log level; `RUST_LOG` still wins.
pub fn log_level(verbosity: u8) -> log::LevelFilter {
    match verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}

pub fn init_logging(verbosity: u8) {
    let default = log_level(verbosity).as_str().to_ascii_lowercase();
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .try_init();
}

/// Load settings from an explicit file, or search for one.
pub fn resolve_settings(config: Option<&Path>) -> Result<RecommendationSettings> {
    match config {
        Some(path) => load_config_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(load_config()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_from_verbosity() {
        assert_eq!(log_level(0), log::LevelFilter::Warn);
        assert_eq!(log_level(2), log::LevelFilter::Debug);
        assert_eq!(log_level(9), log::LevelFilter::Trace);
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        assert!(resolve_settings(Some(Path::new("/nonexistent/.reflexmap.toml"))).is_err());
    }
}
