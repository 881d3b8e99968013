use std::fs;
use std::path::{Path, PathBuf};

use super::settings::RecommendationSettings;
use crate::core::Result;

/// File name searched for in the working directory and its ancestors
pub const CONFIG_FILE_NAME: &str = ".reflexmap.toml";

const MAX_TRAVERSAL_DEPTH: usize = 10;

/// Pure function to parse and validate settings from a TOML string
pub fn parse_and_validate_config(contents: &str) -> Result<RecommendationSettings> {
    let settings = toml::from_str::<RecommendationSettings>(contents)?;
    settings.validate()?;
    Ok(settings)
}

/// Load settings from an explicit path; errors are returned, not swallowed
pub fn load_config_from(path: &Path) -> Result<RecommendationSettings> {
    let contents = fs::read_to_string(path)?;
    let settings = parse_and_validate_config(&contents)?;
    log::debug!("Loaded config from {}", path.display());
    Ok(settings)
}

/// Try loading settings from a candidate path, logging why it was skipped
pub(crate) fn try_load_config_from_path(config_path: &Path) -> Option<RecommendationSettings> {
    let contents = match fs::read_to_string(config_path) {
        Ok(contents) => contents,
        Err(e) => {
            handle_read_error(config_path, &e);
            return None;
        }
    };

    match parse_and_validate_config(&contents) {
        Ok(settings) => {
            log::debug!("Loaded config from {}", config_path.display());
            Some(settings)
        }
        Err(e) => {
            log::warn!(
                "Ignoring {}: {}. Using defaults.",
                config_path.display(),
                e
            );
            None
        }
    }
}

/// Handle file read errors with appropriate logging
fn handle_read_error(config_path: &Path, error: &std::io::Error) {
    // Only log actual errors, not "file not found"
    if error.kind() != std::io::ErrorKind::NotFound {
        log::warn!(
            "Failed to read config file {}: {}",
            config_path.display(),
            error
        );
    }
}

/// Pure function to generate directory ancestors up to a depth limit
pub fn directory_ancestors(start: PathBuf, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| {
        let mut parent = dir.clone();
        if parent.pop() {
            Some(parent)
        } else {
            None
        }
    })
    .take(max_depth)
}

/// Search the working directory and its ancestors for a config file
pub fn load_config() -> RecommendationSettings {
    let current = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            log::warn!(
                "Failed to get current directory: {}. Using default config.",
                e
            );
            return RecommendationSettings::default();
        }
    };
    load_config_near(current)
}

pub(crate) fn load_config_near(start: PathBuf) -> RecommendationSettings {
    directory_ancestors(start, MAX_TRAVERSAL_DEPTH)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find_map(|path| try_load_config_from_path(&path))
        .unwrap_or_else(|| {
            log::debug!(
                "No config found after checking {} directories. Using default config.",
                MAX_TRAVERSAL_DEPTH
            );
            RecommendationSettings::default()
        })
}

/// Default settings rendered as TOML, used by `reflexmap init`
pub fn default_config_toml() -> String {
    let body = toml::to_string_pretty(&RecommendationSettings::default())
        .unwrap_or_else(|e| format!("# failed to render defaults: {}\n", e));
    format!("# reflexmap configuration\n\n{}", body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterKind;
    use indoc::indoc;
    use tempfile::TempDir;

    #[test]
    fn test_parse_full_config() {
        let settings = parse_and_validate_config(indoc! {r#"
            candidate_type = "File"
            cluster_type = "Component"
            filter = "hug-me"
            attraction_value_delta = 0.01

            [experiment]
            master_seed = 42
            iterations = 5

            [attract_function]
            kind = "NBAttract"
            alpha_smoothing = 1.0
        "#})
        .unwrap();

        assert_eq!(settings.candidate_type, "File");
        assert_eq!(settings.filter, FilterKind::HugMe);
        assert_eq!(settings.experiment.iterations, 5);
        assert_eq!(settings.attract_function.kind, "NBAttract");
        assert!(settings.attract_function.parameters.contains_key("alpha_smoothing"));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let settings = parse_and_validate_config("").unwrap();
        assert_eq!(settings, RecommendationSettings::default());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        assert!(parse_and_validate_config("cluster_type = \"\"").is_err());
        assert!(parse_and_validate_config("filter = \"median\"").is_err());
    }

    #[test]
    fn test_default_config_round_trips() {
        let rendered = default_config_toml();
        let parsed = parse_and_validate_config(&rendered).unwrap();
        assert_eq!(parsed, RecommendationSettings::default());
    }

    #[test]
    fn test_load_config_from_ancestor() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), "cluster_type = \"Layer\"").unwrap();

        let settings = load_config_near(nested);
        assert_eq!(settings.cluster_type, "Layer");
    }

    #[test]
    fn test_broken_config_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), "filter = 3").unwrap();

        let settings = load_config_near(dir.path().to_path_buf());
        assert_eq!(settings, RecommendationSettings::default());
    }
}
