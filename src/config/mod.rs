//! Configuration for recommendation sessions and experiments.
//!
//! Settings are read from `.reflexmap.toml`, looked up in the working
//! directory and its ancestors. Every field has a default, so an empty or
//! missing file yields a usable configuration.

pub mod loader;
pub mod settings;

pub use loader::{
    default_config_toml, directory_ancestors, load_config, load_config_from,
    parse_and_validate_config, CONFIG_FILE_NAME,
};
pub use settings::{ExperimentSettings, RecommendationSettings};
