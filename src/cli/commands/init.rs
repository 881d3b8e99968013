use crate::config::{default_config_toml, CONFIG_FILE_NAME};
use anyhow::Result;
use std::path::{Path, PathBuf};

/// Handle the init command in the working directory
pub fn handle_init_command(force: bool) -> Result<()> {
    let path = init_config_in(&std::env::current_dir()?, force)?;
    println!("Created {} configuration file", path.display());
    Ok(())
}

pub fn init_config_in(dir: &Path, force: bool) -> Result<PathBuf> {
    let config_path = dir.join(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!("Configuration file already exists. Use --force to overwrite.");
    }

    std::fs::write(&config_path, default_config_toml())?;
    Ok(config_path)
}
