//! `prodtrack init` command.

use crate::config::settings::default_config_path;
use crate::config::Config;
use crate::error::ProdTrackError;
use std::path::Path;

pub fn run(config_path: Option<&Path>, force: bool) -> Result<String, ProdTrackError> {
    let config_path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(default_config_path);

    if config_path.exists() && !force {
        return Err(ProdTrackError::ConfigError(format!(
            "Configuration file already exists: {}. Use --force to overwrite.",
            config_path.display()
        )));
    }

    if let Some(dir) = config_path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(&config_path, Config::default_toml())?;

    Ok(format!(
        "Created configuration file: {}",
        config_path.display()
    ))
}
