use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use super::{Config, ConfigError};

/// Config file names looked up in the processed root, in order
pub const CONFIG_FILE_NAMES: [&str; 2] = ["cache-bust.toml", ".cache-bust.toml"];

/// Load and validate configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;

    let config: Config =
        toml::from_str(&content).map_err(|e| ConfigError::Toml(path.to_path_buf(), e))?;

    config.validate()?;
    Ok(config)
}

/// Locate a config file directly inside `root`
pub fn find_config(root: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| root.join(name))
        .find(|path| path.is_file())
}

/// Resolve the configuration for a run.
///
/// An explicit path must exist; otherwise the root is searched and the
/// defaults are used when nothing is found.
pub fn resolve_config(root: &Path, explicit: Option<&Path>) -> Result<Config> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => find_config(root),
    };

    match path {
        Some(path) => {
            tracing::debug!("Loading config from {}", path.display());
            let config = load_config(&path)
                .with_context(|| format!("Invalid configuration: {}", path.display()))?;
            Ok(config)
        }
        None => Ok(Config::default()),
    }
}
