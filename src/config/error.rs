use std::path::PathBuf;
use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse config file `{0}`")]
    Toml(PathBuf, #[source] toml::de::Error),

    #[error("Invalid exclude pattern `{0}`")]
    Glob(String, #[source] globset::Error),

    #[error("Config validation error: {0}")]
    Validation(String),
}
