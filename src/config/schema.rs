use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Root configuration structure for cache-bust.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Which files are scanned
    #[serde(default)]
    pub scan: ScanConfig,

    /// Where backups and the run log go
    #[serde(default)]
    pub backup: BackupConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Suffixes of files that get fingerprinted and renamed
    #[serde(default = "default_asset_extensions")]
    pub asset_extensions: Vec<String>,

    /// Suffixes of files whose references get rewritten
    #[serde(default = "default_markup_extensions")]
    pub markup_extensions: Vec<String>,

    /// Glob patterns (relative to the root) that are never scanned
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Also scan the backup directory
    #[serde(default)]
    pub include_backup_dir: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            asset_extensions: default_asset_extensions(),
            markup_extensions: default_markup_extensions(),
            exclude: Vec::new(),
            include_backup_dir: false,
        }
    }
}

fn default_asset_extensions() -> Vec<String> {
    vec![".js".to_string(), ".css".to_string()]
}

fn default_markup_extensions() -> Vec<String> {
    vec![".html".to_string()]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupConfig {
    /// Backup directory, relative to the root
    #[serde(default = "default_backup_dir")]
    pub directory: String,

    /// Run log file name inside the backup directory
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            directory: default_backup_dir(),
            log_file: default_log_file(),
        }
    }
}

fn default_backup_dir() -> String {
    ".rename".to_string()
}

fn default_log_file() -> String {
    "log.txt".to_string()
}

impl Config {
    /// Check invariants serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scan.asset_extensions.is_empty() {
            return Err(ConfigError::Validation(
                "scan.asset_extensions must not be empty".to_string(),
            ));
        }
        if self.scan.markup_extensions.is_empty() {
            return Err(ConfigError::Validation(
                "scan.markup_extensions must not be empty".to_string(),
            ));
        }

        let all = self
            .scan
            .asset_extensions
            .iter()
            .chain(&self.scan.markup_extensions);
        for ext in all {
            if ext.is_empty() {
                return Err(ConfigError::Validation(
                    "file extensions must not be empty strings".to_string(),
                ));
            }
        }

        if let Some(ext) = self
            .scan
            .asset_extensions
            .iter()
            .find(|ext| self.scan.markup_extensions.contains(ext))
        {
            return Err(ConfigError::Validation(format!(
                "`{ext}` is listed as both an asset and a markup extension"
            )));
        }

        if self.backup.directory.trim().is_empty() {
            return Err(ConfigError::Validation(
                "backup.directory must not be empty".to_string(),
            ));
        }
        if self.backup.log_file.trim().is_empty() {
            return Err(ConfigError::Validation(
                "backup.log_file must not be empty".to_string(),
            ));
        }

        self.exclude_set()?;
        Ok(())
    }

    /// Compile the exclude patterns
    pub fn exclude_set(&self) -> Result<GlobSet, ConfigError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.scan.exclude {
            let glob = Glob::new(pattern).map_err(|e| ConfigError::Glob(pattern.clone(), e))?;
            builder.add(glob);
        }
        builder
            .build()
            .map_err(|e| ConfigError::Glob(self.scan.exclude.join(", "), e))
    }

    /// Generate default TOML content
    pub fn default_toml() -> String {
        r#"[scan]
# Files that get a content fingerprint in their name
asset_extensions = [".js", ".css"]
# Files whose references to renamed assets get rewritten
markup_extensions = [".html"]
# Glob patterns relative to the root that are never touched
# exclude = ["vendor/**", "**/*.min.js"]
exclude = []
# Scan the backup directory as well
include_backup_dir = false

[backup]
directory = ".rename"
log_file = "log.txt"
"#
        .to_string()
    }
}
