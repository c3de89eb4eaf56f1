use anyhow::{Context, Result};
use console::style;
use std::path::Path;

use crate::config::{Config, CONFIG_FILE_NAMES};

pub fn run(dir: &Path, force: bool) -> Result<()> {
    if !dir.is_dir() {
        anyhow::bail!("Directory does not exist: {}", dir.display());
    }

    let config_path = dir.join(CONFIG_FILE_NAMES[0]);

    if config_path.exists() && !force {
        println!(
            "{} Configuration file already exists: {}",
            style("!").yellow().bold(),
            config_path.display()
        );
        println!("  Use {} to overwrite.", style("--force").cyan());
        return Ok(());
    }

    std::fs::write(&config_path, Config::default_toml())
        .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

    println!(
        "{} Created configuration file: {}",
        style("✓").green().bold(),
        style(config_path.display()).cyan()
    );

    println!();
    println!("Next steps:");
    println!(
        "  1. Edit {} to choose which files are fingerprinted",
        style(CONFIG_FILE_NAMES[0]).cyan()
    );
    println!(
        "  2. Run {} to preview the renames",
        style(format!("cache-bust {} --dry-run", dir.display())).cyan()
    );

    Ok(())
}
