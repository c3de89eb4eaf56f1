use anyhow::{Context, Result};
use chrono::Local;
use console::style;
use std::path::{Path, PathBuf};

use crate::cli::RunOptions;
use crate::config::{resolve_config, Config};
use crate::processors::{
    find_files, process_asset, update_references, BackupStore, RenameMap, RenameOutcome, RunLog,
    ScanFilter,
};

/// Counts reported at the end of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub assets_scanned: usize,
    pub renamed: usize,
    /// Renames that deleted a file already at the target name
    pub overwritten: usize,
    pub unchanged: usize,
    pub markup_scanned: usize,
    pub markup_updated: usize,
}

pub fn run(root: PathBuf, options: RunOptions) -> Result<()> {
    if !root.exists() {
        anyhow::bail!("Root directory does not exist: {}", root.display());
    }

    if !root.is_dir() {
        anyhow::bail!("Root path is not a directory: {}", root.display());
    }

    let mut config = resolve_config(&root, options.config.as_deref())?;
    if options.include_backup_dir {
        config.scan.include_backup_dir = true;
    }

    let mut log = RunLog::new(Local::now());

    println!(
        "{} Fingerprinting assets in: {}",
        style("→").blue().bold(),
        root.display()
    );
    println!(
        "  Started: {}",
        style(log.started_at().format("%Y-%m-%d %H:%M:%S")).dim()
    );
    if options.dry_run {
        println!("  {}", style("(Dry run - no files will be changed)").yellow());
    }
    println!();

    let summary = execute(&root, &config, &mut log, options.dry_run)?;

    println!();
    print_summary(&summary);

    if options.dry_run {
        println!("{} Dry run complete, nothing was changed", style("✓").green().bold());
        return Ok(());
    }

    let log_path = log_path(&root, &config);
    log.flush(&log_path)?;
    println!(
        "{} Process complete. Log saved to {}",
        style("✓").green().bold(),
        style(log_path.display()).cyan()
    );

    Ok(())
}

/// Run the rename pass and then the reference pass over `root`.
///
/// Actions are recorded in `log`; flushing it is up to the caller. Any I/O
/// failure aborts the run, leaving already-performed renames in place.
pub fn execute(
    root: &Path,
    config: &Config,
    log: &mut RunLog,
    dry_run: bool,
) -> Result<RunSummary> {
    let backups = BackupStore::new(root.join(&config.backup.directory));
    if !dry_run {
        std::fs::create_dir_all(backups.dir()).with_context(|| {
            format!("Failed to create backup directory: {}", backups.dir().display())
        })?;
    }

    let filter = ScanFilter {
        skip_dir: (!config.scan.include_backup_dir).then(|| backups.dir().to_path_buf()),
        exclude: config.exclude_set()?,
    };

    let mut summary = RunSummary::default();

    tracing::info!("Scanning assets under {}", root.display());
    // Collected before renaming so the walk never sees the new names
    let assets: Vec<PathBuf> =
        find_files(root, &config.scan.asset_extensions, &filter).collect::<Result<_>>()?;
    summary.assets_scanned = assets.len();

    let mut renames = RenameMap::new();
    for path in &assets {
        let outcome = process_asset(path, &backups, log, dry_run)?;
        match outcome {
            RenameOutcome::Unchanged { .. } => summary.unchanged += 1,
            RenameOutcome::Renamed {
                replaced_existing, ..
            } => {
                summary.renamed += 1;
                if replaced_existing {
                    summary.overwritten += 1;
                }
            }
        }
        renames.insert(outcome.old_name(), outcome.new_name());
    }

    tracing::info!(
        "Updating references to {} renamed assets",
        renames.changed().count()
    );
    for path in find_files(root, &config.scan.markup_extensions, &filter) {
        let path = path?;
        summary.markup_scanned += 1;
        if update_references(&path, &renames, &backups, log, dry_run)? {
            summary.markup_updated += 1;
        }
    }

    tracing::debug!("{} actions recorded", log.entries().len());
    Ok(summary)
}

/// Location of the persistent run log
pub fn log_path(root: &Path, config: &Config) -> PathBuf {
    root.join(&config.backup.directory).join(&config.backup.log_file)
}

fn print_summary(summary: &RunSummary) {
    println!("  Assets scanned: {}", style(summary.assets_scanned).cyan());
    println!("  Files renamed: {}", style(summary.renamed).green());
    if summary.overwritten > 0 {
        println!(
            "  Replaced existing files: {}",
            style(summary.overwritten).yellow()
        );
    }
    if summary.unchanged > 0 {
        println!("  Unchanged: {}", style(summary.unchanged).dim());
    }
    println!(
        "  Markup updated: {} of {}",
        style(summary.markup_updated).green(),
        summary.markup_scanned
    );
}
