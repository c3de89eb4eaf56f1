use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "cache-bust",
    version,
    about = "Fingerprint static assets and rewrite references to them",
    long_about = "cache-bust - content-hash cache busting for static web assets.\n\n\
                  Renames every script and stylesheet under ROOT to embed a short content\n\
                  fingerprint (app.js -> app_1a2b3c4d.js), then rewrites references in markup\n\
                  files. Originals are backed up and every action is logged.",
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Root directory to process
    #[arg(default_value = ".")]
    pub root: PathBuf,

    #[command(flatten)]
    pub options: RunOptions,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress diagnostics except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default cache-bust.toml configuration file
    Init {
        /// Directory to write the configuration into
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Args, Clone, Debug, Default)]
pub struct RunOptions {
    /// Configuration file path (default: cache-bust.toml in ROOT)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Show what would be renamed and rewritten without touching any file
    #[arg(long)]
    pub dry_run: bool,

    /// Also scan the backup directory
    #[arg(long)]
    pub include_backup_dir: bool,
}
