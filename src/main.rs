mod cli;
mod commands;
mod config;
mod processors;
mod utils;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        "cache_bust=debug"
    } else if cli.quiet {
        "cache_bust=error"
    } else {
        "cache_bust=info"
    };

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_level.to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    match cli.command {
        Some(Commands::Init { dir, force }) => commands::init::run(&dir, force),
        None => commands::run::run(cli.root, cli.options),
    }
}
