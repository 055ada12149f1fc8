use anyhow::Result;
use axum_rollup::rollup::{cli::RollupCommands, manifest::MANIFEST_FILE};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Build and inspect Rollup bundles of an axum application
#[derive(Parser, Debug)]
#[command(name = "axum-rollup", version, about)]
struct Cli {
    /// Path to the bundle manifest
    #[arg(short, long, default_value = MANIFEST_FILE)]
    manifest: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: RollupCommands,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "axum_rollup=debug"
    } else {
        "axum_rollup=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .init();

    cli.command.run(&cli.manifest)
}
