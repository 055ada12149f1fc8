// CLI commands for building and inspecting bundles

use crate::rollup::{
    config::PRODUCTION,
    coordinator::{BuildOutcome, Rollup},
    error::RollupError,
    manifest::RollupManifest,
    runner::ProcessRunner,
};
use anyhow::{bail, Context, Result};
use clap::Subcommand;
use serde::Serialize;
use std::path::Path;

/// Bundle management subcommands
#[derive(Subcommand, Debug)]
pub enum RollupCommands {
    /// Run rollup and generate registered bundles whose inputs changed
    Build {
        /// Only build these bundles (default: all)
        names: Vec<String>,
    },

    /// List registered bundles with their status and url (never runs rollup)
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Print the url of a generated bundle (never runs rollup)
    Url {
        /// Bundle name
        name: String,
    },
}

#[derive(Debug, Serialize)]
struct BundleRow {
    name: String,
    status: String,
    url: Option<String>,
}

impl RollupCommands {
    /// Execute the command against the bundles described by `manifest`
    pub fn run(self, manifest: &Path) -> Result<()> {
        let manifest = RollupManifest::from_file(manifest)?;
        match self {
            RollupCommands::Build { names } => {
                ProcessRunner::detect(&manifest.rollup.executable)?;
                let rollup = manifest.into_rollup()?;
                Self::build_cmd(&rollup, names)
            }
            RollupCommands::List { json } => Self::list_cmd(&inspect(manifest)?, json),
            RollupCommands::Url { name } => {
                let url = inspect(manifest)?.jsbundle(&name)?;
                println!("{}", url);
                Ok(())
            }
        }
    }

    /// Build the named bundles, or all of them
    pub fn build_cmd(rollup: &Rollup, names: Vec<String>) -> Result<()> {
        let names = if names.is_empty() {
            rollup.bundle_names().map(str::to_string).collect()
        } else {
            names
        };

        for name in &names {
            if !rollup.contains(name) {
                bail!("Bundle '{}' is not registered", name);
            }
        }

        for name in &names {
            println!("Building bundle {}", name);
            let outcome = rollup
                .run_rollup(name)
                .with_context(|| format!("Failed to build bundle '{}'", name))?;
            if outcome == BuildOutcome::UpToDate {
                println!("  up to date");
            }
        }
        println!("All done");
        Ok(())
    }

    fn list_cmd(rollup: &Rollup, json: bool) -> Result<()> {
        let mut rows = Vec::new();
        for name in rollup.bundle_names() {
            rows.push(BundleRow {
                name: name.to_string(),
                status: rollup.status(name)?.to_string(),
                url: rollup.output(name)?.map(|output| output.url),
            });
        }

        if json {
            println!("{}", serde_json::to_string_pretty(&rows)?);
            return Ok(());
        }

        if rows.is_empty() {
            println!("No bundles registered.");
            return Ok(());
        }

        println!("Registered bundles ({}):", rows.len());
        for row in &rows {
            println!(
                "  {} [{}] {}",
                row.name,
                row.status,
                row.url.as_deref().unwrap_or("-")
            );
        }
        Ok(())
    }
}

/// Coordinator for read-only commands
///
/// Registration in production mode only picks up existing output, so missing
/// bundles are reported as unbuilt instead of being built.
pub fn inspect(mut manifest: RollupManifest) -> Result<Rollup, RollupError> {
    manifest.rollup.environment = PRODUCTION.to_string();
    manifest.into_rollup()
}
