// Error types for bundle registration, building and lookup

use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Unified error type for Rollup integration operations
///
/// This is the primary error type returned by the coordinator and bundles.
/// Individual error types are exposed through `From` conversions.
#[derive(Debug, Error)]
pub enum RollupError {
    #[error("Invalid bundle definition: {0}")]
    Definition(#[from] BundleDefinitionError),

    #[error("Bundling failed: {0}")]
    Build(#[from] BuildError),

    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    #[error("Bundle '{name}' is not registered")]
    UnknownBundle { name: String },

    #[error("Bundle {name} not generated")]
    NotGenerated { name: String },

    #[error("Cannot read '{}': {}", path.display(), source)]
    Input {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while constructing a bundle
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BundleDefinitionError {
    #[error("Simple entrypoint already defined")]
    SimpleEntrypointAlreadyDefined,

    #[error("Bundle name cannot be empty")]
    EmptyName,

    #[error("Bundle '{0}' has no entrypoints")]
    NoEntrypoints(String),
}

/// Errors while running the external bundler
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(
        "rollup executable '{0}' not found. Install it with: npm install --save-dev rollup"
    )]
    NotFound(String),

    #[error("Failed to execute '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{program}' exited with {status}")]
    Failed { program: String, status: ExitStatus },

    #[error("Empty command line")]
    EmptyCommand,
}

/// Errors while loading a Rollup.toml manifest
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Failed to read {path}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse {path}: {error}")]
    Toml { path: PathBuf, error: String },
}
