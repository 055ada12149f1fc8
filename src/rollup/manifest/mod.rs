// Rollup.toml manifest parsing

use crate::rollup::{
    bundle::{Bundle, EntrypointDef},
    config::RollupConfig,
    coordinator::Rollup,
    error::{ManifestError, RollupError},
};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default manifest file name
pub const MANIFEST_FILE: &str = "Rollup.toml";

/// Parsed Rollup.toml manifest
#[derive(Debug, Deserialize, Default)]
pub struct RollupManifest {
    #[serde(default)]
    pub rollup: RollupConfig,
    #[serde(default)]
    pub bundles: Vec<BundleManifest>,
    /// Route path to endpoint name bindings for the development hook
    #[serde(default)]
    pub endpoints: Vec<EndpointManifest>,
}

/// A `[[bundles]]` entry
#[derive(Debug, Deserialize, Clone)]
pub struct BundleManifest {
    pub name: String,
    pub target_dir: PathBuf,
    pub entrypoints: Vec<EntrypointDef>,
    #[serde(default)]
    pub dependencies: Vec<PathBuf>,
}

/// An `[[endpoints]]` entry
#[derive(Debug, Deserialize, Clone)]
pub struct EndpointManifest {
    pub path: String,
    pub endpoint: String,
}

impl BundleManifest {
    /// Build the bundle definition
    pub fn to_bundle(&self) -> Result<Bundle, RollupError> {
        let bundle = Bundle::new(&self.name, &self.target_dir, self.entrypoints.clone())?
            .with_dependencies(self.dependencies.iter().cloned());
        Ok(bundle)
    }
}

impl RollupManifest {
    /// Parse a manifest file
    ///
    /// A relative `static_folder` is resolved against the manifest's directory.
    pub fn from_file(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path).map_err(|e| ManifestError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let mut manifest: RollupManifest =
            toml::from_str(&content).map_err(|e| ManifestError::Toml {
                path: path.to_path_buf(),
                error: e.to_string(),
            })?;

        if manifest.rollup.static_folder.is_relative() {
            if let Some(base) = path.parent() {
                manifest.rollup.static_folder = base.join(&manifest.rollup.static_folder);
            }
        }
        Ok(manifest)
    }

    /// Parse a manifest from a string
    pub fn from_str(content: &str) -> Result<Self, ManifestError> {
        toml::from_str(content).map_err(|e| ManifestError::Toml {
            path: "<string>".into(),
            error: e.to_string(),
        })
    }

    /// Validate every bundle definition without registering anything
    pub fn bundles(&self) -> Result<Vec<Bundle>, RollupError> {
        self.bundles.iter().map(BundleManifest::to_bundle).collect()
    }

    /// Build a coordinator with all bundles registered and endpoints bound
    pub fn into_rollup(self) -> Result<Rollup, RollupError> {
        self.into_rollup_with(Rollup::new)
    }

    /// Like [`RollupManifest::into_rollup`], with a custom coordinator factory
    pub fn into_rollup_with<F>(self, make: F) -> Result<Rollup, RollupError>
    where
        F: FnOnce(RollupConfig) -> Rollup,
    {
        let bundles = self.bundles()?;
        let mut rollup = make(self.rollup);
        for endpoint in self.endpoints {
            rollup.bind_endpoint(endpoint.path, endpoint.endpoint);
        }
        for bundle in bundles {
            rollup.register(bundle)?;
        }
        Ok(rollup)
    }
}
