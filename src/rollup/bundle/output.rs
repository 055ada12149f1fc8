// Build output and status of a bundle

use serde::Serialize;
use std::path::{Component, Path, PathBuf};

/// Resolved rollup output of a bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BundleOutput {
    /// Absolute path of the generated module
    pub file_path: PathBuf,

    /// Path relative to the static folder, `/`-separated
    pub static_path: String,

    /// Public URL of the generated module
    pub url: String,
}

impl BundleOutput {
    /// Build the output triple for `file_path` generated under static `root`
    pub fn new(file_path: PathBuf, root: &Path, url_path: &str) -> Self {
        let static_path = static_path(&file_path, root);
        let url = join_url(url_path, &static_path);
        Self {
            file_path,
            static_path,
            url,
        }
    }
}

/// Build status of a bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildStatus {
    /// No output has been resolved yet
    Unbuilt,
    /// Output exists and inputs have not changed since it was built
    Built,
    /// Output exists but inputs changed (or were never fingerprinted)
    Stale,
}

impl std::fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BuildStatus::Unbuilt => "unbuilt",
            BuildStatus::Built => "built",
            BuildStatus::Stale => "stale",
        };
        f.write_str(s)
    }
}

/// Path of `file_path` relative to `root`
///
/// Output generated outside the static folder keeps its absolute path.
fn static_path(file_path: &Path, root: &Path) -> String {
    let Ok(relative) = file_path.strip_prefix(root) else {
        return file_path.to_string_lossy().into_owned();
    };
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn join_url(url_path: &str, static_path: &str) -> String {
    if url_path.is_empty() || Path::new(static_path).is_absolute() {
        return static_path.to_string();
    }
    format!("{}/{}", url_path.trim_end_matches('/'), static_path)
}
