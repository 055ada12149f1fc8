// Bundle entrypoints

use serde::Deserialize;
use std::path::PathBuf;

/// A JavaScript module rollup starts bundling from
///
/// An empty `name` marks the bundle's simple entrypoint; it is named after the
/// bundle when the bundle is constructed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Entrypoint {
    /// Module path, relative to the static folder until registration
    pub path: PathBuf,

    /// Output chunk name
    #[serde(default)]
    pub name: String,
}

impl Entrypoint {
    /// Create an unnamed entrypoint
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            name: String::new(),
        }
    }

    /// Create a named entrypoint
    pub fn named(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
        }
    }

    pub fn is_unnamed(&self) -> bool {
        self.name.is_empty()
    }

    /// Rollup command line param: `name=path`
    pub fn cmdline_param(&self) -> String {
        format!("{}={}", self.name, self.path.display())
    }
}

/// Entrypoint as written in a bundle definition
///
/// A bare path is shorthand for the unnamed entrypoint. In a manifest this is
/// either a string or a `{ name = "...", path = "..." }` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum EntrypointDef {
    Simple(PathBuf),
    Full(Entrypoint),
}

impl EntrypointDef {
    pub(crate) fn into_entrypoint(self) -> Entrypoint {
        match self {
            EntrypointDef::Simple(path) => Entrypoint::new(path),
            EntrypointDef::Full(ep) => ep,
        }
    }
}

impl From<&str> for EntrypointDef {
    fn from(path: &str) -> Self {
        EntrypointDef::Simple(PathBuf::from(path))
    }
}

impl From<String> for EntrypointDef {
    fn from(path: String) -> Self {
        EntrypointDef::Simple(PathBuf::from(path))
    }
}

impl From<PathBuf> for EntrypointDef {
    fn from(path: PathBuf) -> Self {
        EntrypointDef::Simple(path)
    }
}

impl From<Entrypoint> for EntrypointDef {
    fn from(ep: Entrypoint) -> Self {
        EntrypointDef::Full(ep)
    }
}
