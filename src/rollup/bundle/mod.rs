// Bundle management - definitions, fingerprints and rollup output

pub mod definition;
pub mod entrypoint;
pub mod output;

pub use definition::Bundle;
pub use entrypoint::{Entrypoint, EntrypointDef};
pub use output::{BuildStatus, BundleOutput};

use std::path::{Component, Path, PathBuf};

/// Join `path` onto `root` and normalise the result
///
/// A relative root is taken from the current directory. Normalisation is
/// lexical: `.` components are dropped and `..` removes the previous one.
pub fn resolve_path(root: &Path, path: &Path) -> PathBuf {
    let joined = root.join(path);
    let absolute = if joined.is_absolute() {
        joined
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(&joined))
            .unwrap_or(joined)
    };
    normalize(&absolute)
}

fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() && !normalized.has_root() {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}
