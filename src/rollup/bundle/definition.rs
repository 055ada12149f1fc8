// Bundle definition, state fingerprint and artifact handling

use super::entrypoint::{Entrypoint, EntrypointDef};
use super::output::{BuildStatus, BundleOutput};
use super::resolve_path;
use crate::rollup::error::{BundleDefinitionError, RollupError};
use glob::Pattern;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

/// JavaScript bundle definition
///
/// Bundles should be named after the endpoints that use them, eg. the module for
/// page `auth.login` goes into bundle `auth.login`. Rollup then writes
/// `target_dir/auth.login.[hash].js` and its source map
/// `target_dir/auth.login.[hash].js.map`.
///
/// Files imported by the entrypoints (other than installed packages) should be
/// listed as dependencies. They take part in the state fingerprint, so a change
/// to an unlisted one does not trigger a rebuild.
#[derive(Debug, Clone)]
pub struct Bundle {
    name: String,
    target_dir: PathBuf,
    entrypoints: Vec<Entrypoint>,
    dependencies: Vec<PathBuf>,
    state: Option<String>,
    output: Option<BundleOutput>,
}

impl Bundle {
    /// Create a bundle definition
    ///
    /// # Errors
    ///
    /// Returns `BundleDefinitionError::SimpleEntrypointAlreadyDefined` if more than
    /// one entrypoint is unnamed.
    pub fn new<I, E>(
        name: impl Into<String>,
        target_dir: impl Into<PathBuf>,
        entrypoints: I,
    ) -> Result<Self, BundleDefinitionError>
    where
        I: IntoIterator<Item = E>,
        E: Into<EntrypointDef>,
    {
        let name = name.into();
        if name.is_empty() {
            return Err(BundleDefinitionError::EmptyName);
        }

        let mut resolved = Vec::new();
        let mut has_simple = false;
        for def in entrypoints {
            let mut ep = def.into().into_entrypoint();
            if ep.is_unnamed() {
                if has_simple {
                    return Err(BundleDefinitionError::SimpleEntrypointAlreadyDefined);
                }
                has_simple = true;
                ep.name = name.clone();
            }
            resolved.push(ep);
        }
        if resolved.is_empty() {
            return Err(BundleDefinitionError::NoEntrypoints(name));
        }

        Ok(Self {
            name,
            target_dir: target_dir.into(),
            entrypoints: resolved,
            dependencies: Vec::new(),
            state: None,
            output: None,
        })
    }

    /// Attach dependency paths that take part in the state fingerprint
    pub fn with_dependencies<I, P>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.dependencies = dependencies.into_iter().map(Into::into).collect();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target_dir(&self) -> &Path {
        &self.target_dir
    }

    pub fn entrypoints(&self) -> &[Entrypoint] {
        &self.entrypoints
    }

    pub fn dependencies(&self) -> &[PathBuf] {
        &self.dependencies
    }

    /// Fingerprint recorded after the last build
    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    pub(crate) fn set_state(&mut self, state: String) {
        self.state = Some(state);
    }

    pub fn output(&self) -> Option<&BundleOutput> {
        self.output.as_ref()
    }

    /// Make entrypoint, dependency and target paths absolute under `root`
    pub fn resolve_paths(&mut self, root: &Path) {
        for ep in &mut self.entrypoints {
            ep.path = resolve_path(root, &ep.path);
        }
        self.target_dir = resolve_path(root, &self.target_dir);
        for dep in &mut self.dependencies {
            *dep = resolve_path(root, dep);
        }
    }

    /// Calculate the bundle state checksum
    ///
    /// The modification time (ns) of every entrypoint, then every dependency, is
    /// joined with newlines and hashed with SHA-256.
    ///
    /// # Errors
    ///
    /// Returns `RollupError::Input` if any input file can't be stat'ed.
    pub fn calc_state(&self) -> Result<String, RollupError> {
        let inputs = self
            .entrypoints
            .iter()
            .map(|ep| ep.path.as_path())
            .chain(self.dependencies.iter().map(PathBuf::as_path));

        let mut mtimes = Vec::new();
        for path in inputs {
            mtimes.push(mtime_ns(path)?.to_string());
        }

        let mut hasher = Sha256::new();
        hasher.update(mtimes.join("\n").as_bytes());
        Ok(hex::encode(hasher.finalize()))
    }

    /// Rollup command line params required to build this bundle
    pub fn argv(&self) -> Vec<String> {
        let mut argv = vec!["-d".to_string(), self.target_dir.display().to_string()];
        argv.extend(self.entrypoints.iter().map(Entrypoint::cmdline_param));
        argv
    }

    /// Delete generated modules and source maps of this bundle
    ///
    /// The resolved output points at a deleted file afterwards, so it is
    /// cleared. Returns the number of removed files.
    pub fn clean_artifacts(&mut self) -> Result<usize, RollupError> {
        let artifacts = self.find(".*.js*")?;
        self.output = None;
        for path in &artifacts {
            std::fs::remove_file(path)?;
        }
        Ok(artifacts.len())
    }

    /// Resolve output paths and url of the generated module
    ///
    /// Output is set only when exactly one `name.*.js` file exists in the target
    /// directory; otherwise it is left as it was.
    pub fn resolve_output(&mut self, root: &Path, url_path: &str) -> Result<(), RollupError> {
        let mut files = self.find(".*.js")?;
        match files.len() {
            1 => {
                let output = BundleOutput::new(files.remove(0), root, url_path);
                tracing::debug!("Bundle '{}' resolved to {}", self.name, output.url);
                self.output = Some(output);
            }
            0 => {}
            n => tracing::warn!(
                "Bundle '{}' has {} candidate outputs in {}, not resolving",
                self.name,
                n,
                self.target_dir.display()
            ),
        }
        Ok(())
    }

    /// Current build status; fingerprints the inputs when output exists
    pub fn status(&self) -> Result<BuildStatus, RollupError> {
        if self.output.is_none() {
            return Ok(BuildStatus::Unbuilt);
        }
        let current = self.calc_state()?;
        if self.state.as_deref() == Some(current.as_str()) {
            Ok(BuildStatus::Built)
        } else {
            Ok(BuildStatus::Stale)
        }
    }

    /// Files in the target directory named `<name><suffix>`
    fn find(&self, suffix: &str) -> Result<Vec<PathBuf>, RollupError> {
        let pattern = format!(
            "{}/{}{}",
            Pattern::escape(&self.target_dir.to_string_lossy()),
            Pattern::escape(&self.name),
            suffix
        );
        let paths = glob::glob(&pattern).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
        })?;

        let mut files = Vec::new();
        for entry in paths {
            let path = entry.map_err(std::io::Error::from)?;
            if path.is_file() {
                files.push(path);
            }
        }
        Ok(files)
    }
}

/// Modification time in nanoseconds relative to the Unix epoch
fn mtime_ns(path: &Path) -> Result<i128, RollupError> {
    let modified = std::fs::metadata(path)
        .and_then(|meta| meta.modified())
        .map_err(|source| RollupError::Input {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(match modified.duration_since(UNIX_EPOCH) {
        Ok(after) => after.as_nanos() as i128,
        Err(before) => -(before.duration().as_nanos() as i128),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::{Duration, SystemTime};

    fn set_mtime(path: &Path, time: SystemTime) {
        File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(time)
            .unwrap();
    }

    fn sha256_hex(input: &str) -> String {
        hex::encode(Sha256::digest(input.as_bytes()))
    }

    #[test]
    fn create_params() {
        let bundle = Bundle::new("name 1", "some/where", ["some/input/file.js"]).unwrap();
        assert_eq!(bundle.entrypoints()[0].name, "name 1");
        assert!(bundle.state().is_none());
        assert!(bundle.output().is_none());
    }

    #[test]
    fn multiple_entrypoints_mixed() {
        let bundle = Bundle::new(
            "name 1",
            "some/where",
            [
                EntrypointDef::from("some/input/file1.js"),
                Entrypoint::named("p2", "some/input/file2.js").into(),
            ],
        )
        .unwrap();
        assert_eq!(bundle.entrypoints().len(), 2);
        assert_eq!(bundle.entrypoints()[1].name, "p2");
    }

    #[test]
    fn multiple_entrypoints_named() {
        let bundle = Bundle::new(
            "name 1",
            "some/where",
            [
                Entrypoint::named("p1", "some/input/file1.js"),
                Entrypoint::named("p2", "some/input/file2.js"),
            ],
        )
        .unwrap();
        assert_eq!(bundle.entrypoints().len(), 2);
    }

    #[test]
    fn simple_entrypoints_limited() {
        let cases: Vec<Vec<EntrypointDef>> = vec![
            vec!["a.js".into(), "b.js".into()],
            vec![Entrypoint::new("a.js").into(), Entrypoint::new("b.js").into()],
            vec!["a.js".into(), Entrypoint::new("b.js").into()],
            vec![Entrypoint::new("a.js").into(), "b.js".into()],
        ];
        for entrypoints in cases {
            let err = Bundle::new("name 1", "some/where", entrypoints).unwrap_err();
            assert_eq!(err, BundleDefinitionError::SimpleEntrypointAlreadyDefined);
        }
    }

    #[test]
    fn empty_definitions_rejected() {
        assert_eq!(
            Bundle::new("", "out", ["a.js"]).unwrap_err(),
            BundleDefinitionError::EmptyName
        );
        assert!(matches!(
            Bundle::new("p1", "out", Vec::<EntrypointDef>::new()).unwrap_err(),
            BundleDefinitionError::NoEntrypoints(_)
        ));
    }

    #[test]
    fn resolve_paths_with_dependencies() {
        let mut bundle = Bundle::new("p1", "some/where", ["some/input/file1.js"])
            .unwrap()
            .with_dependencies(["some/input/file2.js", "some/../input/file3.js"]);
        bundle.resolve_paths(Path::new("/static/directory"));

        assert_eq!(bundle.target_dir(), Path::new("/static/directory/some/where"));
        assert_eq!(
            bundle.entrypoints()[0].path,
            PathBuf::from("/static/directory/some/input/file1.js")
        );
        assert_eq!(
            bundle.dependencies()[1],
            PathBuf::from("/static/directory/input/file3.js")
        );
        assert!(bundle.dependencies().iter().all(|p| p.is_absolute()));
    }

    #[test]
    fn argv_shape() {
        let mut bundle = Bundle::new(
            "p1",
            "some/where",
            [
                EntrypointDef::from("some/input/file1.js"),
                Entrypoint::named("extra", "some/input/file2.js").into(),
            ],
        )
        .unwrap()
        .with_dependencies(["some/input/file3.js"]);
        bundle.resolve_paths(Path::new("/static/directory"));

        let argv = bundle.argv();
        assert_eq!(argv.len(), 2 + bundle.entrypoints().len());
        assert_eq!(argv[0], "-d");
        assert_eq!(argv[1], "/static/directory/some/where");
        assert_eq!(argv[2], "p1=/static/directory/some/input/file1.js");
        assert_eq!(argv[3], "extra=/static/directory/some/input/file2.js");
    }

    #[test]
    fn calc_state_of_single_input() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.js"), "export default 1;").unwrap();
        set_mtime(&dir.path().join("a.js"), UNIX_EPOCH + Duration::from_nanos(100));

        let mut bundle = Bundle::new("p1", "out", ["a.js"]).unwrap();
        bundle.resolve_paths(dir.path());

        assert_eq!(bundle.calc_state().unwrap(), sha256_hex("100"));
    }

    #[test]
    fn calc_state_covers_dependencies_in_order() {
        let dir = tempfile::tempdir().unwrap();
        for (file, ns) in [("a.js", 100), ("b.js", 200), ("c.js", 300)] {
            let path = dir.path().join(file);
            std::fs::write(&path, "").unwrap();
            set_mtime(&path, UNIX_EPOCH + Duration::from_nanos(ns));
        }

        let mut bundle = Bundle::new("p1", "out", ["a.js"])
            .unwrap()
            .with_dependencies(["b.js", "c.js"]);
        bundle.resolve_paths(dir.path());
        assert_eq!(bundle.calc_state().unwrap(), sha256_hex("100\n200\n300"));

        let mut reordered = Bundle::new("p1", "out", ["a.js"])
            .unwrap()
            .with_dependencies(["c.js", "b.js"]);
        reordered.resolve_paths(dir.path());
        assert_ne!(reordered.calc_state().unwrap(), bundle.calc_state().unwrap());
    }

    #[test]
    fn calc_state_changes_with_mtime() {
        let dir = tempfile::tempdir().unwrap();
        let dep = dir.path().join("dep.js");
        std::fs::write(dir.path().join("a.js"), "").unwrap();
        std::fs::write(&dep, "").unwrap();

        let mut bundle = Bundle::new("p1", "out", ["a.js"])
            .unwrap()
            .with_dependencies(["dep.js"]);
        bundle.resolve_paths(dir.path());

        let first = bundle.calc_state().unwrap();
        assert_eq!(bundle.calc_state().unwrap(), first);

        set_mtime(&dep, SystemTime::now() + Duration::from_secs(10));
        assert_ne!(bundle.calc_state().unwrap(), first);
    }

    #[test]
    fn calc_state_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let mut bundle = Bundle::new("p1", "out", ["missing.js"]).unwrap();
        bundle.resolve_paths(dir.path());

        let err = bundle.calc_state().unwrap_err();
        assert!(matches!(err, RollupError::Input { ref path, .. } if path.ends_with("missing.js")));
    }

    #[test]
    fn resolve_output_single_match() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("some/where");
        std::fs::create_dir_all(&out).unwrap();
        std::fs::write(out.join("p1.abc123.js"), "").unwrap();
        std::fs::write(out.join("p1.abc123.js.map"), "").unwrap();
        std::fs::write(out.join("p2.def456.js"), "").unwrap();

        let mut bundle = Bundle::new("p1", "some/where", ["a.js"]).unwrap();
        bundle.resolve_paths(dir.path());
        bundle.resolve_output(dir.path(), "/static").unwrap();

        let output = bundle.output().unwrap();
        assert_eq!(output.file_path, out.join("p1.abc123.js"));
        assert_eq!(output.static_path, "some/where/p1.abc123.js");
        assert_eq!(output.url, "/static/some/where/p1.abc123.js");
    }

    #[test]
    fn resolve_output_ambiguous_or_missing() {
        let dir = tempfile::tempdir().unwrap();
        let mut bundle = Bundle::new("p1", "out", ["a.js"]).unwrap();
        bundle.resolve_paths(dir.path());

        bundle.resolve_output(dir.path(), "/static").unwrap();
        assert!(bundle.output().is_none());

        std::fs::create_dir_all(dir.path().join("out")).unwrap();
        std::fs::write(dir.path().join("out/p1.aaa.js"), "").unwrap();
        std::fs::write(dir.path().join("out/p1.bbb.js"), "").unwrap();
        bundle.resolve_output(dir.path(), "/static").unwrap();
        assert!(bundle.output().is_none());
    }

    #[test]
    fn clean_artifacts_removes_only_own_files() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        std::fs::create_dir_all(&out).unwrap();
        for file in ["p1.aaa.js", "p1.aaa.js.map", "p1x.bbb.js", "p2.ccc.js", "p1.js"] {
            std::fs::write(out.join(file), "").unwrap();
        }

        let mut bundle = Bundle::new("p1", "out", ["a.js"]).unwrap();
        bundle.resolve_paths(dir.path());

        assert_eq!(bundle.clean_artifacts().unwrap(), 2);
        assert!(!out.join("p1.aaa.js").exists());
        assert!(!out.join("p1.aaa.js.map").exists());
        assert!(out.join("p1x.bbb.js").exists());
        assert!(out.join("p2.ccc.js").exists());
        assert!(out.join("p1.js").exists());
    }

    #[test]
    fn clean_artifacts_clears_output() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("out")).unwrap();
        std::fs::write(dir.path().join("out/p1.aaa.js"), "").unwrap();

        let mut bundle = Bundle::new("p1", "out", ["a.js"]).unwrap();
        bundle.resolve_paths(dir.path());
        bundle.resolve_output(dir.path(), "/static").unwrap();
        assert!(bundle.output().is_some());

        bundle.clean_artifacts().unwrap();
        assert!(bundle.output().is_none());
        assert_eq!(bundle.status().unwrap(), BuildStatus::Unbuilt);
    }

    #[test]
    fn names_with_glob_characters_are_literal() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        std::fs::create_dir_all(&out).unwrap();
        std::fs::write(out.join("page[1].aaa.js"), "").unwrap();
        std::fs::write(out.join("page1.bbb.js"), "").unwrap();

        let mut bundle = Bundle::new("page[1]", "out", ["a.js"]).unwrap();
        bundle.resolve_paths(dir.path());
        bundle.resolve_output(dir.path(), "/static").unwrap();

        assert_eq!(bundle.output().unwrap().static_path, "out/page[1].aaa.js");
    }

    #[test]
    fn status_follows_state() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.js"), "").unwrap();
        std::fs::create_dir_all(dir.path().join("out")).unwrap();

        let mut bundle = Bundle::new("p1", "out", ["a.js"]).unwrap();
        bundle.resolve_paths(dir.path());
        assert_eq!(bundle.status().unwrap(), BuildStatus::Unbuilt);

        std::fs::write(dir.path().join("out/p1.aaa.js"), "").unwrap();
        bundle.resolve_output(dir.path(), "/static").unwrap();
        assert_eq!(bundle.status().unwrap(), BuildStatus::Stale);

        bundle.set_state(bundle.calc_state().unwrap());
        assert_eq!(bundle.status().unwrap(), BuildStatus::Built);
    }
}
