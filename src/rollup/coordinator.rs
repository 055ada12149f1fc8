// Rollup coordinator - bundle registry and conditional builds

use crate::rollup::{
    bundle::{resolve_path, BuildStatus, Bundle, BundleOutput},
    config::RollupConfig,
    error::RollupError,
    runner::{CommandRunner, Invocation, ProcessRunner},
};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Result of a conditional build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    /// Inputs changed (or were never built) and rollup ran
    Rebuilt,
    /// Inputs unchanged, rollup was not run
    UpToDate,
}

/// Rollup integration for an axum application
///
/// Constructed once at startup, configured through `&mut self` (bundle
/// registration, endpoint bindings) and then shared as `Arc<Rollup>` with the
/// router and templates. Each bundle is guarded by its own mutex, so a bundle's
/// check-and-build sequence never interleaves with another build of it.
pub struct Rollup {
    bundles: BTreeMap<String, Mutex<Bundle>>,
    endpoints: HashMap<String, String>,
    argv: Vec<String>,
    environment: String,
    mode_production: bool,
    static_folder: PathBuf,
    static_url_path: String,
    runner: Arc<dyn CommandRunner>,
}

impl Rollup {
    /// Create a coordinator that runs rollup as a child process
    pub fn new(config: RollupConfig) -> Self {
        Self::with_runner(config, Arc::new(ProcessRunner::new()))
    }

    /// Create a coordinator with a custom command runner
    pub fn with_runner(config: RollupConfig, runner: Arc<dyn CommandRunner>) -> Self {
        let mode_production = config.is_production();
        let static_folder = resolve_path(&config.static_folder, Path::new(""));
        tracing::debug!(
            "Rollup configured for '{}' with static folder {}",
            config.environment,
            static_folder.display()
        );

        Self {
            bundles: BTreeMap::new(),
            endpoints: HashMap::new(),
            argv: config.base_argv(),
            environment: config.environment,
            mode_production,
            static_folder,
            static_url_path: config.static_url_path,
            runner,
        }
    }

    pub fn is_production(&self) -> bool {
        self.mode_production
    }

    /// Base rollup command line shared by all bundles
    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    pub fn static_folder(&self) -> &Path {
        &self.static_folder
    }

    pub fn static_url_path(&self) -> &str {
        &self.static_url_path
    }

    /// Registered bundle names, sorted
    pub fn bundle_names(&self) -> impl Iterator<Item = &str> {
        self.bundles.keys().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bundles.contains_key(name)
    }

    /// Register a bundle
    ///
    /// Input paths are resolved against the static folder. If matching output
    /// already exists it is picked up as is; otherwise, outside production, the
    /// bundle is built right away.
    pub fn register(&mut self, mut bundle: Bundle) -> Result<(), RollupError> {
        let name = bundle.name().to_string();
        bundle.resolve_paths(&self.static_folder);
        bundle.resolve_output(&self.static_folder, &self.static_url_path)?;
        let needs_build = !self.mode_production && bundle.output().is_none();

        if self.bundles.insert(name.clone(), Mutex::new(bundle)).is_some() {
            tracing::warn!("Bundle '{}' registered twice, replacing definition", name);
        }

        if needs_build {
            self.run_rollup(&name)?;
        }
        Ok(())
    }

    /// Route requests matched to `route_path` to the endpoint `endpoint`
    ///
    /// The development hook rebuilds the bundle named after the endpoint.
    pub fn bind_endpoint(
        &mut self,
        route_path: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> &mut Self {
        self.endpoints.insert(route_path.into(), endpoint.into());
        self
    }

    /// Endpoint bound to a matched route path, if any
    pub fn endpoint_for(&self, route_path: &str) -> Option<&str> {
        self.endpoints.get(route_path).map(String::as_str)
    }

    /// Run rollup over the bundle if its state changed
    ///
    /// The output paths and url are resolved afterwards whether or not a build
    /// was needed. The new state is stored only after a successful build.
    pub fn run_rollup(&self, name: &str) -> Result<BuildOutcome, RollupError> {
        let mut bundle = self.lock(name)?;

        let new_state = bundle.calc_state()?;
        let outcome = if bundle.state() != Some(new_state.as_str()) {
            let removed = bundle.clean_artifacts()?;
            tracing::debug!("Removed {} stale artifacts of '{}'", removed, name);

            let invocation = self.invocation(&bundle);
            tracing::info!("Building bundle '{}'", name);
            self.runner.run(&invocation)?;
            bundle.set_state(new_state);
            BuildOutcome::Rebuilt
        } else {
            tracing::debug!("Bundle '{}' is up to date", name);
            BuildOutcome::UpToDate
        };

        bundle.resolve_output(&self.static_folder, &self.static_url_path)?;
        Ok(outcome)
    }

    /// Run rollup over every registered bundle, in name order
    pub fn run_all(&self) -> Result<Vec<(String, BuildOutcome)>, RollupError> {
        let mut outcomes = Vec::with_capacity(self.bundles.len());
        for name in self.bundles.keys() {
            outcomes.push((name.clone(), self.run_rollup(name)?));
        }
        Ok(outcomes)
    }

    /// Url of the bundle's generated module
    ///
    /// This backs the `jsbundle` template function.
    ///
    /// # Errors
    ///
    /// Returns `RollupError::NotGenerated` if the bundle was never built.
    pub fn jsbundle(&self, name: &str) -> Result<String, RollupError> {
        self.output(name)?
            .map(|output| output.url)
            .ok_or_else(|| RollupError::NotGenerated {
                name: name.to_string(),
            })
    }

    /// Resolved output of a bundle
    pub fn output(&self, name: &str) -> Result<Option<BundleOutput>, RollupError> {
        Ok(self.lock(name)?.output().cloned())
    }

    /// Build status of a bundle
    pub fn status(&self, name: &str) -> Result<BuildStatus, RollupError> {
        self.lock(name)?.status()
    }

    fn invocation(&self, bundle: &Bundle) -> Invocation {
        let mut argv = self.argv.clone();
        argv.extend(bundle.argv());
        Invocation {
            argv,
            env: vec![("NODE_ENV".to_string(), self.environment.clone())],
            quiet: !self.mode_production,
        }
    }

    fn lock(&self, name: &str) -> Result<parking_lot::MutexGuard<'_, Bundle>, RollupError> {
        self.bundles
            .get(name)
            .map(|bundle| bundle.lock())
            .ok_or_else(|| RollupError::UnknownBundle {
                name: name.to_string(),
            })
    }
}

impl std::fmt::Debug for Rollup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rollup")
            .field("bundles", &self.bundles.keys().collect::<Vec<_>>())
            .field("argv", &self.argv)
            .field("environment", &self.environment)
            .field("static_folder", &self.static_folder)
            .field("static_url_path", &self.static_url_path)
            .finish()
    }
}
