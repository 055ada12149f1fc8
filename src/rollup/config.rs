// Configuration types for the Rollup coordinator

use serde::Deserialize;
use std::path::PathBuf;

/// Environment variable selecting production or development mode
pub const ENV_VAR: &str = "APP_ENV";

/// Environment name that enables production mode
pub const PRODUCTION: &str = "production";

/// Coordinator configuration
///
/// Can be built in code or read from the `[rollup]` table of a `Rollup.toml`
/// manifest. Missing fields fall back to [`RollupConfig::default`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RollupConfig {
    /// Path to the rollup executable
    pub executable: String,

    /// Rollup configuration module passed with `-c`
    ///
    /// When unset, `-c` is passed alone and rollup looks up its default config.
    pub config_js: Option<PathBuf>,

    /// Static assets root; bundle paths are relative to it
    pub static_folder: PathBuf,

    /// URL prefix under which the static folder is served
    pub static_url_path: String,

    /// Environment name, also exported to rollup as `NODE_ENV`
    pub environment: String,
}

impl Default for RollupConfig {
    fn default() -> Self {
        Self {
            executable: "rollup".to_string(),
            config_js: None,
            static_folder: PathBuf::from("static"),
            static_url_path: "/static".to_string(),
            environment: environment_from_env(),
        }
    }
}

impl RollupConfig {
    /// Default configuration with the environment taken from `APP_ENV`
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Whether the configured environment is production
    pub fn is_production(&self) -> bool {
        self.environment == PRODUCTION
    }

    /// Base rollup command line: executable and config flag
    pub fn base_argv(&self) -> Vec<String> {
        let mut argv = vec![self.executable.clone(), "-c".to_string()];
        if let Some(config_js) = &self.config_js {
            argv.push(config_js.display().to_string());
        }
        argv
    }
}

fn environment_from_env() -> String {
    std::env::var(ENV_VAR).unwrap_or_else(|_| PRODUCTION.to_string())
}
