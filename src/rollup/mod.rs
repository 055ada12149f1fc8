// Rollup bundler integration
//
// Bundles group JavaScript entrypoints built by an external rollup process into
// hashed modules under the static folder. The coordinator tracks input state,
// rebuilds on change in development and resolves bundle urls for templates.

pub mod bundle;
pub mod cli;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod hook;
pub mod manifest;
pub mod runner;
pub mod template;

pub use bundle::{BuildStatus, Bundle, BundleOutput, Entrypoint, EntrypointDef};
pub use config::RollupConfig;
pub use coordinator::{BuildOutcome, Rollup};
pub use error::{BuildError, BundleDefinitionError, ManifestError, RollupError};
pub use manifest::RollupManifest;
pub use runner::{CommandRunner, Invocation, ProcessRunner};
pub use template::{JsBundle, TEMPLATE_GLOBAL_NAME};
