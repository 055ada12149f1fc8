// Rollup process execution

use crate::rollup::error::BuildError;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use which::which;

/// A fully assembled rollup command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Executable followed by its arguments
    pub argv: Vec<String>,

    /// Variables set on top of the inherited environment
    pub env: Vec<(String, String)>,

    /// Discard stdout and stderr of the process
    pub quiet: bool,
}

impl Invocation {
    pub fn program(&self) -> Option<&str> {
        self.argv.first().map(String::as_str)
    }

    pub fn args(&self) -> &[String] {
        self.argv.get(1..).unwrap_or(&[])
    }
}

/// Runs rollup for the coordinator
///
/// The default implementation spawns a process; tests plug in their own.
pub trait CommandRunner: Send + Sync {
    /// Run the command to completion
    ///
    /// # Errors
    ///
    /// Returns `BuildError::Failed` if the command exits unsuccessfully.
    fn run(&self, invocation: &Invocation) -> Result<(), BuildError>;
}

/// Runs rollup as a child process, blocking until it exits
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }

    /// Locate a rollup executable by name or path
    ///
    /// # Errors
    ///
    /// Returns `BuildError::NotFound` if it is not installed or not in PATH.
    pub fn detect(executable: &str) -> Result<PathBuf, BuildError> {
        which(executable).map_err(|_| BuildError::NotFound(executable.to_string()))
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, invocation: &Invocation) -> Result<(), BuildError> {
        let program = invocation.program().ok_or(BuildError::EmptyCommand)?;

        let mut cmd = Command::new(program);
        cmd.args(invocation.args());
        cmd.envs(invocation.env.iter().map(|(k, v)| (k.as_str(), v.as_str())));

        if invocation.quiet {
            cmd.stdout(Stdio::null());
            cmd.stderr(Stdio::null());
        }

        tracing::debug!("Running {}", invocation.argv.join(" "));
        let status = cmd.status().map_err(|source| BuildError::Spawn {
            program: program.to_string(),
            source,
        })?;

        if !status.success() {
            return Err(BuildError::Failed {
                program: program.to_string(),
                status,
            });
        }
        Ok(())
    }
}
