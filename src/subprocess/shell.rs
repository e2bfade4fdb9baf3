//! Subshell invocation with dual-mode output classification.
//!
//! A command string is handed to `sh -c` verbatim. On success, stdout is
//! interpreted as JSON when it parses as such; otherwise the text is
//! carried through untouched. The two shapes are distinct enum arms, so
//! callers pick one explicitly instead of probing field presence.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::builder::ProcessCommandBuilder;
use super::error::ProcessError;
use super::runner::ProcessRunner;

/// Outcome of a successful subshell invocation. A non-zero exit never
/// produces one of these; it surfaces as [`ProcessError::CommandFailed`].
#[derive(Debug, Clone, PartialEq)]
pub enum ShellResult {
    /// Stdout parsed as JSON.
    Structured(serde_json::Value),
    /// Stdout as captured, when it is not valid JSON.
    Raw { stdout: String },
}

impl ShellResult {
    pub fn raw_output(&self) -> Option<&str> {
        match self {
            ShellResult::Raw { stdout } => Some(stdout),
            ShellResult::Structured(_) => None,
        }
    }

    pub fn as_structured(&self) -> Option<&serde_json::Value> {
        match self {
            ShellResult::Structured(value) => Some(value),
            ShellResult::Raw { .. } => None,
        }
    }
}

fn classify_stdout(stdout: String) -> ShellResult {
    match serde_json::from_str(&stdout) {
        Ok(value) => ShellResult::Structured(value),
        Err(_) => ShellResult::Raw { stdout },
    }
}

pub struct ShellRunner {
    runner: Arc<dyn ProcessRunner>,
    working_dir: Option<PathBuf>,
}

impl ShellRunner {
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        Self {
            runner,
            working_dir: None,
        }
    }

    pub fn with_working_dir(mut self, dir: &Path) -> Self {
        self.working_dir = Some(dir.to_path_buf());
        self
    }

    pub async fn run(&self, command: &str) -> Result<ShellResult, ProcessError> {
        let mut builder = ProcessCommandBuilder::new("sh").arg("-c").arg(command);
        if let Some(dir) = &self.working_dir {
            builder = builder.current_dir(dir);
        }

        let output = self.runner.run(builder.build()).await?;
        let output = output.require_success(command)?;
        Ok(classify_stdout(output.stdout))
    }
}
