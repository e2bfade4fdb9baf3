pub mod builder;
pub mod error;
pub mod mock;
pub mod runner;
pub mod shell;


pub use builder::ProcessCommandBuilder;
pub use error::ProcessError;
pub use mock::{MockCommandConfig, MockProcessRunner};
pub use runner::{ExitStatus, ProcessCommand, ProcessOutput, ProcessRunner};
pub use shell::{ShellResult, ShellRunner};

use std::path::Path;
use std::sync::Arc;

#[derive(Clone)]
pub struct SubprocessManager {
    runner: Arc<dyn ProcessRunner>,
}

impl SubprocessManager {
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        Self { runner }
    }

    pub fn production() -> Self {
        Self::new(Arc::new(runner::TokioProcessRunner))
    }

    #[cfg(test)]
    pub fn mock() -> (Self, MockProcessRunner) {
        let mock = MockProcessRunner::new();
        let runner = Arc::new(mock.clone()) as Arc<dyn ProcessRunner>;
        (Self::new(runner), mock)
    }

    pub fn runner(&self) -> Arc<dyn ProcessRunner> {
        Arc::clone(&self.runner)
    }

    pub fn shell(&self, working_dir: &Path) -> ShellRunner {
        ShellRunner::new(Arc::clone(&self.runner)).with_working_dir(working_dir)
    }

    pub fn git(&self, repo_root: &Path) -> crate::git::GitCli {
        crate::git::GitCli::new(Arc::clone(&self.runner), repo_root)
    }
}
