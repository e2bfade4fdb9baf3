//! Granular, testable git operations layer
//!
//! All repository access goes through the subprocess abstraction: queries
//! run as subshell command strings and read captured stdout, mutations run
//! with explicit argument vectors so commit messages need no quoting.

pub mod error;
pub mod parsers;
pub mod types;

pub use error::GitError;
pub use types::FileStatusEntry;

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::subprocess::{ProcessCommandBuilder, ProcessRunner, ShellRunner};

/// The git surface the commit cycle needs. Staging mutates the index; no
/// operation attempts rollback on failure.
#[async_trait]
pub trait GitOperations: Send + Sync {
    /// `git add .`
    async fn stage_all(&self) -> Result<(), GitError>;
    /// `git status --porcelain`, in git's native output order.
    async fn status(&self) -> Result<Vec<FileStatusEntry>, GitError>;
    /// `git ls-files -m`: modified tracked files, not yet staged.
    async fn modified_files(&self) -> Result<Vec<String>, GitError>;
    /// `git add <file>`
    async fn stage_file(&self, path: &str) -> Result<(), GitError>;
    /// `git commit -m <message>`
    async fn commit(&self, message: &str) -> Result<(), GitError>;
    /// `git push` to the default remote.
    async fn push(&self) -> Result<(), GitError>;
    /// `git push <remote> <branch>`
    async fn push_to(&self, remote: &str, branch: &str) -> Result<(), GitError>;
}

pub struct GitCli {
    runner: Arc<dyn ProcessRunner>,
    repo_root: PathBuf,
}

impl GitCli {
    pub fn new(runner: Arc<dyn ProcessRunner>, repo_root: &Path) -> Self {
        Self {
            runner,
            repo_root: repo_root.to_path_buf(),
        }
    }

    fn shell(&self) -> ShellRunner {
        ShellRunner::new(Arc::clone(&self.runner)).with_working_dir(&self.repo_root)
    }

    async fn run_git(&self, args: &[&str]) -> Result<(), GitError> {
        let command = ProcessCommandBuilder::new("git")
            .args(args)
            .current_dir(&self.repo_root)
            .build();
        let display = command.display();

        let output = self.runner.run(command).await?;
        output.require_success(&display)?;
        Ok(())
    }

    async fn query(&self, command: &str) -> Result<String, GitError> {
        let result = self.shell().run(command).await?;
        match result.raw_output() {
            Some(stdout) => Ok(stdout.to_string()),
            None => Err(GitError::UnexpectedOutput {
                command: command.to_string(),
            }),
        }
    }
}

#[async_trait]
impl GitOperations for GitCli {
    async fn stage_all(&self) -> Result<(), GitError> {
        self.run_git(&["add", "."]).await
    }

    async fn status(&self) -> Result<Vec<FileStatusEntry>, GitError> {
        let stdout = self.query("git status --porcelain").await?;
        Ok(parsers::parse_status_output(&stdout))
    }

    async fn modified_files(&self) -> Result<Vec<String>, GitError> {
        let stdout = self.query("git ls-files -m").await?;
        Ok(parsers::parse_file_list(&stdout))
    }

    async fn stage_file(&self, path: &str) -> Result<(), GitError> {
        self.run_git(&["add", path]).await
    }

    async fn commit(&self, message: &str) -> Result<(), GitError> {
        self.run_git(&["commit", "-m", message]).await
    }

    async fn push(&self) -> Result<(), GitError> {
        self.run_git(&["push"]).await
    }

    async fn push_to(&self, remote: &str, branch: &str) -> Result<(), GitError> {
        self.run_git(&["push", remote, branch]).await
    }
}
