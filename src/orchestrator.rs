//! Commit cycle orchestration
//!
//! One cycle walks detect → read → extract → commit → push. Every step
//! awaits the previous one; files are processed strictly in order. Any
//! failure aborts the whole cycle (the caller logs it and the repository
//! is left as-is until the next tick).

use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::{CommitStrategy, PulseConfig};
use crate::git::{GitError, GitOperations};
use crate::marker::{self, CommitMarker};

#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error(transparent)]
    Git(#[from] GitError),

    #[error("failed to read {path}: {source}")]
    FileAccess {
        path: String,
        source: std::io::Error,
    },
}

/// What one cycle did. Serialized into the debug log after each run.
#[derive(Debug, Serialize)]
pub struct CycleReport {
    pub strategy: CommitStrategy,
    pub commits: usize,
    pub pushed: bool,
    /// Paths passed over by the lock check.
    pub skipped: Vec<String>,
}

impl CycleReport {
    fn empty(strategy: CommitStrategy) -> Self {
        Self {
            strategy,
            commits: 0,
            pushed: false,
            skipped: Vec::new(),
        }
    }
}

/// Drop paths that contain any excluded file name, keeping order.
pub fn filter_excluded(paths: Vec<String>, exclusions: &[String]) -> Vec<String> {
    paths
        .into_iter()
        .filter(|path| !exclusions.iter().any(|name| path.contains(name.as_str())))
        .collect()
}

/// A file counts as locked when it cannot be opened for writing — removed,
/// permission-denied, or held by something else. Locked files are skipped,
/// never treated as cycle failures.
pub async fn is_file_locked(path: &Path) -> bool {
    tokio::fs::OpenOptions::new()
        .write(true)
        .open(path)
        .await
        .is_err()
}

pub struct CommitOrchestrator {
    git: Arc<dyn GitOperations>,
    config: PulseConfig,
}

impl CommitOrchestrator {
    pub fn new(git: Arc<dyn GitOperations>, config: PulseConfig) -> Self {
        Self { git, config }
    }

    pub async fn run_cycle(&self) -> Result<CycleReport, CycleError> {
        match self.config.strategy {
            CommitStrategy::Bulk => self.run_bulk().await,
            CommitStrategy::PerFile => self.run_per_file().await,
        }
    }

    /// Stage each modified file on its own and give it its own commit,
    /// then push once to the configured remote and branch.
    async fn run_per_file(&self) -> Result<CycleReport, CycleError> {
        let files = self.git.modified_files().await?;
        let files = filter_excluded(files, &self.config.exclusions);

        if files.is_empty() {
            info!("no modified files, nothing to commit");
            return Ok(CycleReport::empty(CommitStrategy::PerFile));
        }

        let mut markers = Vec::with_capacity(files.len());
        for file in &files {
            info!("checking {file}");
            let content = self.read_file(file).await?;
            let message = marker::extract_message(&content, self.config.fallback);
            markers.push(CommitMarker {
                file: file.into(),
                message: marker::commit_message(&message),
            });
        }

        for entry in &markers {
            let path = entry.file.to_string_lossy();
            self.git.stage_file(&path).await?;
            self.git.commit(&entry.message).await?;
            info!("{}", entry.message);
        }

        info!("all changes committed");
        self.git
            .push_to(&self.config.remote, &self.config.branch)
            .await?;
        info!("changes pushed to {}/{}", self.config.remote, self.config.branch);

        Ok(CycleReport {
            strategy: CommitStrategy::PerFile,
            commits: markers.len(),
            pushed: true,
            skipped: Vec::new(),
        })
    }

    /// Stage the whole working tree once, then commit the staged set with
    /// the last eligible file's message and push to the default remote.
    async fn run_bulk(&self) -> Result<CycleReport, CycleError> {
        self.git.stage_all().await?;

        let entries = self.git.status().await?;
        let paths = filter_excluded(
            entries.into_iter().map(|e| e.path).collect(),
            &self.config.exclusions,
        );

        if paths.is_empty() {
            info!("working tree clean, nothing to commit");
            return Ok(CycleReport::empty(CommitStrategy::Bulk));
        }

        let mut last_message = None;
        let mut skipped = Vec::new();
        for path in &paths {
            if is_file_locked(&self.config.repo_root.join(path)).await {
                debug!("skipping locked file {path}");
                skipped.push(path.clone());
                continue;
            }

            info!("{path}");
            let content = self.read_file(path).await?;
            let message = marker::extract_message(&content, self.config.fallback);
            last_message = Some(marker::commit_message(&message));
        }

        let Some(message) = last_message else {
            info!("every changed file is locked, nothing to commit");
            return Ok(CycleReport {
                strategy: CommitStrategy::Bulk,
                commits: 0,
                pushed: false,
                skipped,
            });
        };

        self.git.commit(&message).await?;
        info!("{message}");
        self.git.push().await?;
        info!("changes pushed");

        Ok(CycleReport {
            strategy: CommitStrategy::Bulk,
            commits: 1,
            pushed: true,
            skipped,
        })
    }

    async fn read_file(&self, path: &str) -> Result<String, CycleError> {
        tokio::fs::read_to_string(self.config.repo_root.join(path))
            .await
            .map_err(|source| CycleError::FileAccess {
                path: path.to_string(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::parsers::parse_status_output;
    use std::io::Write;

    fn exclusions() -> Vec<String> {
        vec!["update.sh".to_string(), "update.js".to_string()]
    }

    #[test]
    fn status_listing_filter_drops_blanks_and_excluded_names() {
        let listing = " M a.txt\n\n M update.sh\n M b.txt\n";
        let paths: Vec<String> = parse_status_output(listing)
            .into_iter()
            .map(|e| e.path)
            .collect();
        let filtered = filter_excluded(paths, &exclusions());

        assert_eq!(filtered, vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn exclusion_matches_anywhere_in_the_path() {
        let paths = vec![
            "scripts/update.sh".to_string(),
            "src/updater.rs".to_string(),
        ];
        let filtered = filter_excluded(paths, &exclusions());
        assert_eq!(filtered, vec!["src/updater.rs"]);
    }

    #[tokio::test]
    async fn writable_file_is_not_locked() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "content").unwrap();
        assert!(!is_file_locked(file.path()).await);
    }

    #[tokio::test]
    async fn missing_file_is_locked() {
        let dir = tempfile::tempdir().unwrap();
        assert!(is_file_locked(&dir.path().join("gone.txt")).await);
    }
}
