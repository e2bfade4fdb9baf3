//! Runtime configuration
//!
//! Everything comes in through the command line; there is no config file,
//! no environment variables, and no persisted state.

use clap::ValueEnum;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_INTERVAL_MS: u64 = 600_000;
pub const DEFAULT_REMOTE: &str = "origin";
pub const DEFAULT_BRANCH: &str = "main";

/// File names the daemon must never commit: its own automation artifacts.
/// A status line whose path contains one of these is always skipped.
pub const DEFAULT_EXCLUSIONS: &[&str] = &["update.sh", "update.js"];

#[derive(ValueEnum, Serialize, Copy, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum CommitStrategy {
    /// Stage everything once, then one commit for the whole staged set.
    Bulk,
    /// Stage and commit each modified file individually.
    PerFile,
}

impl CommitStrategy {
    /// The fallback each strategy historically shipped with.
    pub fn default_fallback(self) -> MarkerFallback {
        match self {
            CommitStrategy::Bulk => MarkerFallback::Empty,
            CommitStrategy::PerFile => MarkerFallback::Placeholder,
        }
    }
}

/// What to use as the commit message when a file carries no marker.
#[derive(ValueEnum, Serialize, Copy, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum MarkerFallback {
    /// Empty message (the timestamp still prefixes it).
    Empty,
    /// The literal text "no comment".
    Placeholder,
}

#[derive(Clone, Debug)]
pub struct PulseConfig {
    pub repo_root: PathBuf,
    pub interval: Duration,
    pub strategy: CommitStrategy,
    pub fallback: MarkerFallback,
    pub remote: String,
    pub branch: String,
    pub exclusions: Vec<String>,
}

impl PulseConfig {
    pub fn new(repo_root: PathBuf, strategy: CommitStrategy) -> Self {
        Self {
            repo_root,
            interval: Duration::from_millis(DEFAULT_INTERVAL_MS),
            strategy,
            fallback: strategy.default_fallback(),
            remote: DEFAULT_REMOTE.to_string(),
            branch: DEFAULT_BRANCH.to_string(),
            exclusions: DEFAULT_EXCLUSIONS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_fallback(mut self, fallback: MarkerFallback) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_push_target(mut self, remote: &str, branch: &str) -> Self {
        self.remote = remote.to_string();
        self.branch = branch.to_string();
        self
    }

    /// Extends the built-in exclusion list; the defaults always apply.
    pub fn with_extra_exclusions<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclusions.extend(extra.into_iter().map(Into::into));
        self
    }
}
