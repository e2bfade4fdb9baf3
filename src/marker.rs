//! Commit-marker extraction
//!
//! A file supplies its own commit message through a marker comment:
//! a line matching `//\s*COMMIT:\s*.*`. Only the first match counts.

use chrono::{SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::PathBuf;

use crate::config::MarkerFallback;

static MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"//\s*COMMIT:\s*(.*)").expect("marker pattern is valid"));

pub const PLACEHOLDER_MESSAGE: &str = "no comment";

/// A message extracted for one file. Computed fresh each cycle, never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitMarker {
    pub file: PathBuf,
    pub message: String,
}

/// Pull the marker message out of file content. Absent marker yields the
/// configured fallback; this never fails.
pub fn extract_message(content: &str, fallback: MarkerFallback) -> String {
    match MARKER_RE.captures(content) {
        Some(caps) => caps[1].trim().to_string(),
        None => match fallback {
            MarkerFallback::Empty => String::new(),
            MarkerFallback::Placeholder => PLACEHOLDER_MESSAGE.to_string(),
        },
    }
}

/// Final commit message: ISO-8601 UTC timestamp, a space, then the text.
pub fn commit_message(message: &str) -> String {
    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    format!("{timestamp} {message}")
}
