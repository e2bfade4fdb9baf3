//! Git data structures

/// One line of `git status --porcelain` output: a two-character status
/// code and the path it applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStatusEntry {
    pub code: String,
    pub path: String,
}

impl FileStatusEntry {
    pub fn new(code: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            path: path.into(),
        }
    }
}
