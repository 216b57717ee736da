//! Per-file log deduplication.
//!
//! A broken file is retried every cycle; without this its error would be
//! logged every poll interval. Only the last message per path is kept.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Level a per-file message is logged at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Debug,
    Warn,
    Error,
}

/// Last message logged for each path, for the lifetime of one importer.
#[derive(Debug, Default)]
pub struct ErrorLog {
    last: HashMap<PathBuf, String>,
    emitted: u64,
}

impl ErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log `message` for `path` unless it is exactly the last message
    /// logged for that path. Returns whether anything was emitted.
    pub fn log(&mut self, path: &Path, severity: Severity, message: &str) -> bool {
        if self.last.get(path).is_some_and(|last| last == message) {
            return false;
        }
        self.last.insert(path.to_path_buf(), message.to_string());
        self.emitted += 1;

        let path = path.display();
        match severity {
            Severity::Debug => tracing::debug!(path = %path, "{message}"),
            Severity::Warn => tracing::warn!(path = %path, "{message}"),
            Severity::Error => tracing::error!(path = %path, "{message}"),
        }
        true
    }

    /// Drop the remembered message for `path`, so the next failure is
    /// logged even if it repeats an earlier one.
    pub fn forget(&mut self, path: &Path) {
        self.last.remove(path);
    }

    /// Messages actually written to the log so far.
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    pub fn len(&self) -> usize {
        self.last.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last.is_empty()
    }
}
