//! Input tree walking and freshness checks.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use oxrdf::NamedNode;
use walkdir::WalkDir;

use rdfsync_core::{context_from_filename, FileRecord, MappingError, RdfFormat};

use crate::config::SyncConfig;
use crate::error::{Result, SyncError};
use crate::errlog::{ErrorLog, Severity};
use crate::hash::content_hash;
use crate::ledger::ImportLedger;

/// How far a file's mtime may trail its recorded import time and still be
/// suspected of a change that the timestamp cannot show. Covers filesystems
/// with one- or two-second mtime resolution.
const MTIME_SLACK_MS: i64 = 2_000;

/// The watched root and the naming rules that apply under it.
#[derive(Debug, Clone)]
pub struct InputTree {
    root: PathBuf,
    prefix: String,
    formats: &'static [RdfFormat],
}

impl InputTree {
    pub fn new(root: impl Into<PathBuf>, prefix: &str, formats: &'static [RdfFormat]) -> Self {
        Self {
            root: root.into(),
            prefix: prefix.to_string(),
            formats,
        }
    }

    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(&config.input_dir, &config.context_prefix, config.formats())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Context a file under this root is loaded into.
    pub fn context_for(&self, path: &Path) -> std::result::Result<NamedNode, MappingError> {
        context_from_filename(path, &self.prefix, &self.root, self.formats)
    }

    /// Parser format implied by a file's extension.
    pub fn format_for(&self, path: &Path) -> std::result::Result<RdfFormat, MappingError> {
        RdfFormat::for_path(path, self.formats).ok_or_else(|| MappingError::UnknownExtension {
            path: path.to_path_buf(),
        })
    }
}

/// Why a file needs to be (re)loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaleReason {
    NeverImported,
    /// The context was last loaded from a different file, e.g. before a
    /// rename from `a.nt` to `a.n3`.
    Moved,
    Modified,
    ContentChanged,
}

impl fmt::Display for StaleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::NeverImported => "never imported",
            Self::Moved => "context last loaded from another file",
            Self::Modified => "modified since last import",
            Self::ContentChanged => "content changed within timestamp resolution",
        };
        f.write_str(reason)
    }
}

/// Result of checking one file against the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    /// Does not map to a context under this root.
    Unmapped,
    /// Imported and unchanged since.
    Current,
    Stale(StaleReason),
    /// Could not be checked this cycle.
    Failed,
}

/// Enumerates input files and decides which ones need a reload.
#[derive(Debug, Clone)]
pub struct FileScanner {
    tree: InputTree,
}

impl FileScanner {
    pub fn new(tree: InputTree) -> Self {
        Self { tree }
    }

    pub fn tree(&self) -> &InputTree {
        &self.tree
    }

    /// Every regular file under the root, symlinks followed.
    ///
    /// Lazy; each call walks the tree again from the top. Entries that
    /// cannot be read are skipped; use [`FileScanner::walk`] to see them.
    pub fn all_input_files(&self) -> impl Iterator<Item = PathBuf> + '_ {
        self.walk().filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::debug!(
                    root = %self.tree.root().display(),
                    error = %e,
                    "Skipping unreadable entry"
                );
                None
            }
        })
    }

    /// Like [`FileScanner::all_input_files`], but walk errors are yielded
    /// instead of dropped. A missing or unreadable root shows up as an
    /// error for the root itself.
    pub fn walk(&self) -> impl Iterator<Item = walkdir::Result<PathBuf>> + '_ {
        WalkDir::new(self.tree.root())
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) if entry.file_type().is_file() => Some(Ok(entry.into_path())),
                Ok(_) => None,
                Err(e) => Some(Err(e)),
            })
    }

    /// True iff `path` maps to a context that was never imported or whose
    /// file changed since the recorded import.
    ///
    /// Never fails: problems with a single file are logged through `errors`
    /// and reported as "not updated".
    pub async fn file_is_updated(
        &self,
        path: &Path,
        ledger: &ImportLedger,
        errors: &mut ErrorLog,
    ) -> bool {
        matches!(self.check(path, ledger, errors).await, FileStatus::Stale(_))
    }

    /// Classify one file against the ledger. Mapping and I/O problems are
    /// logged through `errors`.
    pub async fn check(
        &self,
        path: &Path,
        ledger: &ImportLedger,
        errors: &mut ErrorLog,
    ) -> FileStatus {
        match self.staleness(path, ledger).await {
            Ok(Some(reason)) => {
                tracing::info!(path = %path.display(), reason = %reason, "Need reload");
                FileStatus::Stale(reason)
            }
            Ok(None) => FileStatus::Current,
            Err(SyncError::Mapping(e)) => {
                errors.log(
                    path,
                    Severity::Debug,
                    &format!("{} doesn't map to a context, skipping ({e})", path.display()),
                );
                FileStatus::Unmapped
            }
            Err(e) => {
                errors.log(
                    path,
                    Severity::Warn,
                    &format!("error scanning file {}: {e}", path.display()),
                );
                FileStatus::Failed
            }
        }
    }

    async fn staleness(&self, path: &Path, ledger: &ImportLedger) -> Result<Option<StaleReason>> {
        let context = self.tree.context_for(path)?;
        let file = stat(path).await?;

        let Some(record) = ledger.import_record(&context).await? else {
            return Ok(Some(StaleReason::NeverImported));
        };
        if record.filename.as_path() != path {
            return Ok(Some(StaleReason::Moved));
        }
        if file.modified > record.last_import {
            return Ok(Some(StaleReason::Modified));
        }

        let trailing_ms = (record.last_import - file.modified).num_milliseconds();
        if trailing_ms < MTIME_SLACK_MS {
            if let Some(recorded) = &record.content_hash {
                let bytes = tokio::fs::read(path).await?;
                if content_hash(&bytes) != *recorded {
                    return Ok(Some(StaleReason::ContentChanged));
                }
            }
        }
        Ok(None)
    }
}

/// Stat a file through any symlinks.
pub async fn stat(path: &Path) -> Result<FileRecord> {
    let modified = tokio::fs::metadata(path).await?.modified()?;
    Ok(FileRecord {
        path: path.to_path_buf(),
        modified: DateTime::<Utc>::from(modified),
    })
}
