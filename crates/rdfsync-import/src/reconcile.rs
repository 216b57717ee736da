//! The reconciliation cycle: scan the tree, diff it against the ledger,
//! apply loads and removals.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use rdfsync_core::CycleId;
use rdfsync_graph::Graph;

use crate::config::SyncConfig;
use crate::errlog::{ErrorLog, Severity};
use crate::ledger::ImportLedger;
use crate::loader::SafeLoader;
use crate::outcome::{Applied, StepOutcome};
use crate::scanner::{FileScanner, FileStatus, InputTree};

/// Counts for one cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    pub cycle_id: CycleId,
    /// Files found under the root.
    pub scanned: u32,
    pub loaded: u32,
    /// Contexts cleared because their file disappeared.
    pub cleared: u32,
    pub parse_failures: u32,
    /// Store and I/O failures, including directories the walk could not
    /// read.
    pub unexpected: u32,
    /// Files that do not map to a context.
    pub skipped: u32,
    /// The ledger could not be read, so nothing was applied.
    pub aborted: bool,
}

impl CycleReport {
    fn new(cycle_id: CycleId) -> Self {
        Self {
            cycle_id,
            ..Default::default()
        }
    }

    /// Whether the cycle wrote anything to the store.
    pub fn changed(&self) -> bool {
        self.loaded > 0 || self.cleared > 0
    }
}

/// Owns everything one importer instance needs between cycles.
///
/// A cycle takes `&mut self`, so two cycles of the same importer can never
/// overlap.
pub struct Reconciler {
    graph: Arc<dyn Graph>,
    scanner: FileScanner,
    ledger: ImportLedger,
    loader: SafeLoader,
    errors: ErrorLog,
    unreached: Vec<PathBuf>,
}

impl Reconciler {
    pub fn new(graph: Arc<dyn Graph>, config: &SyncConfig) -> Self {
        let tree = InputTree::from_config(config);
        let ledger = ImportLedger::new(graph.clone());
        let loader = SafeLoader::new(graph.clone(), ledger.clone(), tree.clone());
        Self {
            graph,
            scanner: FileScanner::new(tree),
            ledger,
            loader,
            errors: ErrorLog::new(),
            unreached: Vec::new(),
        }
    }

    pub fn ledger(&self) -> &ImportLedger {
        &self.ledger
    }

    pub fn tree(&self) -> &InputTree {
        self.scanner.tree()
    }

    /// Per-file messages logged so far, after deduplication.
    pub fn errors(&self) -> &ErrorLog {
        &self.errors
    }

    /// Run one scan → diff → apply pass.
    ///
    /// Never fails: each file is handled on its own and problems end up in
    /// the log and the report.
    pub async fn run_cycle(&mut self) -> CycleReport {
        let cycle_id = CycleId::new();
        let mut report = CycleReport::new(cycle_id);

        let mut missing = match self.ledger.all_imported_filenames().await {
            Ok(names) => names,
            Err(e) => {
                tracing::error!(
                    cycle_id = %cycle_id,
                    error = ?e,
                    "Could not read import ledger, skipping cycle"
                );
                report.aborted = true;
                return report;
            }
        };

        // Directories the walk could not enter. Recorded files below them
        // are not known to be gone, so their contexts are kept.
        let mut unreached: Vec<PathBuf> = Vec::new();

        for entry in self.scanner.walk() {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    let at = e.path().unwrap_or(self.scanner.tree().root()).to_path_buf();
                    report.unexpected += 1;
                    self.errors.log(
                        &at,
                        Severity::Error,
                        &format!(
                            "could not walk {}, keeping contexts of files below it: {e}",
                            at.display()
                        ),
                    );
                    unreached.push(at);
                    continue;
                }
            };

            report.scanned += 1;
            missing.remove(&path);
            match self.scanner.check(&path, &self.ledger, &mut self.errors).await {
                FileStatus::Stale(_) => {
                    let outcome = self.loader.load(&path).await;
                    record_outcome(&mut self.errors, &path, outcome, &mut report);
                }
                FileStatus::Unmapped => report.skipped += 1,
                FileStatus::Current | FileStatus::Failed => {}
            }
        }

        let mut missing: Vec<PathBuf> = missing.into_iter().collect();
        missing.sort();
        for filename in missing {
            if unreached.iter().any(|dir| filename.starts_with(dir)) {
                tracing::debug!(
                    cycle_id = %cycle_id,
                    path = %filename.display(),
                    "File not reached by the walk, keeping its context"
                );
                continue;
            }
            let outcome = self.remove_vanished(&filename).await;
            record_outcome(&mut self.errors, &filename, outcome, &mut report);
        }

        // A directory that is readable again may fail again later; that
        // should be logged afresh.
        for dir in std::mem::replace(&mut self.unreached, unreached.clone()) {
            if !unreached.contains(&dir) {
                self.errors.forget(&dir);
            }
        }

        if report.changed() || report.parse_failures > 0 || report.unexpected > 0 {
            tracing::info!(
                cycle_id = %cycle_id,
                scanned = report.scanned,
                loaded = report.loaded,
                cleared = report.cleared,
                parse_failures = report.parse_failures,
                unexpected = report.unexpected,
                "Sync cycle complete"
            );
        } else {
            tracing::debug!(cycle_id = %cycle_id, scanned = report.scanned, "Sync cycle idle");
        }
        report
    }

    /// Clear the context of a file that is recorded but no longer on disk.
    async fn remove_vanished(&self, filename: &Path) -> StepOutcome {
        let Ok(context) = self.tree().context_for(filename) else {
            return StepOutcome::Ok(Applied::NotOwned);
        };

        // The context may have been reloaded from a renamed file earlier in
        // this cycle; its record then names the new file.
        match self.ledger.import_record(&context).await {
            Ok(Some(record)) if record.filename.as_path() != filename => {
                tracing::debug!(
                    path = %filename.display(),
                    context = %context,
                    now_from = %record.filename.display(),
                    "Context now loaded from another file, not clearing"
                );
                return StepOutcome::Ok(Applied::Reassigned { context });
            }
            Ok(_) => {}
            Err(e) => {
                return StepOutcome::Unexpected(format!(
                    "while checking the import record of {context} for removed file {}: {e:?}",
                    filename.display()
                ))
            }
        }

        if let Err(e) = self.graph.subgraph_clear(&context).await {
            return StepOutcome::Unexpected(format!(
                "while clearing {context} for removed file {}: {e:?}",
                filename.display()
            ));
        }
        if let Err(e) = self.ledger.remove_import_record(&context).await {
            return StepOutcome::Unexpected(format!(
                "cleared {context} but could not remove its import record: {e:?}"
            ));
        }

        tracing::info!(
            path = %filename.display(),
            context = %context,
            "Input file removed, context cleared"
        );
        StepOutcome::Ok(Applied::Cleared { context })
    }
}

fn record_outcome(errors: &mut ErrorLog, path: &Path, outcome: StepOutcome, report: &mut CycleReport) {
    match outcome {
        StepOutcome::Ok(applied) => {
            errors.forget(path);
            match applied {
                Applied::Loaded { .. } => report.loaded += 1,
                Applied::Cleared { .. } => report.cleared += 1,
                Applied::Reassigned { .. } | Applied::NotOwned => {}
            }
        }
        StepOutcome::MappingSkipped(msg) => {
            report.skipped += 1;
            errors.log(path, Severity::Debug, &msg);
        }
        StepOutcome::ParseFailed(msg) => {
            report.parse_failures += 1;
            errors.log(path, Severity::Warn, &msg);
        }
        StepOutcome::Unexpected(msg) => {
            report.unexpected += 1;
            errors.log(path, Severity::Error, &msg);
        }
    }
}
