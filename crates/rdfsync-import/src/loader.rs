//! Loading a single file into its context without ever emptying it on error.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;

use rdfsync_core::ImportRecord;
use rdfsync_graph::Graph;

use crate::hash::content_hash;
use crate::ledger::ImportLedger;
use crate::outcome::{Applied, StepOutcome};
use crate::scanner::InputTree;

/// Parses files into their contexts and records successful imports.
///
/// The store's `safe_parse` stages the whole document before swapping the
/// context, so a failed load leaves the previous content queryable.
#[derive(Clone)]
pub struct SafeLoader {
    graph: Arc<dyn Graph>,
    ledger: ImportLedger,
    tree: InputTree,
}

impl SafeLoader {
    pub fn new(graph: Arc<dyn Graph>, ledger: ImportLedger, tree: InputTree) -> Self {
        Self {
            graph,
            ledger,
            tree,
        }
    }

    /// Replace the file's context with the file's statements.
    ///
    /// The ledger is only touched after the context holds the new content.
    /// The import time is taken before the file is read, so an edit racing
    /// the read shows up as newer on the next cycle.
    pub async fn load(&self, path: &Path) -> StepOutcome {
        let (context, format) = match (self.tree.context_for(path), self.tree.format_for(path)) {
            (Ok(context), Ok(format)) => (context, format),
            (Err(e), _) | (_, Err(e)) => {
                return StepOutcome::MappingSkipped(format!(
                    "{} doesn't map to a context, skipping ({e})",
                    path.display()
                ))
            }
        };

        tracing::debug!(path = %path.display(), context = %context, "Reloading context");
        let started = Utc::now();

        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                return StepOutcome::Unexpected(format!(
                    "while trying to reload {}: read failed: {e:?}",
                    path.display()
                ))
            }
        };

        let statements = match self.graph.safe_parse(&bytes, &context, format).await {
            Ok(n) => n,
            Err(e) if e.is_parse() => {
                return StepOutcome::ParseFailed(format!(
                    "parse error reading file {}, keeping previous content of {context} ({e})",
                    path.display()
                ))
            }
            Err(e) => {
                return StepOutcome::Unexpected(format!(
                    "while trying to reload {} into {context}: {e:?}",
                    path.display()
                ))
            }
        };

        let record = ImportRecord {
            context: context.clone(),
            last_import: started,
            filename: path.to_path_buf(),
            content_hash: Some(content_hash(&bytes)),
        };
        if let Err(e) = self.ledger.set_last_import_time(&record).await {
            return StepOutcome::Unexpected(format!(
                "loaded {} but could not record the import: {e:?}",
                path.display()
            ));
        }

        tracing::info!(
            path = %path.display(),
            context = %context,
            format = %format,
            statements,
            "Context loaded"
        );
        StepOutcome::Ok(Applied::Loaded {
            context,
            statements,
        })
    }
}
