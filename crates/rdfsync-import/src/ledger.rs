//! Import bookkeeping stored in the graph itself.
//!
//! Each imported context gets a small record in the internal context:
//!
//! ```text
//! <ctx> imp:lastImportTime "2024-01-15T10:00:00.000000Z"^^xsd:dateTime .
//! <ctx> imp:filename       "/data/a/b.nt" .
//! <ctx> imp:contentHash    "af1349b9..." .
//! ```
//!
//! Keeping the ledger in the store means a restarted importer picks up
//! where the previous one left off.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use oxrdf::vocab::xsd;
use oxrdf::{Literal, NamedNode, Term, Triple};

use rdfsync_core::vocab::{CONTENT_HASH, FILENAME, INTERNAL_CONTEXT, LAST_IMPORT_TIME};
use rdfsync_core::ImportRecord;
use rdfsync_graph::{Graph, TriplePattern};

use crate::error::Result;

/// Reads and writes import records through a [`Graph`].
#[derive(Clone)]
pub struct ImportLedger {
    graph: Arc<dyn Graph>,
    internal: NamedNode,
}

impl ImportLedger {
    pub fn new(graph: Arc<dyn Graph>) -> Self {
        Self {
            graph,
            internal: INTERNAL_CONTEXT.into_owned(),
        }
    }

    /// Every filename with an import record, as recorded at import time.
    pub async fn all_imported_filenames(&self) -> Result<HashSet<PathBuf>> {
        let pattern = TriplePattern::any().with_predicate(FILENAME.into_owned());
        let rows = self.graph.triples(&pattern, Some(&self.internal)).await?;
        Ok(rows
            .into_iter()
            .filter_map(|t| match t.object {
                Term::Literal(lit) => Some(PathBuf::from(lit.value())),
                _ => None,
            })
            .collect())
    }

    /// The full record for a context, if it was ever imported.
    ///
    /// A record whose timestamp cannot be read is reported as absent, so the
    /// file is reloaded and the record rewritten.
    pub async fn import_record(&self, context: &NamedNode) -> Result<Option<ImportRecord>> {
        let pattern = TriplePattern::any().with_subject(context.clone());
        let rows = self.graph.triples(&pattern, Some(&self.internal)).await?;

        let mut last_import = None;
        let mut filename = None;
        let mut content_hash = None;
        for triple in &rows {
            let Term::Literal(lit) = &triple.object else {
                continue;
            };
            let predicate = triple.predicate.as_ref();
            if predicate == LAST_IMPORT_TIME {
                match DateTime::parse_from_rfc3339(lit.value()) {
                    Ok(ts) => last_import = Some(ts.with_timezone(&Utc)),
                    Err(e) => tracing::warn!(
                        context = %context,
                        value = lit.value(),
                        error = %e,
                        "Unreadable import time, treating context as never imported"
                    ),
                }
            } else if predicate == FILENAME {
                filename = Some(PathBuf::from(lit.value()));
            } else if predicate == CONTENT_HASH {
                content_hash = Some(lit.value().to_string());
            }
        }

        Ok(last_import.map(|last_import| ImportRecord {
            context: context.clone(),
            last_import,
            filename: filename.unwrap_or_default(),
            content_hash,
        }))
    }

    pub async fn last_import_time(&self, context: &NamedNode) -> Result<Option<DateTime<Utc>>> {
        Ok(self.import_record(context).await?.map(|r| r.last_import))
    }

    /// Replace the record for `record.context`.
    ///
    /// Remove-then-add: a crash in between loses the record, which only
    /// costs one extra reload of the file.
    pub async fn set_last_import_time(&self, record: &ImportRecord) -> Result<()> {
        self.remove_import_record(&record.context).await?;

        let subject = record.context.clone();
        let timestamp = record
            .last_import
            .to_rfc3339_opts(SecondsFormat::Micros, true);
        let mut triples = vec![
            Triple::new(
                subject.clone(),
                LAST_IMPORT_TIME.into_owned(),
                Literal::new_typed_literal(timestamp, xsd::DATE_TIME.into_owned()),
            ),
            Triple::new(
                subject.clone(),
                FILENAME.into_owned(),
                Literal::new_simple_literal(record.filename.to_string_lossy()),
            ),
        ];
        if let Some(hash) = &record.content_hash {
            triples.push(Triple::new(
                subject,
                CONTENT_HASH.into_owned(),
                Literal::new_simple_literal(hash.as_str()),
            ));
        }

        self.graph.add(&triples, &self.internal).await?;
        Ok(())
    }

    /// Delete the record for a context. No-op if there is none.
    pub async fn remove_import_record(&self, context: &NamedNode) -> Result<()> {
        let pattern = TriplePattern::any().with_subject(context.clone());
        self.graph.remove(&pattern, &self.internal).await?;
        Ok(())
    }
}
