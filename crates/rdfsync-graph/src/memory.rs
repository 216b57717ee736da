//! In-process graph store.
//!
//! Backs the sync loop when no external store is configured, and every test
//! in the workspace. All operations take the store lock once, so
//! `replace_context` is observed atomically by other callers.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use oxrdf::{NamedNode, Subject, Term, Triple};
use parking_lot::RwLock;

use crate::client::{Graph, GraphError, TriplePattern};

/// Thread-safe in-memory quad store.
#[derive(Debug, Default)]
pub struct MemoryGraph {
    contexts: RwLock<HashMap<NamedNode, HashSet<Triple>>>,
    writes: AtomicU64,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of mutating calls made so far, including no-op ones.
    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    fn count_write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Graph for MemoryGraph {
    async fn value(
        &self,
        subject: &NamedNode,
        predicate: &NamedNode,
    ) -> Result<Option<Term>, GraphError> {
        let subject = Subject::from(subject.clone());
        let contexts = self.contexts.read();
        Ok(contexts
            .values()
            .flat_map(|set| set.iter())
            .find(|t| t.subject == subject && t.predicate == *predicate)
            .map(|t| t.object.clone()))
    }

    async fn add(&self, triples: &[Triple], context: &NamedNode) -> Result<(), GraphError> {
        self.count_write();
        if triples.is_empty() {
            return Ok(());
        }
        let mut contexts = self.contexts.write();
        contexts
            .entry(context.clone())
            .or_default()
            .extend(triples.iter().cloned());
        Ok(())
    }

    async fn remove(&self, pattern: &TriplePattern, context: &NamedNode) -> Result<(), GraphError> {
        self.count_write();
        let mut contexts = self.contexts.write();
        if let Some(set) = contexts.get_mut(context) {
            set.retain(|t| !pattern.matches(t));
            if set.is_empty() {
                contexts.remove(context);
            }
        }
        Ok(())
    }

    async fn triples(
        &self,
        pattern: &TriplePattern,
        context: Option<&NamedNode>,
    ) -> Result<Vec<Triple>, GraphError> {
        let contexts = self.contexts.read();
        let matching = |set: &HashSet<Triple>| {
            set.iter()
                .filter(|t| pattern.matches(t))
                .cloned()
                .collect::<Vec<_>>()
        };
        Ok(match context {
            Some(ctx) => contexts.get(ctx).map(matching).unwrap_or_default(),
            None => contexts.values().flat_map(matching).collect(),
        })
    }

    async fn subgraph_clear(&self, context: &NamedNode) -> Result<(), GraphError> {
        self.count_write();
        self.contexts.write().remove(context);
        Ok(())
    }

    async fn replace_context(
        &self,
        context: &NamedNode,
        triples: Vec<Triple>,
    ) -> Result<(), GraphError> {
        self.count_write();
        let set: HashSet<Triple> = triples.into_iter().collect();
        let mut contexts = self.contexts.write();
        if set.is_empty() {
            contexts.remove(context);
        } else {
            contexts.insert(context.clone(), set);
        }
        Ok(())
    }

    async fn contexts(&self) -> Result<Vec<NamedNode>, GraphError> {
        let mut names: Vec<NamedNode> = self.contexts.read().keys().cloned().collect();
        names.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        Ok(names)
    }
}
