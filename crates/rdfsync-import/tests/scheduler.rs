//! Timer-driven cycles through `SyncHandle`.

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use oxrdf::{NamedNode, Term, Triple};

use rdfsync_core::vocab::INTERNAL_CONTEXT;
use rdfsync_graph::{Graph, GraphError, MemoryGraph, TriplePattern};
use rdfsync_import::{Reconciler, SyncConfig, SyncHandle};

fn config(root: &Path, polling: bool) -> SyncConfig {
    SyncConfig {
        input_dir: root.to_path_buf(),
        context_prefix: "http://example.org".to_string(),
        poll_interval_secs: 0.05,
        polling,
        ..SyncConfig::default()
    }
}

fn line(value: &str) -> String {
    format!("<http://example.org/dp> <http://example.org/name> \"{value}\" .\n")
}

async fn wait_for_len(graph: &MemoryGraph, context: &NamedNode, len: usize) -> bool {
    for _ in 0..100 {
        if graph.subgraph_len(context).await.unwrap() == len {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}

#[tokio::test]
async fn test_polling_picks_up_new_files() {
    let dir = tempfile::tempdir().unwrap();
    let graph = Arc::new(MemoryGraph::new());
    let cfg = config(dir.path(), true);
    let handle = SyncHandle::start(Reconciler::new(graph.clone(), &cfg), &cfg).unwrap();
    assert!(handle.is_polling());

    std::fs::write(dir.path().join("late.nt"), line("late")).unwrap();
    let ctx = NamedNode::new("http://example.org/late#context").unwrap();
    assert!(wait_for_len(&graph, &ctx, 1).await);

    handle.stop().await;
}

#[tokio::test]
async fn test_stop_ends_polling() {
    let dir = tempfile::tempdir().unwrap();
    let graph = Arc::new(MemoryGraph::new());
    let cfg = config(dir.path(), true);
    let handle = SyncHandle::start(Reconciler::new(graph.clone(), &cfg), &cfg).unwrap();
    handle.stop().await;

    std::fs::write(dir.path().join("after.nt"), line("after")).unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(graph.writes(), 0);
}

#[tokio::test]
async fn test_disabled_polling_runs_on_demand() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("f.nt"), line("x")).unwrap();
    let graph = Arc::new(MemoryGraph::new());
    let cfg = config(dir.path(), false);
    let handle = SyncHandle::start(Reconciler::new(graph.clone(), &cfg), &cfg).unwrap();
    assert!(!handle.is_polling());

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(graph.writes(), 0);

    let report = handle.poll_now().await;
    assert_eq!(report.loaded, 1);
    handle.stop().await;
}

#[tokio::test]
async fn test_invalid_interval_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let graph = Arc::new(MemoryGraph::new());
    let cfg = SyncConfig {
        poll_interval_secs: 0.0,
        ..config(dir.path(), true)
    };
    assert!(SyncHandle::start(Reconciler::new(graph, &cfg), &cfg).is_err());
}

/// A `MemoryGraph` whose every call takes `delay` and that records how many
/// calls were in flight at once.
struct SlowGraph {
    inner: MemoryGraph,
    delay: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    replace_started: AtomicBool,
}

impl SlowGraph {
    fn new(delay: Duration) -> Self {
        Self {
            inner: MemoryGraph::new(),
            delay,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            replace_started: AtomicBool::new(false),
        }
    }

    async fn enter(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
    }

    fn leave(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Graph for SlowGraph {
    async fn value(
        &self,
        subject: &NamedNode,
        predicate: &NamedNode,
    ) -> Result<Option<Term>, GraphError> {
        self.enter().await;
        let result = self.inner.value(subject, predicate).await;
        self.leave();
        result
    }

    async fn add(&self, triples: &[Triple], context: &NamedNode) -> Result<(), GraphError> {
        self.enter().await;
        let result = self.inner.add(triples, context).await;
        self.leave();
        result
    }

    async fn remove(&self, pattern: &TriplePattern, context: &NamedNode) -> Result<(), GraphError> {
        self.enter().await;
        let result = self.inner.remove(pattern, context).await;
        self.leave();
        result
    }

    async fn triples(
        &self,
        pattern: &TriplePattern,
        context: Option<&NamedNode>,
    ) -> Result<Vec<Triple>, GraphError> {
        self.enter().await;
        let result = self.inner.triples(pattern, context).await;
        self.leave();
        result
    }

    async fn subgraph_clear(&self, context: &NamedNode) -> Result<(), GraphError> {
        self.enter().await;
        let result = self.inner.subgraph_clear(context).await;
        self.leave();
        result
    }

    async fn replace_context(
        &self,
        context: &NamedNode,
        triples: Vec<Triple>,
    ) -> Result<(), GraphError> {
        self.replace_started.store(true, Ordering::SeqCst);
        self.enter().await;
        let result = self.inner.replace_context(context, triples).await;
        self.leave();
        result
    }

    async fn contexts(&self) -> Result<Vec<NamedNode>, GraphError> {
        self.enter().await;
        let result = self.inner.contexts().await;
        self.leave();
        result
    }
}

#[tokio::test]
async fn test_stop_lets_running_cycle_finish() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("f.nt"), line("slow")).unwrap();
    let graph = Arc::new(SlowGraph::new(Duration::from_millis(100)));
    let cfg = SyncConfig {
        poll_interval_secs: 60.0,
        ..config(dir.path(), true)
    };
    let handle = SyncHandle::start(Reconciler::new(graph.clone(), &cfg), &cfg).unwrap();

    for _ in 0..100 {
        if graph.replace_started.load(Ordering::SeqCst) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(graph.replace_started.load(Ordering::SeqCst));
    handle.stop().await;

    // Both the content and its ledger record made it in.
    let ctx = NamedNode::new("http://example.org/f#context").unwrap();
    assert_eq!(graph.inner.subgraph_len(&ctx).await.unwrap(), 1);
    let record = graph
        .inner
        .triples(
            &TriplePattern::any().with_subject(ctx),
            Some(&INTERNAL_CONTEXT.into_owned()),
        )
        .await
        .unwrap();
    assert!(!record.is_empty());
}

#[tokio::test]
async fn test_manual_and_timer_cycles_never_overlap() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("f.nt"), line("x")).unwrap();
    let graph = Arc::new(SlowGraph::new(Duration::from_millis(5)));
    let cfg = SyncConfig {
        poll_interval_secs: 0.01,
        ..config(dir.path(), true)
    };
    let handle = SyncHandle::start(Reconciler::new(graph.clone(), &cfg), &cfg).unwrap();

    for _ in 0..5 {
        tokio::join!(handle.poll_now(), handle.poll_now(), handle.poll_now());
    }
    handle.stop().await;

    assert_eq!(graph.max_in_flight.load(Ordering::SeqCst), 1);
}
