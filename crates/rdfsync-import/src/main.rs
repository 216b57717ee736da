//! CLI entry point for the rdfsync importer.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use rdfsync_core::vocab;
use rdfsync_graph::{save_context, Graph, GraphError, MemoryGraph};

use rdfsync_import::{Reconciler, SyncConfig, SyncHandle};

#[derive(Parser)]
#[command(name = "rdfsync-import")]
#[command(about = "Keep graph contexts in sync with a tree of RDF files")]
struct Cli {
    /// Root of the watched tree (overrides config).
    #[arg(short, long)]
    input_dir: Option<PathBuf>,

    /// Context IRI prefix, e.g. http://example.org (overrides config).
    #[arg(long)]
    context_prefix: Option<String>,

    /// Seconds between cycles (overrides config).
    #[arg(long)]
    poll_interval: Option<f64>,

    /// Run a single cycle, print its report and exit.
    #[arg(long)]
    once: bool,

    /// Keep polling until interrupted.
    #[arg(long)]
    daemon: bool,

    /// After syncing, write every imported context back out as N-Triples
    /// under this directory.
    #[arg(long, value_name = "DIR")]
    export: Option<PathBuf>,

    /// Config file prefix (default: rdfsync).
    #[arg(short, long, default_value = "rdfsync")]
    config: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).json().init();

    let cli = Cli::parse();
    let mut sync_config = load_sync_config(&cli.config)?;
    if let Some(dir) = &cli.input_dir {
        sync_config.input_dir = dir.clone();
    }
    if let Some(prefix) = &cli.context_prefix {
        sync_config.context_prefix = prefix.clone();
    }
    if let Some(secs) = cli.poll_interval {
        sync_config.poll_interval_secs = secs;
    }
    sync_config.validate()?;

    tracing::info!(
        input_dir = %sync_config.input_dir.display(),
        context_prefix = %sync_config.context_prefix,
        "Starting importer"
    );

    let graph = Arc::new(MemoryGraph::new());
    let reconciler = Reconciler::new(graph.clone(), &sync_config);

    if cli.once {
        let mut reconciler = reconciler;
        let report = reconciler.run_cycle().await;
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if cli.daemon {
        let handle = SyncHandle::start(reconciler, &sync_config)?;
        if handle.is_polling() {
            tokio::signal::ctrl_c().await?;
            tracing::info!("Interrupted, stopping");
        } else {
            let report = handle.poll_now().await;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        handle.stop().await;
    } else {
        anyhow::bail!("Specify --once (single cycle) or --daemon (keep polling)");
    }

    if let Some(dir) = &cli.export {
        export_all(graph.as_ref(), &sync_config.context_prefix, dir).await?;
    }

    Ok(())
}

/// Write every context except the importer's own bookkeeping to `root`.
async fn export_all(graph: &MemoryGraph, prefix: &str, root: &Path) -> anyhow::Result<()> {
    let internal = vocab::INTERNAL_CONTEXT.into_owned();
    let mut written = 0usize;
    for context in graph.contexts().await? {
        if context == internal {
            continue;
        }
        match save_context(graph, &context, prefix, root).await {
            Ok(_) => written += 1,
            Err(GraphError::Mapping(e)) => {
                tracing::warn!(context = %context, error = %e, "Context has no file name, not exported");
            }
            Err(e) => return Err(e.into()),
        }
    }
    tracing::info!(root = %root.display(), contexts = written, "Export complete");
    Ok(())
}

fn load_sync_config(file_prefix: &str) -> anyhow::Result<SyncConfig> {
    let cfg = config::Config::builder()
        .add_source(config::File::with_name(file_prefix).required(false))
        .add_source(
            config::Environment::with_prefix("RDFSYNC_IMPORT")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(SyncConfig::from_config(&cfg))
}
