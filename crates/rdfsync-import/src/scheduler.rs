//! Periodic reconciliation.
//!
//! One tokio task ticks at the configured interval and runs a cycle per
//! tick. Cycles are serialized through a mutex shared with `poll_now`, so a
//! manual poll and a timer tick never overlap; ticks that come due while a
//! cycle is running are skipped.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::config::SyncConfig;
use crate::error::Result;
use crate::reconcile::{CycleReport, Reconciler};

/// A running importer.
///
/// Dropping the handle stops the timer after the cycle in flight, if any.
pub struct SyncHandle {
    reconciler: Arc<Mutex<Reconciler>>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl SyncHandle {
    /// Take ownership of `reconciler` and, if polling is enabled, start the
    /// timer task. Must be called from within a tokio runtime.
    pub fn start(reconciler: Reconciler, config: &SyncConfig) -> Result<Self> {
        let period = config.poll_interval()?;
        let reconciler = Arc::new(Mutex::new(reconciler));
        let cancel = CancellationToken::new();

        let task = if config.polling {
            let reconciler = reconciler.clone();
            let cancel = cancel.clone();
            Some(tokio::spawn(async move {
                run_poll_loop(reconciler, period, cancel).await;
            }))
        } else {
            tracing::info!("Polling disabled, cycles run on demand only");
            None
        };

        Ok(Self {
            reconciler,
            cancel,
            task,
        })
    }

    pub fn is_polling(&self) -> bool {
        self.task.is_some()
    }

    /// Run one cycle now, waiting for any cycle in flight to finish first.
    pub async fn poll_now(&self) -> CycleReport {
        self.reconciler.lock().await.run_cycle().await
    }

    /// Stop the timer and wait for the poll task to exit. A cycle that is
    /// already running completes first.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::error!(error = %e, "Poll task panicked");
            }
        }
    }
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run_poll_loop(
    reconciler: Arc<Mutex<Reconciler>>,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tracing::info!(interval_ms = period.as_millis() as u64, "Poll loop started");

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        // Cancellation is only observed between cycles.
        let mut reconciler = reconciler.lock().await;
        reconciler.run_cycle().await;
    }

    tracing::info!("Poll loop stopped");
}
