//! Periodic RTU import.
//!
//! Runs the orchestrator on a fixed interval until `cancel` is triggered.
//! The first tick fires immediately. Concurrent runs are not prevented: a
//! background run still in flight when the next tick fires will race it.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use workplan_pipeline::{ImportOrchestrator, ImportRun};

/// Run the import loop.
pub async fn run(orchestrator: ImportOrchestrator, every: Duration, blocking: bool, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = every.as_secs(),
        blocking,
        "RTU import scheduler started"
    );

    let mut interval = tokio::time::interval(every);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("RTU import scheduler stopping");
                break;
            }
            _ = interval.tick() => {
                trigger(&orchestrator, blocking).await;
            }
        }
    }
}

/// One triggered run. Session failures are already in the import log, so
/// they are only reported here.
pub async fn trigger(orchestrator: &ImportOrchestrator, blocking: bool) -> Option<ImportRun> {
    match orchestrator.run(blocking).await {
        Ok(run) => {
            match run {
                ImportRun::Completed(status) => tracing::info!(%status, "RTU import finished"),
                ImportRun::Dispatched => tracing::info!("RTU import dispatched"),
            }
            Some(run)
        }
        Err(e) => {
            tracing::warn!(error = %e, "RTU import could not start");
            None
        }
    }
}
