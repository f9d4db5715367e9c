//! ImportLogRecorder: writes the single log of a run.

use std::sync::Arc;

use chrono::Utc;
use workplan_core::rtu::import_log::{ImportLogDraft, ImportLogStatus, RunOutcome};
use workplan_core::types::Timestamp;

use crate::ports::ImportLogStore;

pub struct ImportLogRecorder {
    store: Arc<dyn ImportLogStore>,
}

impl ImportLogRecorder {
    pub fn new(store: Arc<dyn ImportLogStore>) -> Self {
        Self { store }
    }

    /// Derive and persist the log for `outcome`, ending now.
    ///
    /// A failed write is logged; there is nowhere else to report it.
    pub async fn record(&self, started_at: Timestamp, outcome: RunOutcome) -> ImportLogStatus {
        let draft = ImportLogDraft::from_outcome(started_at, Utc::now(), outcome);
        let code = draft.error_detail.as_ref().map(|e| e.code);

        match self.store.create(&draft).await {
            Ok(log_id) => tracing::info!(
                log_id,
                status = %draft.status,
                error_code = ?code,
                failed = draft.failed_projects.len(),
                "RTU import log recorded",
            ),
            Err(e) => tracing::error!(
                error = %e,
                status = %draft.status,
                "Failed to record RTU import log",
            ),
        }

        draft.status
    }
}
