//! ImportCommitter: full replace of the mirror.
//!
//! Delete then insert, as two separate calls. A crash in between leaves
//! the mirror empty until the next run.

use std::collections::HashMap;
use std::sync::Arc;

use workplan_core::rtu::error::{target, ErrorCode, RtuImportError, RtuProjectError};
use workplan_core::rtu::import_log::RunOutcome;
use workplan_core::rtu::project::{InsertOutcome, RtuProject};

use crate::ports::ProjectStore;

pub struct ImportCommitter {
    store: Arc<dyn ProjectStore>,
}

impl ImportCommitter {
    pub fn new(store: Arc<dyn ProjectStore>) -> Self {
        Self { store }
    }

    /// Replace the mirror with `valid`. `failed` carries the validation
    /// failures so far and comes back in the outcome, extended with any
    /// record the store rejected.
    pub async fn commit(&self, valid: Vec<RtuProject>, mut failed: Vec<RtuProjectError>) -> RunOutcome {
        match self.store.delete_all().await {
            Ok(deleted) => tracing::info!(deleted, "RTU mirror cleared"),
            Err(e) => {
                tracing::error!(error = %e, "RTU mirror delete failed");
                return RunOutcome::CommitFailed {
                    error: RtuImportError::new(ErrorCode::Delete, target::DATABASE),
                    failed_projects: failed,
                };
            }
        }

        if valid.is_empty() {
            return RunOutcome::Committed {
                failed_projects: failed,
            };
        }

        let outcomes = match self.store.insert_many(&valid).await {
            Ok(outcomes) => outcomes,
            Err(e) => {
                tracing::error!(error = %e, count = valid.len(), "RTU bulk insert failed");
                return RunOutcome::CommitFailed {
                    error: RtuImportError::new(ErrorCode::InsertMany, target::DATABASE),
                    failed_projects: failed,
                };
            }
        };

        let by_id: HashMap<&str, &RtuProject> = valid.iter().map(|p| (p.id.as_str(), p)).collect();
        let mut inserted = 0usize;
        for insert in outcomes {
            let reason = match insert.outcome {
                InsertOutcome::Inserted => {
                    inserted += 1;
                    continue;
                }
                InsertOutcome::Rejected(reason) => reason,
            };
            let detail = RtuImportError::new(ErrorCode::Invalid, target::DATABASE).with_value(reason);
            let project_error = match by_id.get(insert.project_id.as_str()) {
                Some(project) => project.to_project_error(vec![detail]),
                None => RtuProjectError {
                    project_id: Some(insert.project_id),
                    no_reference: None,
                    name: None,
                    street_name: None,
                    street_from: None,
                    street_to: None,
                    error_details: vec![detail],
                },
            };
            failed.push(project_error);
        }

        tracing::info!(inserted, failed = failed.len(), "RTU mirror refilled");
        RunOutcome::Committed {
            failed_projects: failed,
        }
    }
}
