//! The per-run import audit record.
//!
//! Every run produces exactly one log. The log is derived here from the
//! run's terminal [`RunOutcome`]; nothing else decides its status or its
//! aggregate error, which keeps `status == Failure` and `error_detail`
//! being set in lockstep.

use serde::{Deserialize, Serialize};

use crate::rtu::error::{target, ErrorCode, RtuImportError, RtuProjectError};
use crate::types::Timestamp;

/// Final status of an import run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportLogStatus {
    Successful,
    Failure,
}

impl ImportLogStatus {
    /// Return the status name as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Successful => "successful",
            Self::Failure => "failure",
        }
    }

    /// Parse a status string. Returns `None` for unknown values.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "successful" => Some(Self::Successful),
            "failure" => Some(Self::Failure),
            _ => None,
        }
    }
}

impl std::fmt::Display for ImportLogStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// The partner session could not be opened.
    SessionFailed(RtuImportError),
    /// Reference data (taxonomies, boundaries) could not be loaded.
    Aborted(RtuImportError),
    /// No record was fetched across all batches.
    EmptyList,
    /// The commit phase ran to completion.
    Committed { failed_projects: Vec<RtuProjectError> },
    /// The delete or bulk insert call failed as a whole.
    CommitFailed {
        error: RtuImportError,
        failed_projects: Vec<RtuProjectError>,
    },
}

/// A log ready to be persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportLogDraft {
    pub start_date_time: Timestamp,
    pub end_date_time: Timestamp,
    pub status: ImportLogStatus,
    pub error_detail: Option<RtuImportError>,
    pub failed_projects: Vec<RtuProjectError>,
}

impl ImportLogDraft {
    /// Derive the log for a run.
    ///
    /// - Session, reference-data and commit aborts keep their own aggregate
    ///   error.
    /// - An empty fetch yields `EmptyList/Projects`.
    /// - A completed commit yields `Invalid/Projects` with `value1` set to
    ///   the failed-record count, unless that count is zero.
    pub fn from_outcome(start: Timestamp, end: Timestamp, outcome: RunOutcome) -> Self {
        let (error_detail, failed_projects) = match outcome {
            RunOutcome::SessionFailed(error) | RunOutcome::Aborted(error) => (Some(error), Vec::new()),
            RunOutcome::EmptyList => (
                Some(RtuImportError::new(ErrorCode::EmptyList, target::PROJECTS)),
                Vec::new(),
            ),
            RunOutcome::Committed { failed_projects } => {
                let error = (!failed_projects.is_empty()).then(|| {
                    RtuImportError::new(ErrorCode::Invalid, target::PROJECTS)
                        .with_value(failed_projects.len())
                });
                (error, failed_projects)
            }
            RunOutcome::CommitFailed {
                error,
                failed_projects,
            } => (Some(error), failed_projects),
        };

        let status = if error_detail.is_some() {
            ImportLogStatus::Failure
        } else {
            ImportLogStatus::Successful
        };

        Self {
            start_date_time: start,
            end_date_time: end,
            status,
            error_detail,
            failed_projects,
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{Duration, Utc};
    use serde_json::json;

    use super::*;

    fn failed(id: &str) -> RtuProjectError {
        RtuProjectError {
            project_id: Some(id.to_string()),
            no_reference: None,
            name: None,
            street_name: None,
            street_from: None,
            street_to: None,
            error_details: vec![RtuImportError::new(ErrorCode::MissingValue, target::NAME)],
        }
    }

    fn derive(outcome: RunOutcome) -> ImportLogDraft {
        let start = Utc::now();
        ImportLogDraft::from_outcome(start, start + Duration::seconds(3), outcome)
    }

    #[test]
    fn clean_commit_is_successful_without_error() {
        let log = derive(RunOutcome::Committed {
            failed_projects: vec![],
        });
        assert_eq!(log.status, ImportLogStatus::Successful);
        assert!(log.error_detail.is_none());
        assert!(log.failed_projects.is_empty());
    }

    #[test]
    fn commit_with_failures_is_invalid_projects() {
        let log = derive(RunOutcome::Committed {
            failed_projects: vec![failed("a"), failed("b")],
        });
        assert_eq!(log.status, ImportLogStatus::Failure);
        let error = log.error_detail.unwrap();
        assert_eq!((error.code, error.target.as_str()), (ErrorCode::Invalid, "Projects"));
        assert_eq!(error.value1(), Some(&json!(2)));
        assert_eq!(log.failed_projects.len(), 2);
    }

    #[test]
    fn empty_fetch_is_empty_list() {
        let log = derive(RunOutcome::EmptyList);
        assert_eq!(log.status, ImportLogStatus::Failure);
        assert_matches!(
            log.error_detail,
            Some(RtuImportError { code: ErrorCode::EmptyList, ref target, .. }) if target == "Projects"
        );
        assert!(log.failed_projects.is_empty());
    }

    #[test]
    fn session_failure_keeps_its_error() {
        let error = RtuImportError::new(ErrorCode::Forbidden, target::SESSION);
        let log = derive(RunOutcome::SessionFailed(error.clone()));
        assert_eq!(log.error_detail, Some(error));
        assert!(log.failed_projects.is_empty());
    }

    #[test]
    fn commit_failure_preserves_known_failures() {
        let error = RtuImportError::new(ErrorCode::Delete, target::DATABASE);
        let log = derive(RunOutcome::CommitFailed {
            error: error.clone(),
            failed_projects: vec![failed("a")],
        });
        assert_eq!(log.status, ImportLogStatus::Failure);
        assert_eq!(log.error_detail, Some(error));
        assert_eq!(log.failed_projects.len(), 1);
    }

    #[test]
    fn status_names_round_trip() {
        for status in [ImportLogStatus::Successful, ImportLogStatus::Failure] {
            assert_eq!(ImportLogStatus::from_str(status.as_str()), Some(status));
        }
    }
}
