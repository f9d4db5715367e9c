//! RTU import log model.

use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;
use workplan_core::rtu::error::{RtuImportError, RtuProjectError};
use workplan_core::rtu::import_log::ImportLogStatus;
use workplan_core::types::{DbId, Timestamp};

/// A row from the `rtu_import_logs` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RtuImportLog {
    pub id: DbId,
    pub start_date_time: Timestamp,
    pub end_date_time: Timestamp,
    pub status: String,
    pub error_detail: Option<Json<RtuImportError>>,
    pub failed_projects: Json<Vec<RtuProjectError>>,
    pub created_at: Timestamp,
}

impl RtuImportLog {
    /// Parsed status. `None` only if the row holds an unknown value.
    pub fn status(&self) -> Option<ImportLogStatus> {
        ImportLogStatus::from_str(&self.status)
    }

    pub fn error_detail(&self) -> Option<&RtuImportError> {
        self.error_detail.as_ref().map(|j| &j.0)
    }

    pub fn failed_projects(&self) -> &[RtuProjectError] {
        &self.failed_projects.0
    }
}
