//! Audit metadata carried by importable entities.
//!
//! Entities embed an [`Audit`] value as a plain field and expose it through
//! [`HasAudit`]; there is no base type to inherit from.

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// User name recorded on rows written by the RTU import job.
pub const RTU_IMPORT_USER_NAME: &str = "rtuImport";

/// Display name recorded on rows written by the RTU import job.
pub const RTU_IMPORT_DISPLAY_NAME: &str = "RTU import";

/// Who performed a change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditAuthor {
    pub user_name: String,
    pub display_name: String,
}

impl AuditAuthor {
    /// The system author used by the RTU import job.
    pub fn rtu_import() -> Self {
        Self {
            user_name: RTU_IMPORT_USER_NAME.to_string(),
            display_name: RTU_IMPORT_DISPLAY_NAME.to_string(),
        }
    }
}

/// Creation and last-modification stamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Audit {
    pub created_at: Timestamp,
    pub created_by: AuditAuthor,
    pub last_modified_at: Option<Timestamp>,
    pub last_modified_by: Option<AuditAuthor>,
}

impl Audit {
    /// Audit for a freshly created row.
    pub fn created(at: Timestamp, by: AuditAuthor) -> Self {
        Self {
            created_at: at,
            created_by: by,
            last_modified_at: None,
            last_modified_by: None,
        }
    }
}

/// Capability implemented by every entity that carries an [`Audit`].
pub trait HasAudit {
    fn audit(&self) -> &Audit;

    fn created_at(&self) -> Timestamp {
        self.audit().created_at
    }

    /// Last modification time, or creation time if never modified.
    fn updated_at(&self) -> Timestamp {
        let audit = self.audit();
        audit.last_modified_at.unwrap_or(audit.created_at)
    }
}
