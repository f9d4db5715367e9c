//! The mirrored RTU project entity.
//!
//! The primary key is the partner-assigned project id. The local store
//! never generates ids for these rows.

use serde::{Deserialize, Serialize};

use crate::audit::{Audit, HasAudit};
use crate::geometry::{Geometry, Position};
use crate::rtu::error::{RtuImportError, RtuProjectError};
use crate::types::Timestamp;

/// Contact person attached to an RTU project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RtuContactProject {
    pub id: Option<String>,
    pub office_id: Option<String>,
    pub num: Option<String>,
    pub prefix: Option<String>,
    pub name: Option<String>,
    pub title: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub phone_extension_number: Option<String>,
    pub cell: Option<String>,
    pub fax: Option<String>,
    pub type_notfc: Option<String>,
    pub paget: Option<String>,
    pub profile: Option<String>,
    pub global_role: Option<String>,
    pub id_interim: Option<String>,
    pub in_charge_id: Option<String>,
    pub partner_type: Option<String>,
    pub partner_id: Option<String>,
}

/// A validated local copy of one partner project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RtuProject {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub area_id: String,
    pub partner_id: String,
    pub no_reference: String,
    /// Merged footprint of every place of the project.
    pub geometry: Geometry,
    pub geometry_pin: Position,
    pub status: String,
    #[serde(rename = "type")]
    pub project_type: String,
    pub phase: String,
    pub conflict: Option<String>,
    pub production_pb: Option<String>,
    pub duration: Option<String>,
    pub district: Option<String>,
    pub cancellation_reason: Option<String>,
    pub street_name: Option<String>,
    pub street_from: Option<String>,
    pub street_to: Option<String>,
    pub contact: RtuContactProject,
    pub date_start: Timestamp,
    pub date_end: Timestamp,
    pub date_entry: Timestamp,
    pub date_modification: Option<Timestamp>,
    pub audit: Audit,
}

impl HasAudit for RtuProject {
    fn audit(&self) -> &Audit {
        &self.audit
    }
}

impl RtuProject {
    /// Demote this project to a failure record, e.g. when storage rejects it.
    pub fn to_project_error(&self, error_details: Vec<RtuImportError>) -> RtuProjectError {
        RtuProjectError {
            project_id: Some(self.id.clone()),
            no_reference: Some(self.no_reference.clone()),
            name: Some(self.name.clone()),
            street_name: self.street_name.clone(),
            street_from: self.street_from.clone(),
            street_to: self.street_to.clone(),
            error_details,
        }
    }
}

/// Storage verdict for one project of an insert batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// The store refused the row; carries the storage reason.
    Rejected(String),
}

/// [`InsertOutcome`] keyed by the project it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectInsert {
    pub project_id: String,
    pub outcome: InsertOutcome,
}

impl ProjectInsert {
    pub fn inserted(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            outcome: InsertOutcome::Inserted,
        }
    }

    pub fn rejected(project_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            outcome: InsertOutcome::Rejected(reason.into()),
        }
    }
}
