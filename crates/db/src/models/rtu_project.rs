//! RTU project row model.

use sqlx::types::Json;
use sqlx::FromRow;
use workplan_core::audit::{Audit, AuditAuthor};
use workplan_core::geometry::{Geometry, Position};
use workplan_core::rtu::project::{RtuContactProject, RtuProject};
use workplan_core::types::Timestamp;

/// A row from the `rtu_projects` table.
#[derive(Debug, Clone, FromRow)]
pub struct RtuProjectRow {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub area_id: String,
    pub partner_id: String,
    pub no_reference: String,
    pub geometry: Json<Geometry>,
    pub geometry_pin: Json<Position>,
    pub status: String,
    #[sqlx(rename = "type")]
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
    pub contact: Json<RtuContactProject>,
    pub date_start: Timestamp,
    pub date_end: Timestamp,
    pub date_entry: Timestamp,
    pub date_modification: Option<Timestamp>,
    pub created_at: Timestamp,
    pub created_by: Json<AuditAuthor>,
    pub last_modified_at: Option<Timestamp>,
    pub last_modified_by: Option<Json<AuditAuthor>>,
}

impl From<RtuProjectRow> for RtuProject {
    fn from(row: RtuProjectRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            area_id: row.area_id,
            partner_id: row.partner_id,
            no_reference: row.no_reference,
            geometry: row.geometry.0,
            geometry_pin: row.geometry_pin.0,
            status: row.status,
            project_type: row.project_type,
            phase: row.phase,
            conflict: row.conflict,
            production_pb: row.production_pb,
            duration: row.duration,
            district: row.district,
            cancellation_reason: row.cancellation_reason,
            street_name: row.street_name,
            street_from: row.street_from,
            street_to: row.street_to,
            contact: row.contact.0,
            date_start: row.date_start,
            date_end: row.date_end,
            date_entry: row.date_entry,
            date_modification: row.date_modification,
            audit: Audit {
                created_at: row.created_at,
                created_by: row.created_by.0,
                last_modified_at: row.last_modified_at,
                last_modified_by: row.last_modified_by.map(|j| j.0),
            },
        }
    }
}
