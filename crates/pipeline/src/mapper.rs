//! ProjectMapper: validates a partner record and maps it to an
//! [`RtuProject`], or to an [`RtuProjectError`] listing every problem found.
//!
//! Checks never short-circuit; one record can collect many errors.

use std::collections::HashSet;

use validator::ValidateEmail;
use workplan_core::audit::{Audit, AuditAuthor};
use workplan_core::geometry::{Geometry, GeometryFragment, Position};
use workplan_core::rtu::error::{target, ErrorCode, RtuImportError, RtuProjectError};
use workplan_core::rtu::project::{RtuContactProject, RtuProject};
use workplan_core::types::{timestamp_from_millis, Timestamp};
use workplan_external::info_rtu::{RtuExternalContact, RtuExternalProject, UnreadableField};

use crate::area_resolver::{AreaResolution, AreaResolver};
use crate::ports::GeometryMerger;

/// Reference data and collaborators shared by every record of a run.
pub struct ProjectMapper<'a> {
    pub resolver: &'a AreaResolver,
    pub merger: &'a dyn GeometryMerger,
    pub statuses: &'a HashSet<String>,
    pub partners: &'a HashSet<String>,
    /// Audit timestamp stamped on every mapped project.
    pub now: Timestamp,
}

/// Accumulates errors for one record.
#[derive(Default)]
struct Errors(Vec<RtuImportError>);

impl Errors {
    fn push(&mut self, code: ErrorCode, target: &str) {
        self.0.push(RtuImportError::new(code, target));
    }

    fn push_with(&mut self, code: ErrorCode, target: &str, value: &str) {
        self.0.push(RtuImportError::new(code, target).with_value(value));
    }

    /// `MissingValue`, unless the field was already reported as unreadable.
    fn missing(&mut self, target: &str) {
        if !self.0.iter().any(|e| e.target == target) {
            self.push(ErrorCode::MissingValue, target);
        }
    }

    fn unreadable(&mut self, fields: &[UnreadableField]) {
        for field in fields {
            self.0.push(
                RtuImportError::new(ErrorCode::InvalidInput, &field.field)
                    .with_value(field.value.clone())
                    .with_value2(field.reason.as_str()),
            );
        }
    }

    /// Non-blank string or a `MissingValue` error.
    fn required<'v>(&mut self, value: &'v Option<String>, target: &str) -> Option<&'v str> {
        let value = present(value);
        if value.is_none() {
            self.missing(target);
        }
        value
    }

    /// Epoch-millisecond date: `MissingValue` when absent, `InvalidInput`
    /// when out of range.
    fn required_date(&mut self, millis: Option<i64>, target: &str) -> Option<Timestamp> {
        match millis {
            None => {
                self.missing(target);
                None
            }
            Some(ms) => {
                let date = timestamp_from_millis(ms);
                if date.is_none() {
                    self.push_with(ErrorCode::InvalidInput, target, &ms.to_string());
                }
                date
            }
        }
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn owned(value: &Option<String>) -> Option<String> {
    present(value).map(str::to_string)
}

impl ProjectMapper<'_> {
    pub async fn map(&self, raw: &RtuExternalProject) -> Result<RtuProject, RtuProjectError> {
        let mut errors = Errors::default();
        errors.unreadable(&raw.unreadable);

        let id = errors.required(&raw.id, target::ID);
        let name = errors.required(&raw.name, target::NAME);
        let area_id = self.resolve_area(raw, &mut errors);
        let partner_id = errors.required(&raw.partner_id, target::PARTNER_ID);
        let no_reference = errors.required(&raw.no_reference, target::NO_REFERENCE);
        let status = errors.required(&raw.status, target::STATUS);
        let project_type = errors.required(&raw.project_type, target::TYPE);
        let phase = errors.required(&raw.phase, target::PHASE);
        let date_start = errors.required_date(raw.date_start, target::DATE_START);
        let date_end = errors.required_date(raw.date_end, target::DATE_END);
        let date_entry = errors.required_date(raw.date_entry, target::DATE_ENTRY);
        let contact = validate_contact(raw.contact.as_ref(), &mut errors);
        let geometry = self.merge_places(raw, &mut errors).await;

        if let Some(code) = status.filter(|s| !self.statuses.contains(*s)) {
            errors.push_with(ErrorCode::Taxonomy, target::STATUS, code);
        }
        if let Some(code) = partner_id.filter(|p| !self.partners.contains(*p)) {
            errors.push_with(ErrorCode::Taxonomy, target::PARTNER_ID, code);
        }

        let pin = match (&geometry, raw.coordinate) {
            (_, Some(c)) => Some([c.longitude, c.latitude]),
            (Some(g), None) => g.centroid(),
            (None, None) => None,
        };

        match (
            id, name, area_id, partner_id, no_reference, status, project_type, phase,
            date_start, date_end, date_entry, contact, geometry, pin,
        ) {
            (
                Some(id), Some(name), Some(area_id), Some(partner_id), Some(no_reference),
                Some(status), Some(project_type), Some(phase), Some(date_start), Some(date_end),
                Some(date_entry), Some(contact), Some(geometry), Some(geometry_pin),
            ) if errors.0.is_empty() => Ok(RtuProject {
                id: id.to_string(),
                name: name.to_string(),
                description: owned(&raw.description),
                area_id,
                partner_id: partner_id.to_string(),
                no_reference: no_reference.to_string(),
                geometry,
                geometry_pin,
                status: status.to_string(),
                project_type: project_type.to_string(),
                phase: phase.to_string(),
                conflict: owned(&raw.conflict),
                production_pb: owned(&raw.production_pb),
                duration: owned(&raw.duration),
                district: owned(&raw.district),
                cancellation_reason: owned(&raw.cancellation_reason),
                street_name: owned(&raw.street_name),
                street_from: owned(&raw.street_from),
                street_to: owned(&raw.street_to),
                contact,
                date_start,
                date_end,
                date_entry,
                date_modification: raw.date_modification.and_then(timestamp_from_millis),
                audit: Audit::created(self.now, AuditAuthor::rtu_import()),
            }),
            _ => Err(to_project_error(raw, errors.0)),
        }
    }

    fn resolve_area(&self, raw: &RtuExternalProject, errors: &mut Errors) -> Option<String> {
        let coordinate: Option<Position> = raw.coordinate.map(|c| [c.longitude, c.latitude]);
        match self.resolver.resolve(raw.district.as_deref(), coordinate) {
            AreaResolution::Resolved(code) => Some(code),
            AreaResolution::UnknownDistrict(district) => {
                errors.push_with(ErrorCode::InvalidInput, target::AREA_ID, &district);
                None
            }
            AreaResolution::NotFound => {
                errors.push(ErrorCode::MissingValue, target::AREA_ID);
                None
            }
        }
    }

    async fn merge_places(&self, raw: &RtuExternalProject, errors: &mut Errors) -> Option<Geometry> {
        let fragments: Vec<GeometryFragment> = raw
            .places
            .iter()
            .flat_map(|place| place.geometries.iter().cloned())
            .collect();

        match self.merger.polygon_from_fragments(&fragments).await {
            Ok(geometry) => Some(geometry),
            Err(e) => {
                tracing::debug!(project_id = ?raw.id, error = %e, "RTU places rejected");
                errors.push_with(ErrorCode::InvalidInput, target::PLACES, &e.to_string());
                None
            }
        }
    }
}

fn validate_contact(contact: Option<&RtuExternalContact>, errors: &mut Errors) -> Option<RtuContactProject> {
    let Some(contact) = contact else {
        errors.missing(target::CONTACT);
        return None;
    };

    let name = errors.required(&contact.name, target::CONTACT_NAME);
    let email = errors.required(&contact.email, target::CONTACT_EMAIL);
    let email_ok = match email {
        Some(email) if !email.validate_email() => {
            errors.push_with(ErrorCode::InvalidInput, target::CONTACT_EMAIL, email);
            false
        }
        Some(_) => true,
        None => false,
    };

    (name.is_some() && email_ok).then(|| RtuContactProject {
        id: owned(&contact.id),
        office_id: owned(&contact.office_id),
        num: owned(&contact.num),
        prefix: owned(&contact.prefix),
        name: owned(&contact.name),
        title: owned(&contact.title),
        email: owned(&contact.email),
        phone: owned(&contact.phone),
        phone_extension_number: owned(&contact.phone_extension_number),
        cell: owned(&contact.cell),
        fax: owned(&contact.fax),
        type_notfc: owned(&contact.type_notfc),
        paget: owned(&contact.paget),
        profile: owned(&contact.profile),
        global_role: owned(&contact.global_role),
        id_interim: owned(&contact.id_interim),
        in_charge_id: owned(&contact.in_charge_id),
        partner_type: owned(&contact.partner_type),
        partner_id: owned(&contact.partner_id),
    })
}

fn to_project_error(raw: &RtuExternalProject, error_details: Vec<RtuImportError>) -> RtuProjectError {
    RtuProjectError {
        project_id: owned(&raw.id),
        no_reference: owned(&raw.no_reference),
        name: owned(&raw.name),
        street_name: owned(&raw.street_name),
        street_from: owned(&raw.street_from),
        street_to: owned(&raw.street_to),
        error_details,
    }
}
