//! Wire types of the Info-RTU API (camelCase JSON).

use chrono::NaiveDate;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use workplan_core::geometry::GeometryFragment;

/// Response envelope shared by every endpoint.
#[derive(Debug, Deserialize)]
pub struct RtuEnvelope<T> {
    pub status: Option<String>,
    pub result: Option<T>,
}

impl<T> RtuEnvelope<T> {
    pub fn is_ok(&self) -> bool {
        self.status.as_deref() == Some("OK")
    }
}

/// `result` of `POST /session`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResult {
    pub session_id: Option<String>,
}

/// Criteria attached to a session before listing projects.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RtuFilter {
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub partner_ids: Vec<String>,
    pub area_ids: Vec<String>,
    pub is_conflict: bool,
    pub temporary: bool,
    pub status: Vec<String>,
    #[serde(rename = "type")]
    pub project_type: Vec<String>,
    pub phase: Vec<String>,
    pub organization_ids: Vec<String>,
}

impl RtuFilter {
    /// A filter over `[date_from, date_to]` with every list empty and both
    /// flags set.
    pub fn new(date_from: NaiveDate, date_to: NaiveDate) -> Self {
        Self {
            date_from,
            date_to,
            partner_ids: Vec::new(),
            area_ids: Vec::new(),
            is_conflict: true,
            temporary: true,
            status: Vec::new(),
            project_type: Vec::new(),
            phase: Vec::new(),
            organization_ids: Vec::new(),
        }
    }

    /// Copy of this filter restricted to one batch of partner ids.
    pub fn for_partners(&self, partner_ids: &[String]) -> Self {
        Self {
            partner_ids: partner_ids.to_vec(),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RtuCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// One work location; `geometries` mixes GeoJSON objects and strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RtuPlace {
    #[serde(default)]
    pub geometries: Vec<GeometryFragment>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RtuExternalContact {
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub office_id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub num: Option<String>,
    pub prefix: Option<String>,
    pub name: Option<String>,
    pub title: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub phone_extension_number: Option<String>,
    pub cell: Option<String>,
    pub fax: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub type_notfc: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub paget: Option<String>,
    pub profile: Option<String>,
    pub global_role: Option<String>,
    pub id_interim: Option<String>,
    pub in_charge_id: Option<String>,
    pub partner_type: Option<String>,
    pub partner_id: Option<String>,
}

/// A project exactly as the partner delivers it. Everything is optional
/// because nothing is guaranteed until validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RtuExternalProject {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub production_pb: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub conflict: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub duration: Option<String>,
    pub district: Option<String>,
    /// Owning partner organization code.
    pub partner_id: Option<String>,
    pub no_reference: Option<String>,
    pub coordinate: Option<RtuCoordinate>,
    pub contact: Option<RtuExternalContact>,
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub project_type: Option<String>,
    pub phase: Option<String>,
    /// Epoch milliseconds.
    pub date_start: Option<i64>,
    pub date_end: Option<i64>,
    pub date_entry: Option<i64>,
    pub date_modification: Option<i64>,
    pub places: Vec<RtuPlace>,
    pub cancellation_reason: Option<String>,
    pub street_name: Option<String>,
    pub street_from: Option<String>,
    pub street_to: Option<String>,
    /// Top-level fields present in the payload that could not be read.
    #[serde(skip)]
    pub unreadable: Vec<UnreadableField>,
}

/// A partner field dropped while reading a record.
#[derive(Debug, Clone, PartialEq)]
pub struct UnreadableField {
    /// Wire name of the field (`dateStart`, `coordinate`, ...).
    pub field: String,
    pub value: Value,
    pub reason: String,
}

impl RtuExternalProject {
    /// Read one listed record without letting a malformed field discard
    /// the rest of it.
    ///
    /// Fields that do not deserialize are left unset and reported in
    /// [`Self::unreadable`]. A payload that is not an object yields an
    /// empty record with a single `project` entry.
    pub fn from_listing(value: Value) -> Self {
        let object = match value {
            Value::Object(object) => object,
            other => {
                return Self {
                    unreadable: vec![UnreadableField {
                        field: "project".to_string(),
                        reason: "expected an object".to_string(),
                        value: other,
                    }],
                    ..Default::default()
                }
            }
        };

        let mut readable = serde_json::Map::new();
        let mut unreadable = Vec::new();
        for (field, value) in object {
            let single = serde_json::Map::from_iter([(field.clone(), value.clone())]);
            match serde_json::from_value::<Self>(Value::Object(single)) {
                Ok(_) => {
                    readable.insert(field, value);
                }
                Err(e) => unreadable.push(UnreadableField {
                    field,
                    value,
                    reason: e.to_string(),
                }),
            }
        }

        let mut project: Self = serde_json::from_value(Value::Object(readable)).unwrap_or_default();
        project.unreadable = unreadable;
        project
    }
}

/// Optional text that partners sometimes send as a boolean or a number.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "expected a string, boolean or number, got {other}"
        ))),
    }
}
