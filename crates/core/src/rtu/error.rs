//! Failure records produced by the RTU import.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Error codes
// ---------------------------------------------------------------------------

/// Classification of one import failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    Forbidden,
    Unexpected,
    EmptyList,
    Invalid,
    InvalidInput,
    MissingValue,
    Taxonomy,
    Delete,
    InsertMany,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Forbidden => "Forbidden",
            Self::Unexpected => "Unexpected",
            Self::EmptyList => "EmptyList",
            Self::Invalid => "Invalid",
            Self::InvalidInput => "InvalidInput",
            Self::MissingValue => "MissingValue",
            Self::Taxonomy => "Taxonomy",
            Self::Delete => "Delete",
            Self::InsertMany => "InsertMany",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Forbidden" => Some(Self::Forbidden),
            "Unexpected" => Some(Self::Unexpected),
            "EmptyList" => Some(Self::EmptyList),
            "Invalid" => Some(Self::Invalid),
            "InvalidInput" => Some(Self::InvalidInput),
            "MissingValue" => Some(Self::MissingValue),
            "Taxonomy" => Some(Self::Taxonomy),
            "Delete" => Some(Self::Delete),
            "InsertMany" => Some(Self::InsertMany),
            _ => None,
        }
    }

    /// All valid code values.
    pub const ALL: &'static [&'static str] = &[
        "Forbidden",
        "Unexpected",
        "EmptyList",
        "Invalid",
        "InvalidInput",
        "MissingValue",
        "Taxonomy",
        "Delete",
        "InsertMany",
    ];
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Targets
// ---------------------------------------------------------------------------

/// Run-level and field-level targets used in [`RtuImportError::target`].
pub mod target {
    pub const SESSION: &str = "Session";
    pub const PROJECTS: &str = "Projects";
    pub const DATABASE: &str = "Database";
    pub const TAXONOMY: &str = "Taxonomy";
    pub const AREAS: &str = "Areas";

    pub const ID: &str = "id";
    pub const NAME: &str = "name";
    pub const AREA_ID: &str = "areaId";
    pub const PARTNER_ID: &str = "partnerId";
    pub const NO_REFERENCE: &str = "noReference";
    pub const STATUS: &str = "status";
    pub const TYPE: &str = "type";
    pub const PHASE: &str = "phase";
    pub const DATE_START: &str = "dateStart";
    pub const DATE_END: &str = "dateEnd";
    pub const DATE_ENTRY: &str = "dateEntry";
    pub const CONTACT: &str = "contact";
    pub const CONTACT_NAME: &str = "contact.name";
    pub const CONTACT_EMAIL: &str = "contact.email";
    pub const PLACES: &str = "places";
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Free-form values attached to an error (offending code, counts, reasons).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorValues {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value1: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value2: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value3: Option<Value>,
}

/// One discrete validation or infrastructure failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RtuImportError {
    pub code: ErrorCode,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<ErrorValues>,
}

impl RtuImportError {
    pub fn new(code: ErrorCode, target: &str) -> Self {
        Self {
            code,
            target: target.to_string(),
            values: None,
        }
    }

    /// Attach `value1`.
    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.values.get_or_insert_with(ErrorValues::default).value1 = Some(value.into());
        self
    }

    /// Attach `value2`.
    pub fn with_value2(mut self, value: impl Into<Value>) -> Self {
        self.values.get_or_insert_with(ErrorValues::default).value2 = Some(value.into());
        self
    }

    /// `value1` if one was attached.
    pub fn value1(&self) -> Option<&Value> {
        self.values.as_ref().and_then(|v| v.value1.as_ref())
    }
}

/// A record that was rejected, with enough identity to find it again in
/// the partner registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RtuProjectError {
    pub project_id: Option<String>,
    pub no_reference: Option<String>,
    pub name: Option<String>,
    pub street_name: Option<String>,
    pub street_from: Option<String>,
    pub street_to: Option<String>,
    pub error_details: Vec<RtuImportError>,
}

impl RtuProjectError {
    /// Targets of every attached error, in order.
    pub fn targets(&self) -> Vec<&str> {
        self.error_details.iter().map(|e| e.target.as_str()).collect()
    }
}
