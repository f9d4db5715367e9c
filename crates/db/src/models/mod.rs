//! Row structs for the RTU tables.
//!
//! JSONB columns are decoded through [`sqlx::types::Json`] and converted
//! into the `workplan-core` entities at the repository boundary.

pub mod rtu_import_log;
pub mod rtu_project;
pub mod taxonomy;
