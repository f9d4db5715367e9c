//! Local mirror of the RTU ("urban works") partner registry.
//!
//! - [`project`]: the mirrored [`RtuProject`](project::RtuProject) entity.
//! - [`error`]: per-record and run-level failure records.
//! - [`import_log`]: the one-per-run audit record and its derivation rules.

pub mod error;
pub mod import_log;
pub mod project;
