//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod rtu_import_log_repo;
pub mod rtu_project_repo;
pub mod taxonomy_repo;

pub use rtu_import_log_repo::RtuImportLogRepo;
pub use rtu_project_repo::RtuProjectRepo;
pub use taxonomy_repo::TaxonomyRepo;
