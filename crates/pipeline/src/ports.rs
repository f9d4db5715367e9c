//! Traits for everything the pipeline talks to.

use async_trait::async_trait;
use workplan_core::geometry::{Geometry, GeometryError, GeometryFragment};
use workplan_core::rtu::error::{target, ErrorCode, RtuImportError};
use workplan_core::rtu::import_log::ImportLogDraft;
use workplan_core::rtu::project::{ProjectInsert, RtuProject};
use workplan_core::taxonomy::{Taxonomy, TaxonomyGroup};
use workplan_core::types::DbId;
use workplan_external::info_rtu::{RtuExternalProject, RtuFilter};
use workplan_external::spatial::BoundaryFeature;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure of a partner session call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    /// Bad credentials or an expired session.
    #[error("Partner refused the session")]
    Forbidden,

    /// Transport failure or an application-level status other than `OK`.
    #[error("Unexpected partner response: {0}")]
    Unexpected(String),
}

impl SessionError {
    /// Aggregate error recorded when the session cannot be opened.
    pub fn to_import_error(&self) -> RtuImportError {
        match self {
            Self::Forbidden => RtuImportError::new(ErrorCode::Forbidden, target::SESSION),
            Self::Unexpected(reason) => {
                RtuImportError::new(ErrorCode::Unexpected, target::SESSION).with_value(reason.as_str())
            }
        }
    }
}

/// Taxonomies or boundaries could not be loaded.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Reference data unavailable: {0}")]
pub struct ReferenceDataError(pub String);

/// A storage call failed as a whole.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Storage failure: {0}")]
pub struct StoreError(pub String);

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        Self(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// Ports
// ---------------------------------------------------------------------------

/// The partner registry's session protocol.
#[async_trait]
pub trait RtuApi: Send + Sync {
    async fn open_session(&self) -> Result<String, SessionError>;

    async fn set_filter(&self, session_id: &str, filter: &RtuFilter) -> Result<(), SessionError>;

    async fn list_projects(&self, session_id: &str) -> Result<Vec<RtuExternalProject>, SessionError>;
}

#[async_trait]
pub trait TaxonomySource: Send + Sync {
    async fn group(&self, group: TaxonomyGroup) -> Result<Vec<Taxonomy>, ReferenceDataError>;
}

#[async_trait]
pub trait BoundarySource: Send + Sync {
    async fn features_by_layer_ids(
        &self,
        layer_ids: &[String],
    ) -> Result<Vec<BoundaryFeature>, ReferenceDataError>;
}

/// Builds one polygon out of a project's place fragments.
#[async_trait]
pub trait GeometryMerger: Send + Sync {
    async fn polygon_from_fragments(
        &self,
        fragments: &[GeometryFragment],
    ) -> Result<Geometry, GeometryError>;
}

/// The mirror table.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn delete_all(&self) -> Result<u64, StoreError>;

    /// Unordered insert without upsert. Returns one outcome per project.
    async fn insert_many(&self, projects: &[RtuProject]) -> Result<Vec<ProjectInsert>, StoreError>;
}

/// Append-only run log.
#[async_trait]
pub trait ImportLogStore: Send + Sync {
    async fn create(&self, draft: &ImportLogDraft) -> Result<DbId, StoreError>;
}
