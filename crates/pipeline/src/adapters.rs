//! Production bindings of the pipeline ports.
//!
//! - [`InfoRtuClient`] as [`RtuApi`]
//! - [`SpatialClient`] as [`BoundarySource`]
//! - [`PgStore`] as taxonomy source, project store and log store

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use workplan_core::rtu::import_log::ImportLogDraft;
use workplan_core::rtu::project::{ProjectInsert, RtuProject};
use workplan_core::taxonomy::{Taxonomy, TaxonomyGroup};
use workplan_core::types::DbId;
use workplan_db::repositories::{RtuImportLogRepo, RtuProjectRepo, TaxonomyRepo};
use workplan_external::info_rtu::{InfoRtuClient, RtuApiError, RtuExternalProject, RtuFilter};
use workplan_external::spatial::{BoundaryFeature, SpatialClient};

use crate::merger::HullGeometryMerger;
use crate::orchestrator::ImportPorts;
use crate::ports::{
    BoundarySource, ImportLogStore, ProjectStore, ReferenceDataError, RtuApi, SessionError,
    StoreError, TaxonomySource,
};

// ---------------------------------------------------------------------------
// Partner API
// ---------------------------------------------------------------------------

impl From<RtuApiError> for SessionError {
    fn from(e: RtuApiError) -> Self {
        if e.is_forbidden() {
            Self::Forbidden
        } else {
            Self::Unexpected(e.to_string())
        }
    }
}

#[async_trait]
impl RtuApi for InfoRtuClient {
    async fn open_session(&self) -> Result<String, SessionError> {
        Ok(InfoRtuClient::open_session(self).await?)
    }

    async fn set_filter(&self, session_id: &str, filter: &RtuFilter) -> Result<(), SessionError> {
        Ok(InfoRtuClient::set_filter(self, session_id, filter).await?)
    }

    async fn list_projects(&self, session_id: &str) -> Result<Vec<RtuExternalProject>, SessionError> {
        Ok(InfoRtuClient::list_projects(self, session_id).await?)
    }
}

// ---------------------------------------------------------------------------
// Boundaries
// ---------------------------------------------------------------------------

#[async_trait]
impl BoundarySource for SpatialClient {
    async fn features_by_layer_ids(
        &self,
        layer_ids: &[String],
    ) -> Result<Vec<BoundaryFeature>, ReferenceDataError> {
        let layer_ids: Vec<&str> = layer_ids.iter().map(String::as_str).collect();
        SpatialClient::features_by_layer_ids(self, &layer_ids)
            .await
            .map_err(|e| ReferenceDataError(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// PostgreSQL
// ---------------------------------------------------------------------------

/// Pool-backed implementation of the storage ports.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaxonomySource for PgStore {
    async fn group(&self, group: TaxonomyGroup) -> Result<Vec<Taxonomy>, ReferenceDataError> {
        TaxonomyRepo::find_by_group(&self.pool, group)
            .await
            .map_err(|e| ReferenceDataError(e.to_string()))
    }
}

#[async_trait]
impl ProjectStore for PgStore {
    async fn delete_all(&self) -> Result<u64, StoreError> {
        Ok(RtuProjectRepo::delete_all(&self.pool).await?)
    }

    async fn insert_many(&self, projects: &[RtuProject]) -> Result<Vec<ProjectInsert>, StoreError> {
        Ok(RtuProjectRepo::insert_many(&self.pool, projects).await?)
    }
}

#[async_trait]
impl ImportLogStore for PgStore {
    async fn create(&self, draft: &ImportLogDraft) -> Result<DbId, StoreError> {
        let log = RtuImportLogRepo::create(&self.pool, draft).await?;
        Ok(log.id)
    }
}

/// Wire every port to its production implementation.
pub fn production_ports(pool: PgPool, rtu: InfoRtuClient, spatial: SpatialClient) -> ImportPorts {
    let store = Arc::new(PgStore::new(pool));
    ImportPorts {
        rtu: Arc::new(rtu),
        taxonomies: store.clone(),
        boundaries: Arc::new(spatial),
        merger: Arc::new(HullGeometryMerger),
        projects: store.clone(),
        logs: store,
    }
}
