//! ImportOrchestrator: one import run from session to log.
//!
//! ```text
//! OPEN_SESSION -> ABORT(session)
//!              -> REFERENCE DATA -> ABORT(taxonomy | areas)
//!                                -> FETCH -> VALIDATE -> COMMIT -> LOG
//! ```
//!
//! Only the session step reports back to the caller. In background mode
//! the remaining stages run on a spawned task nobody awaits; their outcome
//! is visible only in the import log. Runs are at-most-once: a crashed
//! task is not retried.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use workplan_core::rtu::error::{target, ErrorCode, RtuImportError};
use workplan_core::rtu::import_log::{ImportLogStatus, RunOutcome};
use workplan_core::taxonomy::{code_set, Taxonomy, TaxonomyGroup};
use workplan_core::types::Timestamp;

use crate::area_resolver::AreaResolver;
use crate::committer::ImportCommitter;
use crate::fetcher::ProjectFetcher;
use crate::mapper::ProjectMapper;
use crate::ports::{
    BoundarySource, GeometryMerger, ImportLogStore, ProjectStore, ReferenceDataError, RtuApi,
    SessionError, TaxonomySource,
};
use crate::recorder::ImportLogRecorder;
use crate::session::SessionClient;
use crate::settings::ImportSettings;

/// The collaborators an orchestrator is wired to.
#[derive(Clone)]
pub struct ImportPorts {
    pub rtu: Arc<dyn RtuApi>,
    pub taxonomies: Arc<dyn TaxonomySource>,
    pub boundaries: Arc<dyn BoundarySource>,
    pub merger: Arc<dyn GeometryMerger>,
    pub projects: Arc<dyn ProjectStore>,
    pub logs: Arc<dyn ImportLogStore>,
}

/// What the trigger sees once the session is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportRun {
    /// Blocking run finished with this log status.
    Completed(ImportLogStatus),
    /// Stages were handed to a background task.
    Dispatched,
}

/// Reference data loaded once per run.
struct ReferenceData {
    resolver: AreaResolver,
    partners: Vec<Taxonomy>,
    statuses: HashSet<String>,
}

#[derive(Clone)]
pub struct ImportOrchestrator {
    ports: ImportPorts,
    settings: ImportSettings,
}

impl ImportOrchestrator {
    pub fn new(ports: ImportPorts, settings: ImportSettings) -> Self {
        Self { ports, settings }
    }

    /// Start a run.
    ///
    /// A session failure is logged before returning it. Otherwise the
    /// remaining stages run inline when `blocking`, or on a detached task.
    pub async fn run(&self, blocking: bool) -> Result<ImportRun, SessionError> {
        let started_at = Utc::now();
        let recorder = ImportLogRecorder::new(Arc::clone(&self.ports.logs));
        let mut session = SessionClient::new(Arc::clone(&self.ports.rtu));

        if let Err(e) = session.open().await {
            tracing::error!(error = %e, "RTU import aborted: session could not be opened");
            recorder
                .record(started_at, RunOutcome::SessionFailed(e.to_import_error()))
                .await;
            return Err(e);
        }
        tracing::info!(blocking, "RTU import session opened");

        if blocking {
            let status = self.run_stages(started_at, session).await;
            return Ok(ImportRun::Completed(status));
        }

        let this = self.clone();
        tokio::spawn(async move {
            this.run_stages(started_at, session).await;
        });
        Ok(ImportRun::Dispatched)
    }

    /// Everything after the session: reference data, fetch, validate,
    /// commit, log.
    async fn run_stages(&self, started_at: Timestamp, mut session: SessionClient) -> ImportLogStatus {
        let outcome = self.execute(started_at, &mut session).await;
        ImportLogRecorder::new(Arc::clone(&self.ports.logs))
            .record(started_at, outcome)
            .await
    }

    async fn execute(&self, started_at: Timestamp, session: &mut SessionClient) -> RunOutcome {
        let today = started_at.date_naive();

        let reference = match self.load_reference_data(today).await {
            Ok(reference) => reference,
            Err(error) => {
                tracing::error!(error_target = %error.target, "RTU import aborted: reference data unavailable");
                return RunOutcome::Aborted(error);
            }
        };

        // Fetch
        let fetcher = ProjectFetcher::new(&self.settings);
        let template = fetcher.filter_template(today, &reference.resolver.area_codes());
        let partner_ids: Vec<String> = reference.partners.iter().map(|t| t.code.clone()).collect();
        let raw_projects = fetcher.fetch(session, &template, &partner_ids).await;
        tracing::info!(
            fetched = raw_projects.len(),
            partner_count = partner_ids.len(),
            "RTU projects fetched"
        );

        if raw_projects.is_empty() {
            return RunOutcome::EmptyList;
        }

        // Validate
        let partner_codes = code_set(&reference.partners);
        let mapper = ProjectMapper {
            resolver: &reference.resolver,
            merger: self.ports.merger.as_ref(),
            statuses: &reference.statuses,
            partners: &partner_codes,
            now: Utc::now(),
        };
        let mut valid = Vec::new();
        let mut failed = Vec::new();
        for raw in &raw_projects {
            match mapper.map(raw).await {
                Ok(project) => valid.push(project),
                Err(project_error) => failed.push(project_error),
            }
        }
        tracing::info!(valid = valid.len(), failed = failed.len(), "RTU projects validated");

        // Commit
        ImportCommitter::new(Arc::clone(&self.ports.projects))
            .commit(valid, failed)
            .await
    }

    async fn load_reference_data(&self, today: NaiveDate) -> Result<ReferenceData, RtuImportError> {
        let taxonomy_error = |e: ReferenceDataError| {
            tracing::warn!(error = %e, "Taxonomy load failed");
            RtuImportError::new(ErrorCode::Unexpected, target::TAXONOMY).with_value(e.0)
        };

        let taxonomies = &self.ports.taxonomies;
        let areas = taxonomies.group(TaxonomyGroup::Area).await.map_err(taxonomy_error)?;
        let partners = taxonomies.group(TaxonomyGroup::RtuPartner).await.map_err(taxonomy_error)?;
        let statuses = taxonomies.group(TaxonomyGroup::RtuStatus).await.map_err(taxonomy_error)?;

        let resolver = AreaResolver::load(
            areas,
            self.ports.boundaries.as_ref(),
            &self.settings.layer_ids(),
            today,
        )
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "Boundary load failed");
            RtuImportError::new(ErrorCode::Unexpected, target::AREAS).with_value(e.0)
        })?;

        Ok(ReferenceData {
            resolver,
            partners,
            statuses: code_set(&statuses),
        })
    }
}
