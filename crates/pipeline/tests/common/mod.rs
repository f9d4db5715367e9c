//! In-memory fakes for every pipeline port.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use workplan_core::geometry::{Geometry, GeometryError, GeometryFragment};
use workplan_core::rtu::import_log::ImportLogDraft;
use workplan_core::rtu::project::{ProjectInsert, RtuProject};
use workplan_core::taxonomy::{Taxonomy, TaxonomyGroup, TaxonomyLabel};
use workplan_core::types::DbId;
use workplan_external::info_rtu::{RtuExternalContact, RtuExternalProject, RtuFilter, RtuPlace};
use workplan_external::spatial::BoundaryFeature;
use workplan_pipeline::merger::HullGeometryMerger;
use workplan_pipeline::ports::{
    BoundarySource, GeometryMerger, ImportLogStore, ProjectStore, ReferenceDataError, RtuApi,
    SessionError, StoreError, TaxonomySource,
};
use workplan_pipeline::{ImportOrchestrator, ImportPorts, ImportSettings};

// ---------------------------------------------------------------------------
// Partner API
// ---------------------------------------------------------------------------

/// Serves projects per partner id. Sessions are numbered `s1`, `s2`, ...
#[derive(Default)]
pub struct FakeRtu {
    pub open_error: Mutex<Option<SessionError>>,
    pub projects: Mutex<HashMap<String, Vec<RtuExternalProject>>>,
    /// Filters containing any of these partners are always refused.
    pub forbidden_partners: Mutex<HashSet<String>>,
    /// Listing fails for filters containing any of these partners.
    pub unlisted_partners: Mutex<HashSet<String>>,
    filters: Mutex<HashMap<String, Vec<String>>>,
    pub opened: Mutex<u32>,
}

impl FakeRtu {
    pub fn serve(&self, partner: &str, projects: Vec<RtuExternalProject>) {
        self.projects.lock().unwrap().insert(partner.to_string(), projects);
    }

    pub fn clear(&self) {
        self.projects.lock().unwrap().clear();
    }

    pub fn opened(&self) -> u32 {
        *self.opened.lock().unwrap()
    }
}

#[async_trait]
impl RtuApi for FakeRtu {
    async fn open_session(&self) -> Result<String, SessionError> {
        if let Some(e) = self.open_error.lock().unwrap().clone() {
            return Err(e);
        }
        let mut opened = self.opened.lock().unwrap();
        *opened += 1;
        Ok(format!("s{opened}"))
    }

    async fn set_filter(&self, session_id: &str, filter: &RtuFilter) -> Result<(), SessionError> {
        let forbidden = self.forbidden_partners.lock().unwrap();
        if filter.partner_ids.iter().any(|p| forbidden.contains(p)) {
            return Err(SessionError::Forbidden);
        }
        self.filters
            .lock()
            .unwrap()
            .insert(session_id.to_string(), filter.partner_ids.clone());
        Ok(())
    }

    async fn list_projects(&self, session_id: &str) -> Result<Vec<RtuExternalProject>, SessionError> {
        let partners = self
            .filters
            .lock()
            .unwrap()
            .get(session_id)
            .cloned()
            .ok_or(SessionError::Forbidden)?;
        let unlisted = self.unlisted_partners.lock().unwrap();
        if partners.iter().any(|p| unlisted.contains(p)) {
            return Err(SessionError::Unexpected("listing timed out".to_string()));
        }
        let projects = self.projects.lock().unwrap();
        Ok(partners
            .iter()
            .filter_map(|p| projects.get(p))
            .flatten()
            .cloned()
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Reference data
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeTaxonomies {
    pub groups: Mutex<HashMap<TaxonomyGroup, Vec<Taxonomy>>>,
    pub fail: Mutex<bool>,
}

#[async_trait]
impl TaxonomySource for FakeTaxonomies {
    async fn group(&self, group: TaxonomyGroup) -> Result<Vec<Taxonomy>, ReferenceDataError> {
        if *self.fail.lock().unwrap() {
            return Err(ReferenceDataError("taxonomy store offline".to_string()));
        }
        Ok(self.groups.lock().unwrap().get(&group).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
pub struct FakeBoundaries {
    pub features: Mutex<Vec<BoundaryFeature>>,
    pub fail: Mutex<bool>,
}

#[async_trait]
impl BoundarySource for FakeBoundaries {
    async fn features_by_layer_ids(
        &self,
        _layer_ids: &[String],
    ) -> Result<Vec<BoundaryFeature>, ReferenceDataError> {
        if *self.fail.lock().unwrap() {
            return Err(ReferenceDataError("spatial service offline".to_string()));
        }
        Ok(self.features.lock().unwrap().clone())
    }
}

/// Real hull merger, except that the fragment `"explode"` makes it fail as
/// a remote service would.
pub struct ExplodingMerger;

pub const EXPLODE: &str = "explode";

#[async_trait]
impl GeometryMerger for ExplodingMerger {
    async fn polygon_from_fragments(
        &self,
        fragments: &[GeometryFragment],
    ) -> Result<Geometry, GeometryError> {
        if fragments
            .iter()
            .any(|f| matches!(f, GeometryFragment::Serialized(s) if s == EXPLODE))
        {
            return Err(GeometryError::Malformed("geometry service failure".to_string()));
        }
        HullGeometryMerger.polygon_from_fragments(fragments).await
    }
}

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

/// Mirrors the table constraints: unique id and `date_end >= date_start`.
#[derive(Default)]
pub struct InMemoryProjects {
    pub rows: Mutex<BTreeMap<String, RtuProject>>,
    pub fail_delete: Mutex<bool>,
    pub fail_insert: Mutex<bool>,
}

impl InMemoryProjects {
    pub fn ids(&self) -> Vec<String> {
        self.rows.lock().unwrap().keys().cloned().collect()
    }

    pub fn get(&self, id: &str) -> Option<RtuProject> {
        self.rows.lock().unwrap().get(id).cloned()
    }
}

#[async_trait]
impl ProjectStore for InMemoryProjects {
    async fn delete_all(&self) -> Result<u64, StoreError> {
        if *self.fail_delete.lock().unwrap() {
            return Err(StoreError("delete refused".to_string()));
        }
        let mut rows = self.rows.lock().unwrap();
        let deleted = rows.len() as u64;
        rows.clear();
        Ok(deleted)
    }

    async fn insert_many(&self, projects: &[RtuProject]) -> Result<Vec<ProjectInsert>, StoreError> {
        if *self.fail_insert.lock().unwrap() {
            return Err(StoreError("connection lost".to_string()));
        }
        let mut rows = self.rows.lock().unwrap();
        Ok(projects
            .iter()
            .map(|p| {
                if rows.contains_key(&p.id) {
                    ProjectInsert::rejected(&p.id, "duplicate key")
                } else if p.date_end < p.date_start {
                    ProjectInsert::rejected(&p.id, "date_end before date_start")
                } else {
                    rows.insert(p.id.clone(), p.clone());
                    ProjectInsert::inserted(&p.id)
                }
            })
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryLogs {
    pub logs: Mutex<Vec<ImportLogDraft>>,
}

impl InMemoryLogs {
    pub fn all(&self) -> Vec<ImportLogDraft> {
        self.logs.lock().unwrap().clone()
    }

    pub fn single(&self) -> ImportLogDraft {
        let logs = self.all();
        assert_eq!(logs.len(), 1, "expected exactly one import log");
        logs.into_iter().next().unwrap()
    }
}

#[async_trait]
impl ImportLogStore for InMemoryLogs {
    async fn create(&self, draft: &ImportLogDraft) -> Result<DbId, StoreError> {
        let mut logs = self.logs.lock().unwrap();
        logs.push(draft.clone());
        Ok(logs.len() as DbId)
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

pub const BELL: &str = "BELL";
pub const HQ: &str = "HQ";
pub const ACTIVE: &str = "AC";

/// All fakes plus a seeded reference data set: areas `VM` (Ville-Marie) and
/// `SO` (Le Sud-Ouest), partners `BELL` and `HQ`, status `AC`.
pub struct Harness {
    pub rtu: Arc<FakeRtu>,
    pub taxonomies: Arc<FakeTaxonomies>,
    pub boundaries: Arc<FakeBoundaries>,
    pub projects: Arc<InMemoryProjects>,
    pub logs: Arc<InMemoryLogs>,
}

impl Harness {
    pub fn new() -> Self {
        let taxonomies = FakeTaxonomies::default();
        {
            let mut groups = taxonomies.groups.lock().unwrap();
            groups.insert(
                TaxonomyGroup::Area,
                vec![taxonomy("area", "VM", "Ville-Marie"), taxonomy("area", "SO", "Le Sud-Ouest")],
            );
            groups.insert(
                TaxonomyGroup::RtuPartner,
                vec![taxonomy("rtuPartner", BELL, "Bell"), taxonomy("rtuPartner", HQ, "Hydro-Québec")],
            );
            groups.insert(TaxonomyGroup::RtuStatus, vec![taxonomy("rtuStatus", ACTIVE, "Actif")]);
        }

        let boundaries = FakeBoundaries::default();
        boundaries.features.lock().unwrap().extend([
            square("VM", -73.58, 45.49),
            square("SO", -73.60, 45.46),
        ]);

        Self {
            rtu: Arc::new(FakeRtu::default()),
            taxonomies: Arc::new(taxonomies),
            boundaries: Arc::new(boundaries),
            projects: Arc::new(InMemoryProjects::default()),
            logs: Arc::new(InMemoryLogs::default()),
        }
    }

    pub fn orchestrator(&self) -> ImportOrchestrator {
        self.orchestrator_with(ImportSettings::default())
    }

    pub fn orchestrator_with(&self, settings: ImportSettings) -> ImportOrchestrator {
        ImportOrchestrator::new(
            ImportPorts {
                rtu: self.rtu.clone(),
                taxonomies: self.taxonomies.clone(),
                boundaries: self.boundaries.clone(),
                merger: Arc::new(ExplodingMerger),
                projects: self.projects.clone(),
                logs: self.logs.clone(),
            },
            settings,
        )
    }
}

fn taxonomy(group: &str, code: &str, fr: &str) -> Taxonomy {
    Taxonomy {
        group: group.to_string(),
        code: code.to_string(),
        label: TaxonomyLabel {
            fr: Some(fr.to_string()),
            en: None,
        },
    }
}

/// A 0.02° square boundary with its south-west corner at `(x, y)`.
fn square(code: &str, x: f64, y: f64) -> BoundaryFeature {
    BoundaryFeature {
        admin_area_code: Some(code.to_string()),
        date_debut: None,
        date_fin: None,
        polygons: vec![Geometry::Polygon(vec![vec![
            [x, y],
            [x + 0.02, y],
            [x + 0.02, y + 0.02],
            [x, y + 0.02],
        ]])],
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A partner record that passes every check, located in Ville-Marie.
pub fn valid_record(id: &str, partner: &str) -> RtuExternalProject {
    RtuExternalProject {
        id: Some(id.to_string()),
        name: Some(format!("Travaux {id}")),
        description: Some("Remplacement de conduite".to_string()),
        partner_id: Some(partner.to_string()),
        no_reference: Some(format!("REF-{id}")),
        district: Some("Ville-Marie".to_string()),
        status: Some(ACTIVE.to_string()),
        project_type: Some("Planification".to_string()),
        phase: Some("Réalisation".to_string()),
        date_start: Some(1_777_593_600_000),
        date_end: Some(1_780_272_000_000),
        date_entry: Some(1_775_000_000_000),
        contact: Some(RtuExternalContact {
            name: Some("Marie Gagnon".to_string()),
            email: Some("marie.gagnon@example.com".to_string()),
            ..Default::default()
        }),
        places: vec![RtuPlace {
            geometries: vec![GeometryFragment::Object(
                json!({"type": "LineString", "coordinates": [[-73.575, 45.50], [-73.570, 45.50]]}),
            )],
        }],
        street_name: Some("Rue Sainte-Catherine".to_string()),
        ..Default::default()
    }
}
