//! AreaResolver: maps a record to a local administrative area code.
//!
//! A district name wins when present. Otherwise the record's coordinate is
//! tested against the active boundaries whose code is in the `area`
//! taxonomy.

use std::collections::HashSet;

use chrono::NaiveDate;
use workplan_core::geometry::Position;
use workplan_core::taxonomy::Taxonomy;
use workplan_external::spatial::BoundaryFeature;

use crate::ports::{BoundarySource, ReferenceDataError};

/// Result of resolving one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AreaResolution {
    Resolved(String),
    /// A district was given but matches no area label.
    UnknownDistrict(String),
    /// No district and no enclosing boundary.
    NotFound,
}

pub struct AreaResolver {
    areas: Vec<Taxonomy>,
    boundaries: Vec<ResolvedBoundary>,
}

struct ResolvedBoundary {
    code: String,
    feature: BoundaryFeature,
}

impl AreaResolver {
    /// Keep the boundaries active on `today` whose code is a known area.
    pub fn new(areas: Vec<Taxonomy>, features: Vec<BoundaryFeature>, today: NaiveDate) -> Self {
        let trusted: HashSet<&str> = areas.iter().map(|t| t.code.as_str()).collect();
        let boundaries: Vec<ResolvedBoundary> = features
            .into_iter()
            .filter(|f| f.is_active_on(today))
            .filter_map(|feature| {
                let code = feature.admin_area_code.clone()?;
                trusted
                    .contains(code.as_str())
                    .then_some(ResolvedBoundary { code, feature })
            })
            .collect();

        tracing::debug!(
            areas = areas.len(),
            boundaries = boundaries.len(),
            "Area resolver ready"
        );

        Self { areas, boundaries }
    }

    /// Fetch the boundary layers and build a resolver.
    pub async fn load(
        areas: Vec<Taxonomy>,
        source: &dyn BoundarySource,
        layer_ids: &[String],
        today: NaiveDate,
    ) -> Result<Self, ReferenceDataError> {
        let features = source.features_by_layer_ids(layer_ids).await?;
        Ok(Self::new(areas, features, today))
    }

    /// Every known area code, used to scope the partner filter.
    pub fn area_codes(&self) -> Vec<String> {
        self.areas.iter().map(|t| t.code.clone()).collect()
    }

    pub fn resolve(&self, district: Option<&str>, coordinate: Option<Position>) -> AreaResolution {
        if let Some(district) = district.map(str::trim).filter(|d| !d.is_empty()) {
            return match self.areas.iter().find(|t| t.has_label(district)) {
                Some(area) => AreaResolution::Resolved(area.code.clone()),
                None => AreaResolution::UnknownDistrict(district.to_string()),
            };
        }

        coordinate
            .and_then(|point| self.boundaries.iter().find(|b| b.feature.contains(point)))
            .map(|b| AreaResolution::Resolved(b.code.clone()))
            .unwrap_or(AreaResolution::NotFound)
    }
}
