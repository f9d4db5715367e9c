//! Client for the spatial boundary service.
//!
//! Boundaries come back as a GeoJSON `FeatureCollection`. Each feature is
//! reduced to a [`BoundaryFeature`]: its area code, validity window and
//! polygons.

use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use serde_json::Value;
use workplan_core::geometry::{parse_geojson, Geometry, Position};

/// HTTP client for the boundary service.
pub struct SpatialClient {
    client: reqwest::Client,
    api_url: String,
}

/// Errors from the spatial service layer.
#[derive(Debug, thiserror::Error)]
pub enum SpatialApiError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Spatial API error ({status}): {body}")]
    ApiError { status: u16, body: String },
}

/// An administrative boundary with its validity window.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryFeature {
    pub admin_area_code: Option<String>,
    /// Open lower bound when absent.
    pub date_debut: Option<NaiveDate>,
    /// Exclusive upper bound; open when absent.
    pub date_fin: Option<NaiveDate>,
    pub polygons: Vec<Geometry>,
}

impl BoundaryFeature {
    /// Whether `today` falls in `[date_debut, date_fin)`.
    pub fn is_active_on(&self, today: NaiveDate) -> bool {
        self.date_debut.map_or(true, |start| start <= today)
            && self.date_fin.map_or(true, |end| today < end)
    }

    pub fn contains(&self, point: Position) -> bool {
        self.polygons.iter().any(|p| p.contains(point))
    }
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<RawFeature>,
}

#[derive(Debug, Deserialize)]
struct RawFeature {
    geometry: Option<Value>,
    #[serde(default)]
    properties: RawProperties,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawProperties {
    admin_area_code: Option<String>,
    date_debut: Option<String>,
    date_fin: Option<String>,
}

impl SpatialClient {
    pub fn new(api_url: String) -> Self {
        Self::with_client(reqwest::Client::new(), api_url)
    }

    pub fn with_client(client: reqwest::Client, api_url: String) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch every feature of the given layers.
    ///
    /// Features whose geometry cannot be parsed are skipped with a warning.
    pub async fn features_by_layer_ids(
        &self,
        layer_ids: &[&str],
    ) -> Result<Vec<BoundaryFeature>, SpatialApiError> {
        let response = self
            .client
            .get(format!("{}/features", self.api_url))
            .query(&[("layerIds", layer_ids.join(","))])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(SpatialApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        let collection: FeatureCollection = response.json().await?;
        Ok(collection.features.into_iter().filter_map(to_boundary).collect())
    }
}

fn to_boundary(raw: RawFeature) -> Option<BoundaryFeature> {
    let code = raw.properties.admin_area_code.clone();
    let polygons = match raw.geometry.as_ref().map(parse_geojson) {
        Some(Ok(geometries)) => geometries
            .into_iter()
            .filter(|g| matches!(g, Geometry::Polygon(_)))
            .collect(),
        Some(Err(e)) => {
            tracing::warn!(admin_area_code = ?code, error = %e, "Skipping boundary with bad geometry");
            return None;
        }
        None => Vec::new(),
    };

    let window = (
        window_bound(raw.properties.date_debut.as_deref()),
        window_bound(raw.properties.date_fin.as_deref()),
    );
    let (Ok(date_debut), Ok(date_fin)) = window else {
        tracing::warn!(
            admin_area_code = ?code,
            date_debut = ?raw.properties.date_debut,
            date_fin = ?raw.properties.date_fin,
            "Skipping boundary with unreadable validity dates"
        );
        return None;
    };

    Some(BoundaryFeature {
        admin_area_code: code,
        date_debut,
        date_fin,
        polygons,
    })
}

/// Absent or blank is an open bound. Anything else must parse.
fn window_bound(raw: Option<&str>) -> Result<Option<NaiveDate>, &str> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => parse_date(s).map(Some).ok_or(s),
    }
}

/// Accept `YYYY-MM-DD` or a full RFC 3339 timestamp.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn feature(debut: Option<NaiveDate>, fin: Option<NaiveDate>) -> BoundaryFeature {
        BoundaryFeature {
            admin_area_code: Some("SO".to_string()),
            date_debut: debut,
            date_fin: fin,
            polygons: vec![],
        }
    }

    #[test]
    fn activity_window_is_half_open() {
        let today = date(2026, 6, 1);
        assert!(feature(None, None).is_active_on(today));
        assert!(feature(Some(today), None).is_active_on(today));
        assert!(!feature(None, Some(today)).is_active_on(today));
        assert!(feature(Some(date(2020, 1, 1)), Some(date(2030, 1, 1))).is_active_on(today));
        assert!(!feature(Some(date(2027, 1, 1)), None).is_active_on(today));
    }

    #[test]
    fn dates_accept_both_formats() {
        assert_eq!(parse_date("2024-03-01"), Some(date(2024, 3, 1)));
        assert_eq!(parse_date("2024-03-01T05:00:00Z"), Some(date(2024, 3, 1)));
        assert_eq!(parse_date("03/01/2024"), None);
    }

    #[test]
    fn blank_bounds_are_open_and_garbage_is_rejected() {
        assert_eq!(window_bound(None), Ok(None));
        assert_eq!(window_bound(Some("  ")), Ok(None));
        assert_eq!(window_bound(Some("2020-01-01")), Ok(Some(date(2020, 1, 1))));
        assert_eq!(window_bound(Some("2020/01/01")), Err("2020/01/01"));
    }

    #[test]
    fn boundary_with_unreadable_end_date_is_skipped() {
        let collection: FeatureCollection = serde_json::from_value(json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "geometry": {"type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]]},
                    "properties": {"adminAreaCode": "OLD", "dateFin": "2020/01/01"}
                },
                {
                    "type": "Feature",
                    "geometry": {"type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]]},
                    "properties": {"adminAreaCode": "NEW", "dateDebut": "2020-01-01", "dateFin": ""}
                }
            ]
        }))
        .unwrap();

        let boundaries: Vec<_> = collection.features.into_iter().filter_map(to_boundary).collect();
        assert_eq!(boundaries.len(), 1);
        assert_eq!(boundaries[0].admin_area_code.as_deref(), Some("NEW"));
        assert!(boundaries[0].date_fin.is_none());
    }

    #[test]
    fn multipolygon_boundary_is_flattened() {
        let collection: FeatureCollection = serde_json::from_value(json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [
                        [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]],
                        [[[5.0, 5.0], [6.0, 5.0], [6.0, 6.0], [5.0, 6.0]]]
                    ]
                },
                "properties": {"adminAreaCode": "SO", "dateDebut": "2002-01-01"}
            }]
        }))
        .unwrap();

        let boundaries: Vec<_> = collection.features.into_iter().filter_map(to_boundary).collect();
        assert_eq!(boundaries.len(), 1);
        assert_eq!(boundaries[0].polygons.len(), 2);
        assert!(boundaries[0].contains([5.5, 5.5]));
        assert!(!boundaries[0].contains([3.0, 3.0]));
        assert_eq!(boundaries[0].date_fin, None);
    }

    #[test]
    fn bad_geometry_is_skipped() {
        let raw = RawFeature {
            geometry: Some(json!({"type": "Polygon", "coordinates": "nope"})),
            properties: RawProperties::default(),
        };
        assert!(to_boundary(raw).is_none());
    }
}
