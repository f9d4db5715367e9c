//! GeoJSON normalization and the planar geometry the RTU import needs.
//!
//! Partner payloads mix GeoJSON geometry objects, `Feature` wrappers and
//! strings holding serialized GeoJSON. [`GeometryFragment::normalize`] turns
//! any of them into plain [`Geometry`] values. Multi-part and collection
//! types are exploded into their simple parts, so downstream code only ever
//! matches on three variants.
//!
//! Coordinates are `[longitude, latitude]` and handled as planar values,
//! which is accurate enough at municipal scale for containment and hulls.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A `[longitude, latitude]` pair. Extra dimensions are dropped on parse.
pub type Position = [f64; 2];

/// Side length, in degrees, of the square drawn around every vertex when
/// fragments are merged into one polygon (roughly 10 m in Montréal).
pub const MERGE_BUFFER_DEGREES: f64 = 0.0001;

/// Errors raised while normalizing or merging geometry.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("Malformed GeoJSON: {0}")]
    Malformed(String),

    #[error("Unsupported geometry type: {0}")]
    UnsupportedType(String),

    #[error("No geometry to merge")]
    Empty,

    #[error("Merged geometry is degenerate")]
    Degenerate,
}

/// A normalized simple geometry, serialized as a GeoJSON geometry object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Point(Position),
    LineString(Vec<Position>),
    /// Outer ring first, holes after.
    Polygon(Vec<Vec<Position>>),
}

/// A raw geometry fragment as delivered by a partner or a boundary service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GeometryFragment {
    /// A string containing serialized GeoJSON.
    Serialized(String),
    /// An inline GeoJSON object (geometry, `Feature`, or collection).
    Object(Value),
}

impl GeometryFragment {
    /// Normalize this fragment into simple geometries.
    pub fn normalize(&self) -> Result<Vec<Geometry>, GeometryError> {
        match self {
            Self::Serialized(raw) => {
                let value: Value = serde_json::from_str(raw)
                    .map_err(|e| GeometryError::Malformed(e.to_string()))?;
                parse_geojson(&value)
            }
            Self::Object(value) => parse_geojson(value),
        }
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse a GeoJSON value into simple geometries.
///
/// `Feature` is unwrapped, `GeometryCollection` and `Multi*` types are
/// flattened. Rings do not need to be closed.
pub fn parse_geojson(value: &Value) -> Result<Vec<Geometry>, GeometryError> {
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed("missing \"type\""))?;

    match kind {
        "Feature" => {
            let geometry = value
                .get("geometry")
                .filter(|g| !g.is_null())
                .ok_or_else(|| malformed("feature without geometry"))?;
            parse_geojson(geometry)
        }
        "GeometryCollection" => {
            let mut parts = Vec::new();
            let members = value
                .get("geometries")
                .ok_or_else(|| malformed("missing \"geometries\""))?;
            for member in array(members)? {
                parts.extend(parse_geojson(member)?);
            }
            Ok(parts)
        }
        "Point" => Ok(vec![Geometry::Point(position(coordinates(value)?)?)]),
        "MultiPoint" => Ok(positions(coordinates(value)?)?
            .into_iter()
            .map(Geometry::Point)
            .collect()),
        "LineString" => Ok(vec![Geometry::LineString(line(coordinates(value)?)?)]),
        "MultiLineString" => array(coordinates(value)?)?
            .iter()
            .map(|l| line(l).map(Geometry::LineString))
            .collect(),
        "Polygon" => Ok(vec![Geometry::Polygon(polygon(coordinates(value)?)?)]),
        "MultiPolygon" => array(coordinates(value)?)?
            .iter()
            .map(|p| polygon(p).map(Geometry::Polygon))
            .collect(),
        other => Err(GeometryError::UnsupportedType(other.to_string())),
    }
}

fn malformed(reason: &str) -> GeometryError {
    GeometryError::Malformed(reason.to_string())
}

fn coordinates(value: &Value) -> Result<&Value, GeometryError> {
    value
        .get("coordinates")
        .ok_or_else(|| malformed("missing \"coordinates\""))
}

fn array(value: &Value) -> Result<&Vec<Value>, GeometryError> {
    value.as_array().ok_or_else(|| malformed("expected an array"))
}

fn position(value: &Value) -> Result<Position, GeometryError> {
    let items = array(value)?;
    if items.len() < 2 {
        return Err(malformed("position needs two coordinates"));
    }
    let axis = |v: &Value| {
        v.as_f64()
            .filter(|n| n.is_finite())
            .ok_or_else(|| malformed("coordinate is not a finite number"))
    };
    Ok([axis(&items[0])?, axis(&items[1])?])
}

fn positions(value: &Value) -> Result<Vec<Position>, GeometryError> {
    array(value)?.iter().map(position).collect()
}

fn line(value: &Value) -> Result<Vec<Position>, GeometryError> {
    let points = positions(value)?;
    if points.len() < 2 {
        return Err(malformed("line string needs at least two positions"));
    }
    Ok(points)
}

fn polygon(value: &Value) -> Result<Vec<Vec<Position>>, GeometryError> {
    let rings = array(value)?
        .iter()
        .map(|r| {
            let ring = positions(r)?;
            if ring.len() < 3 {
                return Err(malformed("ring needs at least three positions"));
            }
            Ok(ring)
        })
        .collect::<Result<Vec<_>, _>>()?;
    if rings.is_empty() {
        return Err(malformed("polygon without rings"));
    }
    Ok(rings)
}

// ---------------------------------------------------------------------------
// Predicates and measures
// ---------------------------------------------------------------------------

impl Geometry {
    /// Vertices describing the outline: the point itself, the line's
    /// positions, or the polygon's outer ring.
    pub fn outline(&self) -> &[Position] {
        match self {
            Self::Point(p) => std::slice::from_ref(p),
            Self::LineString(points) => points,
            Self::Polygon(rings) => rings.first().map(Vec::as_slice).unwrap_or(&[]),
        }
    }

    /// Whether `point` lies inside this polygon (outside of its holes).
    /// Always `false` for points and lines.
    pub fn contains(&self, point: Position) -> bool {
        match self {
            Self::Polygon(rings) => match rings.split_first() {
                Some((outer, holes)) => {
                    ring_contains(outer, point) && !holes.iter().any(|h| ring_contains(h, point))
                }
                None => false,
            },
            _ => false,
        }
    }

    /// Arithmetic mean of the outline vertices, ignoring a closing duplicate.
    pub fn centroid(&self) -> Option<Position> {
        let mut vertices = self.outline();
        if vertices.len() > 1 && vertices.first() == vertices.last() {
            vertices = &vertices[..vertices.len() - 1];
        }
        if vertices.is_empty() {
            return None;
        }
        let n = vertices.len() as f64;
        let (sx, sy) = vertices
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p[0], sy + p[1]));
        Some([sx / n, sy / n])
    }
}

/// Even-odd ray casting. Works for closed and unclosed rings.
fn ring_contains(ring: &[Position], point: Position) -> bool {
    if ring.len() < 3 {
        return false;
    }
    let [px, py] = point;
    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let [xi, yi] = ring[i];
        let [xj, yj] = ring[j];
        if (yi > py) != (yj > py) && px < (xj - xi) * (py - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

/// Merge geometries into a single closed polygon.
///
/// Every outline vertex is expanded into a square of side
/// [`MERGE_BUFFER_DEGREES`] and the convex hull of all squares is returned,
/// so a lone point or a straight street segment still yields an area.
pub fn merge_into_polygon(parts: &[Geometry]) -> Result<Geometry, GeometryError> {
    let half = MERGE_BUFFER_DEGREES / 2.0;
    let points: Vec<Position> = parts
        .iter()
        .flat_map(|g| g.outline().iter())
        .flat_map(|&[x, y]| {
            [
                [x - half, y - half],
                [x + half, y - half],
                [x + half, y + half],
                [x - half, y + half],
            ]
        })
        .collect();

    if points.is_empty() {
        return Err(GeometryError::Empty);
    }

    let mut hull = convex_hull(points);
    if hull.len() < 3 {
        return Err(GeometryError::Degenerate);
    }
    hull.push(hull[0]);
    Ok(Geometry::Polygon(vec![hull]))
}

/// Andrew's monotone chain; counter-clockwise, without the closing vertex.
fn convex_hull(mut points: Vec<Position>) -> Vec<Position> {
    points.sort_by(|a, b| a[0].total_cmp(&b[0]).then(a[1].total_cmp(&b[1])));
    points.dedup();
    if points.len() < 3 {
        return points;
    }

    let mut lower: Vec<Position> = Vec::with_capacity(points.len());
    for &p in &points {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], p) <= 0.0 {
            lower.pop();
        }
        lower.push(p);
    }

    let mut upper: Vec<Position> = Vec::with_capacity(points.len());
    for &p in points.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], p) <= 0.0 {
            upper.pop();
        }
        upper.push(p);
    }

    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

fn cross(o: Position, a: Position, b: Position) -> f64 {
    (a[0] - o[0]) * (b[1] - o[1]) - (a[1] - o[1]) * (b[0] - o[0])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
