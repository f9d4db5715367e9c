//! In-process [`GeometryMerger`].

use async_trait::async_trait;
use workplan_core::geometry::{merge_into_polygon, Geometry, GeometryError, GeometryFragment};

use crate::ports::GeometryMerger;

/// Normalizes every fragment and merges the parts with
/// [`merge_into_polygon`].
#[derive(Debug, Clone, Copy, Default)]
pub struct HullGeometryMerger;

#[async_trait]
impl GeometryMerger for HullGeometryMerger {
    async fn polygon_from_fragments(
        &self,
        fragments: &[GeometryFragment],
    ) -> Result<Geometry, GeometryError> {
        let mut parts = Vec::new();
        for fragment in fragments {
            parts.extend(fragment.normalize()?);
        }
        merge_into_polygon(&parts)
    }
}
