//! Taxonomy row model.

use sqlx::types::Json;
use sqlx::FromRow;
use workplan_core::taxonomy::{Taxonomy, TaxonomyLabel};
use workplan_core::types::{DbId, Timestamp};

/// A row from the `taxonomies` table.
#[derive(Debug, Clone, FromRow)]
pub struct TaxonomyRow {
    pub id: DbId,
    pub group_name: String,
    pub code: String,
    pub label: Json<TaxonomyLabel>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<TaxonomyRow> for Taxonomy {
    fn from(row: TaxonomyRow) -> Self {
        Self {
            group: row.group_name,
            code: row.code,
            label: row.label.0,
        }
    }
}
