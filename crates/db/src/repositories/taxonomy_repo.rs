//! Read access to the `taxonomies` table.

use sqlx::PgPool;
use workplan_core::taxonomy::{Taxonomy, TaxonomyGroup};

use crate::models::taxonomy::TaxonomyRow;

const COLUMNS: &str = "id, group_name, code, label, created_at, updated_at";

/// Provides lookups of taxonomy groups.
pub struct TaxonomyRepo;

impl TaxonomyRepo {
    /// All codes of a group, ordered by code.
    pub async fn find_by_group(
        pool: &PgPool,
        group: TaxonomyGroup,
    ) -> Result<Vec<Taxonomy>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM taxonomies WHERE group_name = $1 ORDER BY code");
        let rows = sqlx::query_as::<_, TaxonomyRow>(&query)
            .bind(group.as_str())
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(Taxonomy::from).collect())
    }

    /// Insert or relabel a code. Used by seeding scripts and tests.
    pub async fn upsert(pool: &PgPool, taxonomy: &Taxonomy) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO taxonomies (group_name, code, label)
             VALUES ($1, $2, $3)
             ON CONFLICT (group_name, code)
             DO UPDATE SET label = EXCLUDED.label, updated_at = now()",
        )
        .bind(&taxonomy.group)
        .bind(&taxonomy.code)
        .bind(sqlx::types::Json(&taxonomy.label))
        .execute(pool)
        .await?;
        Ok(())
    }
}
