//! Repository for the `rtu_projects` mirror table.

use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};
use workplan_core::rtu::project::{ProjectInsert, RtuProject};

use crate::models::rtu_project::RtuProjectRow;

/// Column list for rtu_projects queries.
const COLUMNS: &str = "id, name, description, area_id, partner_id, no_reference, \
    geometry, geometry_pin, status, type, phase, conflict, production_pb, duration, \
    district, cancellation_reason, street_name, street_from, street_to, contact, \
    date_start, date_end, date_entry, date_modification, \
    created_at, created_by, last_modified_at, last_modified_by";

/// Provides the bulk operations used by the import plus simple reads.
pub struct RtuProjectRepo;

impl RtuProjectRepo {
    /// Remove every mirrored project. Returns the number of rows deleted.
    pub async fn delete_all(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM rtu_projects").execute(pool).await?;
        Ok(result.rows_affected())
    }

    /// Insert projects one by one on a single connection, without upsert.
    ///
    /// Each row stands alone: a constraint violation on one project is
    /// reported as [`InsertOutcome::Rejected`](workplan_core::rtu::project::InsertOutcome)
    /// for that project and the remaining rows are still attempted. Any other
    /// error (acquiring the connection, I/O) aborts the whole call.
    pub async fn insert_many(
        pool: &PgPool,
        projects: &[RtuProject],
    ) -> Result<Vec<ProjectInsert>, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        let mut outcomes = Vec::with_capacity(projects.len());

        for project in projects {
            match Self::insert_one(&mut conn, project).await {
                Ok(()) => outcomes.push(ProjectInsert::inserted(&project.id)),
                Err(sqlx::Error::Database(db_err)) => {
                    tracing::debug!(
                        project_id = %project.id,
                        error = %db_err,
                        "RTU project rejected by the database",
                    );
                    outcomes.push(ProjectInsert::rejected(&project.id, db_err.message()));
                }
                Err(e) => return Err(e),
            }
        }

        Ok(outcomes)
    }

    async fn insert_one(conn: &mut PgConnection, p: &RtuProject) -> Result<(), sqlx::Error> {
        let query = format!(
            "INSERT INTO rtu_projects ({COLUMNS})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                     $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, $28)"
        );
        sqlx::query(&query)
            .bind(&p.id)
            .bind(&p.name)
            .bind(&p.description)
            .bind(&p.area_id)
            .bind(&p.partner_id)
            .bind(&p.no_reference)
            .bind(Json(&p.geometry))
            .bind(Json(&p.geometry_pin))
            .bind(&p.status)
            .bind(&p.project_type)
            .bind(&p.phase)
            .bind(&p.conflict)
            .bind(&p.production_pb)
            .bind(&p.duration)
            .bind(&p.district)
            .bind(&p.cancellation_reason)
            .bind(&p.street_name)
            .bind(&p.street_from)
            .bind(&p.street_to)
            .bind(Json(&p.contact))
            .bind(p.date_start)
            .bind(p.date_end)
            .bind(p.date_entry)
            .bind(p.date_modification)
            .bind(p.audit.created_at)
            .bind(Json(&p.audit.created_by))
            .bind(p.audit.last_modified_at)
            .bind(p.audit.last_modified_by.as_ref().map(Json))
            .execute(conn)
            .await?;
        Ok(())
    }

    pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<RtuProject>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM rtu_projects WHERE id = $1");
        let row = sqlx::query_as::<_, RtuProjectRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(RtuProject::from))
    }

    /// All mirrored ids, sorted.
    pub async fn list_ids(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>("SELECT id FROM rtu_projects ORDER BY id")
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*)::BIGINT FROM rtu_projects")
            .fetch_one(pool)
            .await
    }
}
