//! Repository for the append-only `rtu_import_logs` table.
//!
//! A log is written once at the end of a run and never updated or deleted.

use sqlx::types::Json;
use sqlx::PgPool;
use workplan_core::pagination::{clamp_limit, clamp_offset, DEFAULT_LOG_LIMIT, MAX_LOG_LIMIT};
use workplan_core::rtu::import_log::ImportLogDraft;
use workplan_core::types::DbId;

use crate::models::rtu_import_log::RtuImportLog;

const COLUMNS: &str =
    "id, start_date_time, end_date_time, status, error_detail, failed_projects, created_at";

/// Provides create and read operations for import logs.
pub struct RtuImportLogRepo;

impl RtuImportLogRepo {
    /// Persist a run's log, returning the stored row.
    pub async fn create(pool: &PgPool, draft: &ImportLogDraft) -> Result<RtuImportLog, sqlx::Error> {
        let query = format!(
            "INSERT INTO rtu_import_logs
                (start_date_time, end_date_time, status, error_detail, failed_projects)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RtuImportLog>(&query)
            .bind(draft.start_date_time)
            .bind(draft.end_date_time)
            .bind(draft.status.as_str())
            .bind(draft.error_detail.as_ref().map(Json))
            .bind(Json(&draft.failed_projects))
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<RtuImportLog>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM rtu_import_logs WHERE id = $1");
        sqlx::query_as::<_, RtuImportLog>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List logs, newest first.
    pub async fn list(
        pool: &PgPool,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<RtuImportLog>, sqlx::Error> {
        let limit = clamp_limit(limit, DEFAULT_LOG_LIMIT, MAX_LOG_LIMIT);
        let offset = clamp_offset(offset);
        let query = format!(
            "SELECT {COLUMNS} FROM rtu_import_logs
             ORDER BY start_date_time DESC, id DESC
             LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, RtuImportLog>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*)::BIGINT FROM rtu_import_logs")
            .fetch_one(pool)
            .await
    }
}
