use chrono::{DateTime, Utc};
use consilium_core::{Job, JobPatch};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::DbError;
use crate::models::JobRow;

#[derive(Clone)]
pub struct JobRepository {
    pool: SqlitePool,
}

impl JobRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, job: &Job) -> Result<Job, DbError> {
        let row = JobRow::from(job);

        sqlx::query(
            r#"
            INSERT INTO jobs (id, status, progress, input, result, error, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&row.id)
        .bind(&row.status)
        .bind(row.progress)
        .bind(&row.input)
        .bind(&row.result)
        .bind(&row.error)
        .bind(row.created_at)
        .bind(row.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(job.clone())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Job>, DbError> {
        let row: Option<JobRow> = sqlx::query_as(
            r#"
            SELECT id, status, progress, input, result, error, created_at, updated_at
            FROM jobs
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_domain()))
    }

    pub async fn find_recent(&self, limit: i64) -> Result<Vec<Job>, DbError> {
        let rows: Vec<JobRow> = sqlx::query_as(
            r#"
            SELECT id, status, progress, input, result, error, created_at, updated_at
            FROM jobs
            ORDER BY created_at DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_domain()).collect())
    }

    /// Applies a partial update. Status changes are validated against the
    /// job lifecycle; a terminal job accepts no further writes. Progress
    /// only ever moves forward.
    pub async fn update(&self, id: Uuid, patch: &JobPatch) -> Result<Option<Job>, DbError> {
        let existing = self.find_by_id(id).await?;
        let Some(mut job) = existing else {
            return Ok(None);
        };

        if job.is_terminal() {
            return Err(DbError::InvalidTransition {
                from: job.status.as_str().to_string(),
                to: patch.status.unwrap_or(job.status).as_str().to_string(),
            });
        }

        if let Some(status) = patch.status {
            if status != job.status && !job.status.can_transition(status) {
                return Err(DbError::InvalidTransition {
                    from: job.status.as_str().to_string(),
                    to: status.as_str().to_string(),
                });
            }
            job.status = status;
        }
        if let Some(progress) = patch.progress {
            job.progress = job.progress.max(progress.min(100));
        }
        if let Some(result) = &patch.result {
            job.result = Some(result.clone());
        }
        if let Some(error) = &patch.error {
            job.error = Some(error.clone());
        }

        job.updated_at = Utc::now();
        let row = JobRow::from(&job);

        sqlx::query(
            r#"
            UPDATE jobs
            SET status = ?, progress = ?, result = ?, error = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&row.status)
        .bind(row.progress)
        .bind(&row.result)
        .bind(&row.error)
        .bind(row.updated_at)
        .bind(&row.id)
        .execute(&self.pool)
        .await?;

        Ok(Some(job))
    }

    /// Removes terminal jobs last touched before the cutoff. Returns the
    /// number of rows deleted.
    pub async fn delete_terminal_before(&self, cutoff: DateTime<Utc>) -> Result<u64, DbError> {
        let result = sqlx::query(
            r#"
            DELETE FROM jobs
            WHERE status IN ('completed', 'failed') AND updated_at < ?
            "#,
        )
        .bind(cutoff.timestamp())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
