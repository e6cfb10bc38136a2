//! Call log repository implementation
//!
//! Provides PostgreSQL-backed storage for call records assembled from
//! provider webhook callbacks. Uses runtime queries (not compile-time
//! macros) to avoid requiring a database connection at build time.
//!
//! Creation goes through an atomic `INSERT .. ON CONFLICT` on the unique
//! call identifier so that concurrent deliveries of the same callback
//! cannot race into duplicate rows.

use haven_core::{
    models::{CallEventUpdate, CallRecord, CallStatus},
    traits::CallLogRepository,
    AppError, AppResult,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, error, instrument};

/// PostgreSQL implementation of CallLogRepository
pub struct PgCallLogRepository {
    pool: PgPool,
}

impl PgCallLogRepository {
    /// Create a new call log repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const CALL_SELECT_COLUMNS: &str = r#"
    id, call_sid, from_number, to_number,
    status, duration_secs,
    started_at, ended_at,
    created_at, updated_at
"#;

#[async_trait]
impl CallLogRepository for PgCallLogRepository {
    #[instrument(skip(self))]
    async fn find_by_sid(&self, call_sid: &str) -> AppResult<Option<CallRecord>> {
        debug!("Finding call record by sid: {}", call_sid);

        let query = format!(
            "SELECT {} FROM call_logs WHERE call_sid = $1",
            CALL_SELECT_COLUMNS
        );

        let result = sqlx::query_as::<sqlx::Postgres, CallRow>(&query)
            .bind(call_sid)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding call {}: {}", call_sid, e);
                AppError::Database(format!("Failed to find call record: {}", e))
            })?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self, update))]
    async fn upsert_event(&self, update: &CallEventUpdate) -> AppResult<CallRecord> {
        debug!("Upserting call event for sid: {}", update.call_sid);

        // Status and duration overwrite when present; endpoints only fill
        // null fields. Terminal statuses stamp ended_at once.
        let query = format!(
            r#"
            INSERT INTO call_logs (call_sid, from_number, to_number, status, duration_secs, started_at)
            VALUES ($1, $3, $4, COALESCE($2, 'unknown'), $5, NOW())
            ON CONFLICT (call_sid) DO UPDATE SET
                status = COALESCE($2, call_logs.status),
                duration_secs = COALESCE($5, call_logs.duration_secs),
                from_number = COALESCE(call_logs.from_number, EXCLUDED.from_number),
                to_number = COALESCE(call_logs.to_number, EXCLUDED.to_number),
                ended_at = CASE
                    WHEN $2 IN ('completed', 'busy', 'failed', 'no-answer', 'canceled')
                    THEN COALESCE(call_logs.ended_at, NOW())
                    ELSE call_logs.ended_at
                END,
                updated_at = NOW()
            RETURNING {}
            "#,
            CALL_SELECT_COLUMNS
        );

        let row = sqlx::query_as::<sqlx::Postgres, CallRow>(&query)
            .bind(&update.call_sid)
            .bind(update.status.map(|s| s.as_str()))
            .bind(&update.from_number)
            .bind(&update.to_number)
            .bind(update.duration_secs)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error upserting call {}: {}", update.call_sid, e);
                AppError::Database(format!("Failed to upsert call record: {}", e))
            })?;

        Ok(row.into())
    }

    #[instrument(skip(self, update))]
    async fn apply_update(&self, update: &CallEventUpdate) -> AppResult<Option<CallRecord>> {
        debug!("Applying call update for sid: {}", update.call_sid);

        let query = format!(
            r#"
            UPDATE call_logs SET
                status = COALESCE($2, status),
                duration_secs = COALESCE($5, duration_secs),
                from_number = COALESCE(from_number, $3),
                to_number = COALESCE(to_number, $4),
                ended_at = CASE
                    WHEN $2 IN ('completed', 'busy', 'failed', 'no-answer', 'canceled')
                    THEN COALESCE(ended_at, NOW())
                    ELSE ended_at
                END,
                updated_at = NOW()
            WHERE call_sid = $1
            RETURNING {}
            "#,
            CALL_SELECT_COLUMNS
        );

        let result = sqlx::query_as::<sqlx::Postgres, CallRow>(&query)
            .bind(&update.call_sid)
            .bind(update.status.map(|s| s.as_str()))
            .bind(&update.from_number)
            .bind(&update.to_number)
            .bind(update.duration_secs)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error updating call {}: {}", update.call_sid, e);
                AppError::Database(format!("Failed to update call record: {}", e))
            })?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn list(
        &self,
        status: Option<CallStatus>,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<CallRecord>, i64)> {
        debug!(
            "Listing call records: status={:?}, limit={}, offset={}",
            status, limit, offset
        );

        let (total, rows) = if let Some(status) = status {
            let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM call_logs WHERE status = $1")
                .bind(status.as_str())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    error!("Database error counting call records: {}", e);
                    AppError::Database(format!("Failed to count call records: {}", e))
                })?;

            let query = format!(
                "SELECT {} FROM call_logs WHERE status = $1 ORDER BY started_at DESC LIMIT $2 OFFSET $3",
                CALL_SELECT_COLUMNS
            );
            let rows = sqlx::query_as::<sqlx::Postgres, CallRow>(&query)
                .bind(status.as_str())
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| {
                    error!("Database error fetching call records: {}", e);
                    AppError::Database(format!("Failed to fetch call records: {}", e))
                })?;

            (total, rows)
        } else {
            let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM call_logs")
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    error!("Database error counting call records: {}", e);
                    AppError::Database(format!("Failed to count call records: {}", e))
                })?;

            let query = format!(
                "SELECT {} FROM call_logs ORDER BY started_at DESC LIMIT $1 OFFSET $2",
                CALL_SELECT_COLUMNS
            );
            let rows = sqlx::query_as::<sqlx::Postgres, CallRow>(&query)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| {
                    error!("Database error fetching call records: {}", e);
                    AppError::Database(format!("Failed to fetch call records: {}", e))
                })?;

            (total, rows)
        };

        Ok((rows.into_iter().map(Into::into).collect(), total.0))
    }
}

/// Helper struct for mapping database rows to domain model
#[derive(Debug, sqlx::FromRow)]
struct CallRow {
    id: i64,
    call_sid: String,
    from_number: Option<String>,
    to_number: Option<String>,
    status: String,
    duration_secs: Option<i32>,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CallRow> for CallRecord {
    fn from(row: CallRow) -> Self {
        Self {
            id: row.id,
            call_sid: row.call_sid,
            from_number: row.from_number,
            to_number: row.to_number,
            status: CallStatus::from_provider(&row.status),
            duration_secs: row.duration_secs,
            started_at: row.started_at,
            ended_at: row.ended_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
