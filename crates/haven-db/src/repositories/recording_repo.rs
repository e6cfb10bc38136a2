//! Call recording repository implementation
//!
//! One recording per call; a repeated recording callback refreshes the
//! stored entry rather than inserting a second one.

use haven_core::{
    models::{NewRecording, RecordingEntry},
    traits::RecordingRepository,
    AppError, AppResult,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, error, instrument};

/// PostgreSQL implementation of RecordingRepository
pub struct PgRecordingRepository {
    pool: PgPool,
}

impl PgRecordingRepository {
    /// Create a new recording repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const RECORDING_SELECT_COLUMNS: &str = r#"
    id, recording_sid, call_id, url,
    duration_secs, consent, processing,
    created_at, updated_at
"#;

#[async_trait]
impl RecordingRepository for PgRecordingRepository {
    #[instrument(skip(self))]
    async fn find_by_call(&self, call_id: i64) -> AppResult<Option<RecordingEntry>> {
        debug!("Finding recording for call: {}", call_id);

        let query = format!(
            "SELECT {} FROM call_recordings WHERE call_id = $1",
            RECORDING_SELECT_COLUMNS
        );

        let result = sqlx::query_as::<sqlx::Postgres, RecordingRow>(&query)
            .bind(call_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding recording for call {}: {}", call_id, e);
                AppError::Database(format!("Failed to find recording: {}", e))
            })?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self, recording))]
    async fn insert(&self, recording: &NewRecording) -> AppResult<RecordingEntry> {
        debug!(
            "Inserting recording {} for call {}",
            recording.recording_sid, recording.call_id
        );

        let query = format!(
            r#"
            INSERT INTO call_recordings (recording_sid, call_id, url, duration_secs, consent, processing)
            VALUES ($1, $2, $3, $4, FALSE, TRUE)
            RETURNING {}
            "#,
            RECORDING_SELECT_COLUMNS
        );

        let row = sqlx::query_as::<sqlx::Postgres, RecordingRow>(&query)
            .bind(&recording.recording_sid)
            .bind(recording.call_id)
            .bind(&recording.url)
            .bind(recording.duration_secs)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error inserting recording: {}", e);
                if e.to_string().contains("unique constraint") {
                    AppError::AlreadyExists(format!(
                        "Recording {} already exists",
                        recording.recording_sid
                    ))
                } else {
                    AppError::Database(format!("Failed to insert recording: {}", e))
                }
            })?;

        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn update_for_call(
        &self,
        call_id: i64,
        recording_sid: &str,
        url: &str,
        duration_secs: Option<i32>,
    ) -> AppResult<RecordingEntry> {
        debug!("Updating recording for call: {}", call_id);

        let query = format!(
            r#"
            UPDATE call_recordings SET
                recording_sid = $2,
                url = $3,
                duration_secs = COALESCE($4, duration_secs),
                updated_at = NOW()
            WHERE call_id = $1
            RETURNING {}
            "#,
            RECORDING_SELECT_COLUMNS
        );

        let row = sqlx::query_as::<sqlx::Postgres, RecordingRow>(&query)
            .bind(call_id)
            .bind(recording_sid)
            .bind(url)
            .bind(duration_secs)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error updating recording for call {}: {}", call_id, e);
                AppError::Database(format!("Failed to update recording: {}", e))
            })?;

        Ok(row.into())
    }
}

/// Helper struct for mapping database rows to domain model
#[derive(Debug, sqlx::FromRow)]
struct RecordingRow {
    id: i64,
    recording_sid: String,
    call_id: i64,
    url: String,
    duration_secs: Option<i32>,
    consent: bool,
    processing: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<RecordingRow> for RecordingEntry {
    fn from(row: RecordingRow) -> Self {
        Self {
            id: row.id,
            recording_sid: row.recording_sid,
            call_id: row.call_id,
            url: row.url,
            duration_secs: row.duration_secs,
            consent: row.consent,
            processing: row.processing,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
