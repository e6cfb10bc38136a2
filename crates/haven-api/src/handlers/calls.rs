//! Call log handlers

use crate::dto::{ApiResponse, CallFilterParams, CallResponse};
use actix_web::{
    web::{self, Data, Json, Path, Query},
    Result,
};
use haven_core::{
    error::AppError,
    traits::{CallLogRepository, PaginatedResponse, RecordingRepository},
};
use haven_db::repositories::{PgCallLogRepository, PgRecordingRepository};
use sqlx::PgPool;
use tracing::{debug, instrument, warn};
use validator::Validate;

/// List call records with optional status filter
///
/// # Errors
///
/// Returns error if validation or the database query fails.
///
/// # Examples
///
/// ```text
/// GET /api/calls?page=1&per_page=50&status=completed
/// ```
#[instrument(skip(db, query))]
pub async fn list_calls(
    query: Query<CallFilterParams>,
    db: Data<PgPool>,
) -> Result<Json<PaginatedResponse<CallResponse>>> {
    query.validate().map_err(|e| {
        warn!("Invalid query parameters: {}", e);
        AppError::Validation(e.to_string())
    })?;

    debug!(
        "Listing calls: page={}, per_page={}, status={:?}",
        query.pagination.page, query.pagination.per_page, query.status
    );

    let repo = PgCallLogRepository::new(db.get_ref().clone());
    let (calls, total) = repo
        .list(
            query.status_filter(),
            query.pagination.limit(),
            query.pagination.offset(),
        )
        .await?;

    let data: Vec<CallResponse> = calls.into_iter().map(CallResponse::from).collect();
    Ok(Json(query.pagination.paginate(data, total)))
}

/// Get one call record by its provider identifier, recording included
///
/// # Errors
///
/// Returns 404 if no record exists for the identifier.
///
/// # Examples
///
/// ```text
/// GET /api/calls/CA1234567890
/// ```
#[instrument(skip(db))]
pub async fn get_call(
    path: Path<String>,
    db: Data<PgPool>,
) -> Result<Json<ApiResponse<CallResponse>>> {
    let call_sid = path.into_inner();
    debug!("Fetching call: {}", call_sid);

    let calls = PgCallLogRepository::new(db.get_ref().clone());
    let call = calls
        .find_by_sid(&call_sid)
        .await?
        .ok_or(AppError::CallNotFound(call_sid))?;

    let recordings = PgRecordingRepository::new(db.get_ref().clone());
    let recording = recordings.find_by_call(call.id).await?;

    Ok(Json(ApiResponse::success(
        CallResponse::from(call).with_recording(recording),
    )))
}

/// Register call log routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/calls")
            .route("", web::get().to(list_calls))
            .route("/{call_sid}", web::get().to(get_call)),
    );
}
