//! Telephony webhook handler
//!
//! Receives the provider's form-encoded status and recording callbacks.
//! The provider stops retrying a callback once it sees any 2xx, so
//! partial success (including an orphaned recording) still acknowledges
//! with 200; only a missing call identifier (400) or an unrecoverable
//! persistence failure (500) answers otherwise.

use crate::dto::TwilioWebhookForm;
use actix_web::{
    web::{Data, Form},
    HttpResponse,
};
use haven_core::{config::AppConfig, AppError};
use haven_db::repositories::{PgCallLogRepository, PgRecordingRepository};
use haven_services::CallCorrelator;
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument};

/// Handle a provider webhook callback
///
/// # Examples
///
/// ```text
/// POST /api/twilio/webhook
/// CallSid=CA123&CallStatus=completed&CallDuration=42
/// ```
#[instrument(skip(form, db, config))]
pub async fn twilio_webhook(
    form: Form<TwilioWebhookForm>,
    db: Data<PgPool>,
    config: Data<AppConfig>,
) -> HttpResponse {
    let event = match form.into_inner().into_event() {
        Ok(event) => event,
        Err(e) => {
            return HttpResponse::BadRequest().json(json!({
                "error": e.to_string(),
            }));
        }
    };

    let correlator = CallCorrelator::new(
        Arc::new(PgCallLogRepository::new(db.get_ref().clone())),
        Arc::new(PgRecordingRepository::new(db.get_ref().clone())),
        Duration::from_millis(config.webhook.recording_retry_delay_ms),
    );

    match correlator.process(&event).await {
        Ok(outcome) => {
            info!(
                call_sid = %event.call_sid,
                recording_attached = outcome.recording_attached,
                "Webhook processed"
            );
            HttpResponse::Ok().json(json!({ "success": true }))
        }
        // The decode layer already rejected a missing identifier, but the
        // correlator checks it too; answer 400 rather than 500 for parity.
        Err(AppError::MissingField(field)) => HttpResponse::BadRequest().json(json!({
            "error": format!("missing field: {}", field),
        })),
        Err(e) => {
            error!(call_sid = %event.call_sid, error = %e, "Webhook processing failed");
            HttpResponse::InternalServerError().json(json!({
                "error": "webhook processing failed",
            }))
        }
    }
}
