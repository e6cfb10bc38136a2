//! Call log DTOs

use crate::dto::common::PaginationParams;
use chrono::{DateTime, Utc};
use haven_core::models::{CallRecord, CallStatus, RecordingEntry};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Query parameters for call log listing
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CallFilterParams {
    /// Pagination
    #[serde(flatten)]
    #[validate(nested)]
    pub pagination: PaginationParams,

    /// Filter by provider status, e.g. `completed`
    pub status: Option<String>,
}

impl CallFilterParams {
    /// Parsed status filter; unrecognized values match nothing rather
    /// than everything, so they surface as an empty result.
    pub fn status_filter(&self) -> Option<CallStatus> {
        self.status
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(CallStatus::from_provider)
    }
}

/// Recording representation in responses
#[derive(Debug, Clone, Serialize)]
pub struct RecordingResponse {
    /// Provider-assigned recording identifier
    pub recording_sid: String,
    /// Storage URL at the provider
    pub url: String,
    /// Recording duration in seconds
    pub duration_secs: Option<i32>,
    /// Whether recording consent was captured
    pub consent: bool,
}

impl From<RecordingEntry> for RecordingResponse {
    fn from(entry: RecordingEntry) -> Self {
        Self {
            recording_sid: entry.recording_sid,
            url: entry.url,
            duration_secs: entry.duration_secs,
            consent: entry.consent,
        }
    }
}

/// Call record representation in responses
#[derive(Debug, Clone, Serialize)]
pub struct CallResponse {
    /// Unique identifier
    pub id: i64,
    /// Provider-assigned call identifier
    pub call_sid: String,
    /// Origin endpoint
    pub from_number: Option<String>,
    /// Destination endpoint
    pub to_number: Option<String>,
    /// Latest provider-reported status
    pub status: CallStatus,
    /// Call duration in seconds
    pub duration_secs: Option<i32>,
    /// Duration formatted as mm:ss
    pub duration_display: String,
    /// When the first callback arrived
    pub started_at: DateTime<Utc>,
    /// When a terminal status was first reported
    pub ended_at: Option<DateTime<Utc>>,
    /// Attached recording, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recording: Option<RecordingResponse>,
}

impl From<CallRecord> for CallResponse {
    fn from(call: CallRecord) -> Self {
        let duration_display = call.formatted_duration();
        Self {
            id: call.id,
            call_sid: call.call_sid,
            from_number: call.from_number,
            to_number: call.to_number,
            status: call.status,
            duration_secs: call.duration_secs,
            duration_display,
            started_at: call.started_at,
            ended_at: call.ended_at,
            recording: None,
        }
    }
}

impl CallResponse {
    /// Attach the call's recording to the response
    pub fn with_recording(mut self, recording: Option<RecordingEntry>) -> Self {
        self.recording = recording.map(RecordingResponse::from);
        self
    }
}
