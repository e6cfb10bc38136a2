//! Telephony webhook DTOs
//!
//! The provider posts form-encoded callbacks with PascalCase field names.
//! Every field except the call identifier is optional; numeric fields
//! arrive as strings.

use haven_core::{
    models::{CallStatus, CallWebhookEvent, RecordingPayload},
    AppError, AppResult,
};
use serde::Deserialize;

/// Raw form payload of a provider webhook callback
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TwilioWebhookForm {
    /// Provider-assigned call identifier
    #[serde(rename = "CallSid")]
    pub call_sid: Option<String>,

    /// Provider-reported call status
    #[serde(rename = "CallStatus")]
    pub call_status: Option<String>,

    /// Origin endpoint
    #[serde(rename = "From")]
    pub from: Option<String>,

    /// Destination endpoint
    #[serde(rename = "To")]
    pub to: Option<String>,

    /// Call duration in seconds, as a string
    #[serde(rename = "CallDuration")]
    pub call_duration: Option<String>,

    /// Provider-assigned recording identifier
    #[serde(rename = "RecordingSid")]
    pub recording_sid: Option<String>,

    /// Recording storage URL
    #[serde(rename = "RecordingUrl")]
    pub recording_url: Option<String>,

    /// Recording duration in seconds, as a string
    #[serde(rename = "RecordingDuration")]
    pub recording_duration: Option<String>,
}

impl TwilioWebhookForm {
    /// Decode into the domain event
    ///
    /// # Errors
    ///
    /// Returns `MissingField` when the call identifier is absent or blank.
    /// Unparseable durations and unknown statuses are tolerated, not
    /// rejected; the provider is not under our control.
    pub fn into_event(self) -> AppResult<CallWebhookEvent> {
        let call_sid = self
            .call_sid
            .filter(|sid| !sid.trim().is_empty())
            .ok_or_else(|| AppError::MissingField("CallSid".to_string()))?;

        // Both URL and identifier are required to carry a recording
        let recording = match (self.recording_sid, self.recording_url) {
            (Some(sid), Some(url)) => Some(RecordingPayload {
                recording_sid: sid,
                url,
                duration_secs: parse_secs(self.recording_duration.as_deref()),
            }),
            _ => None,
        };

        Ok(CallWebhookEvent {
            call_sid,
            status: self.call_status.as_deref().map(CallStatus::from_provider),
            from_number: self.from,
            to_number: self.to,
            duration_secs: parse_secs(self.call_duration.as_deref()),
            recording,
        })
    }
}

fn parse_secs(raw: Option<&str>) -> Option<i32> {
    raw.and_then(|s| s.trim().parse::<i32>().ok())
}
