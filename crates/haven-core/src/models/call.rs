//! Call log and recording models
//!
//! Represents telephony call records built up from provider webhook
//! callbacks, and the recordings attached to them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Call status as reported by the telephony provider
///
/// Transitions are driven purely by whatever the provider reports; the
/// backend does not validate transition legality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CallStatus {
    /// No status reported yet
    Unknown,
    /// Call queued at the provider
    Queued,
    /// Destination is ringing
    Ringing,
    /// Call answered and ongoing
    InProgress,
    /// Call ended normally
    Completed,
    /// Destination was busy
    Busy,
    /// Call setup failed
    Failed,
    /// Destination did not answer
    NoAnswer,
    /// Call canceled before connect
    Canceled,
}

impl CallStatus {
    /// Parse a provider-reported status string, falling back to `Unknown`
    /// for anything unrecognized.
    pub fn from_provider(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "queued" => Self::Queued,
            "ringing" => Self::Ringing,
            "in-progress" | "answered" => Self::InProgress,
            "completed" => Self::Completed,
            "busy" => Self::Busy,
            "failed" => Self::Failed,
            "no-answer" => Self::NoAnswer,
            "canceled" => Self::Canceled,
            _ => Self::Unknown,
        }
    }

    /// Storage representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Queued => "queued",
            Self::Ringing => "ringing",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
            Self::Busy => "busy",
            Self::Failed => "failed",
            Self::NoAnswer => "no-answer",
            Self::Canceled => "canceled",
        }
    }

    /// Whether this status ends the call lifecycle
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Busy | Self::Failed | Self::NoAnswer | Self::Canceled
        )
    }
}

impl std::fmt::Display for CallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Call record
///
/// One row per provider call leg, keyed by the opaque provider-assigned
/// call identifier. Created on the first callback referencing its
/// identifier, updated in place by subsequent callbacks, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallRecord {
    /// Unique identifier
    pub id: i64,

    /// Provider-assigned call identifier (unique, immutable)
    pub call_sid: String,

    /// Origin endpoint (caller), if known
    pub from_number: Option<String>,

    /// Destination endpoint (callee), if known
    pub to_number: Option<String>,

    /// Latest provider-reported status
    pub status: CallStatus,

    /// Call duration in seconds, known once the call completes
    pub duration_secs: Option<i32>,

    /// When the first callback for this call arrived
    pub started_at: DateTime<Utc>,

    /// When a terminal status was first reported
    pub ended_at: Option<DateTime<Utc>>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl CallRecord {
    /// Check if both endpoints are known
    #[inline]
    pub fn has_endpoints(&self) -> bool {
        self.from_number.is_some() && self.to_number.is_some()
    }

    /// Check if the call reached a terminal status
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.status.is_terminal()
    }

    /// Get call duration for display
    pub fn formatted_duration(&self) -> String {
        let secs = self.duration_secs.unwrap_or(0);
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }
}

impl Default for CallRecord {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            call_sid: Uuid::new_v4().to_string(),
            from_number: None,
            to_number: None,
            status: CallStatus::Unknown,
            duration_secs: None,
            started_at: now,
            ended_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Field set merged into a call record by one webhook callback
///
/// `status` and `duration_secs` overwrite the stored values when present;
/// `from_number`/`to_number` only fill previously-null fields.
#[derive(Debug, Clone, Default)]
pub struct CallEventUpdate {
    pub call_sid: String,
    pub status: Option<CallStatus>,
    pub from_number: Option<String>,
    pub to_number: Option<String>,
    pub duration_secs: Option<i32>,
}

impl CallEventUpdate {
    /// Whether this update would change anything if merged. Counts every
    /// mergeable field, including duration; compare `triggers_call_update`
    /// on the event, which deliberately does not.
    pub fn has_updates(&self) -> bool {
        self.status.is_some()
            || self.from_number.is_some()
            || self.to_number.is_some()
            || self.duration_secs.is_some()
    }

    /// Whether this callback carries both endpoints, allowing creation
    pub fn has_endpoints(&self) -> bool {
        self.from_number.is_some() && self.to_number.is_some()
    }
}

/// Recording attached to a call
///
/// Exactly one recording per call in this design; a later callback
/// repeating the call refreshes the stored entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingEntry {
    /// Unique identifier
    pub id: i64,

    /// Provider-assigned recording identifier
    pub recording_sid: String,

    /// Owning call record
    pub call_id: i64,

    /// Storage URL at the provider
    pub url: String,

    /// Recording duration in seconds
    pub duration_secs: Option<i32>,

    /// Whether recording consent was captured
    pub consent: bool,

    /// Whether downstream processing (transcription) is pending
    pub processing: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Recording fields for insertion
#[derive(Debug, Clone)]
pub struct NewRecording {
    pub call_id: i64,
    pub recording_sid: String,
    pub url: String,
    pub duration_secs: Option<i32>,
}

/// Recording portion of a webhook callback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingPayload {
    pub recording_sid: String,
    pub url: String,
    pub duration_secs: Option<i32>,
}

/// Decoded webhook callback
///
/// Status and recording portions may arrive together, separately, or out
/// of order across callbacks for the same call identifier.
#[derive(Debug, Clone, Default)]
pub struct CallWebhookEvent {
    pub call_sid: String,
    pub status: Option<CallStatus>,
    pub from_number: Option<String>,
    pub to_number: Option<String>,
    pub duration_secs: Option<i32>,
    pub recording: Option<RecordingPayload>,
}

impl CallWebhookEvent {
    /// The call-level field set of this callback
    pub fn call_update(&self) -> CallEventUpdate {
        CallEventUpdate {
            call_sid: self.call_sid.clone(),
            status: self.status,
            from_number: self.from_number.clone(),
            to_number: self.to_number.clone(),
            duration_secs: self.duration_secs,
        }
    }

    /// Whether this callback should merge into the call record.
    ///
    /// The trigger set is status, origin, and destination. A duration only
    /// rides along with one of those; a callback carrying nothing but a
    /// duration does not touch the record.
    pub fn triggers_call_update(&self) -> bool {
        self.status.is_some() || self.from_number.is_some() || self.to_number.is_some()
    }
}
