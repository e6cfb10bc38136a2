//! Call-webhook correlator
//!
//! Correlates status and recording callbacks that arrive out of order,
//! possibly duplicated, into a single durable call record plus at most one
//! attached recording.
//!
//! Creation is delegated to the repository's atomic upsert, so two
//! concurrent deliveries for the same call identifier cannot race into
//! duplicate rows. A recording that arrives before its call record is
//! visible gets exactly one re-lookup after a short delay; if the record
//! is still missing the recording is logged as orphaned and dropped.

use haven_core::{
    models::{CallRecord, CallWebhookEvent, NewRecording, RecordingPayload},
    traits::{CallLogRepository, RecordingRepository},
    AppError, AppResult,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Result of processing one webhook callback
#[derive(Debug)]
pub struct WebhookOutcome {
    /// The call record touched by this callback, when one was resolved
    pub call: Option<CallRecord>,

    /// Whether a recording was attached or refreshed
    pub recording_attached: bool,

    /// Recording identifier dropped as orphaned, if any
    pub orphaned_recording_sid: Option<String>,
}

/// Call-webhook correlator service
pub struct CallCorrelator<C: CallLogRepository, R: RecordingRepository> {
    calls: Arc<C>,
    recordings: Arc<R>,
    retry_delay: Duration,
}

impl<C: CallLogRepository, R: RecordingRepository> CallCorrelator<C, R> {
    /// Create a new correlator
    ///
    /// `retry_delay` is the wait before the single orphan-recording
    /// re-lookup (zero in tests).
    pub fn new(calls: Arc<C>, recordings: Arc<R>, retry_delay: Duration) -> Self {
        Self {
            calls,
            recordings,
            retry_delay,
        }
    }

    /// Process one decoded webhook callback
    ///
    /// # Errors
    ///
    /// Returns `MissingField` when the call identifier is absent, or a
    /// database error when persistence fails. An orphaned recording is NOT
    /// an error; it is reported in the outcome and logged.
    #[instrument(skip(self, event), fields(call_sid = %event.call_sid))]
    pub async fn process(&self, event: &CallWebhookEvent) -> AppResult<WebhookOutcome> {
        if event.call_sid.is_empty() {
            return Err(AppError::MissingField("CallSid".to_string()));
        }

        let mut call = if event.triggers_call_update() {
            let update = event.call_update();
            if update.has_endpoints() {
                // Both endpoints present: insert-or-merge atomically.
                Some(self.calls.upsert_event(&update).await?)
            } else {
                // Status-only callbacks never create a record.
                let applied = self.calls.apply_update(&update).await?;
                if applied.is_none() {
                    debug!("Status callback for unknown call, nothing to update");
                }
                applied
            }
        } else {
            None
        };

        let mut recording_attached = false;
        let mut orphaned_recording_sid = None;

        if let Some(recording) = &event.recording {
            match self.resolve_owner(&event.call_sid, call.take()).await? {
                Some(owner) => {
                    self.attach_recording(&owner, recording).await?;
                    recording_attached = true;
                    call = Some(owner);
                }
                None => {
                    warn!(
                        recording_sid = %recording.recording_sid,
                        "Orphaned recording: call record not found after retry"
                    );
                    orphaned_recording_sid = Some(recording.recording_sid.clone());
                }
            }
        }

        Ok(WebhookOutcome {
            call,
            recording_attached,
            orphaned_recording_sid,
        })
    }

    /// Resolve the call record owning a recording, retrying the lookup
    /// exactly once to tolerate replication lag.
    async fn resolve_owner(
        &self,
        call_sid: &str,
        known: Option<CallRecord>,
    ) -> AppResult<Option<CallRecord>> {
        if known.is_some() {
            return Ok(known);
        }

        if let Some(call) = self.calls.find_by_sid(call_sid).await? {
            return Ok(Some(call));
        }

        tokio::time::sleep(self.retry_delay).await;
        self.calls.find_by_sid(call_sid).await
    }

    /// Insert or refresh the call's single recording entry
    async fn attach_recording(
        &self,
        owner: &CallRecord,
        recording: &RecordingPayload,
    ) -> AppResult<()> {
        if self.recordings.find_by_call(owner.id).await?.is_some() {
            self.recordings
                .update_for_call(
                    owner.id,
                    &recording.recording_sid,
                    &recording.url,
                    recording.duration_secs,
                )
                .await?;
            info!(
                recording_sid = %recording.recording_sid,
                call_id = owner.id,
                "Recording refreshed"
            );
        } else {
            self.recordings
                .insert(&NewRecording {
                    call_id: owner.id,
                    recording_sid: recording.recording_sid.clone(),
                    url: recording.url.clone(),
                    duration_secs: recording.duration_secs,
                })
                .await?;
            info!(
                recording_sid = %recording.recording_sid,
                call_id = owner.id,
                "Recording attached"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeCallLogs, FakeRecordings};
    use haven_core::models::{CallStatus, RecordingPayload};

    fn correlator(
        calls: Arc<FakeCallLogs>,
        recordings: Arc<FakeRecordings>,
    ) -> CallCorrelator<FakeCallLogs, FakeRecordings> {
        CallCorrelator::new(calls, recordings, Duration::ZERO)
    }

    fn status_event(call_sid: &str, status: CallStatus) -> CallWebhookEvent {
        CallWebhookEvent {
            call_sid: call_sid.to_string(),
            status: Some(status),
            ..Default::default()
        }
    }

    fn create_event(call_sid: &str) -> CallWebhookEvent {
        CallWebhookEvent {
            call_sid: call_sid.to_string(),
            status: Some(CallStatus::Ringing),
            from_number: Some("+15550001111".to_string()),
            to_number: Some("+15550002222".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_missing_call_sid_rejected() {
        let calls = Arc::new(FakeCallLogs::new());
        let recordings = Arc::new(FakeRecordings::new());
        let correlator = correlator(calls.clone(), recordings);

        let event = CallWebhookEvent::default();
        let result = correlator.process(&event).await;

        assert!(matches!(result, Err(AppError::MissingField(_))));
        assert_eq!(calls.len(), 0);
    }

    #[tokio::test]
    async fn test_create_on_first_callback_with_endpoints() {
        let calls = Arc::new(FakeCallLogs::new());
        let recordings = Arc::new(FakeRecordings::new());
        let correlator = correlator(calls.clone(), recordings);

        let outcome = correlator.process(&create_event("CA1")).await.unwrap();

        let call = outcome.call.unwrap();
        assert_eq!(call.call_sid, "CA1");
        assert_eq!(call.status, CallStatus::Ringing);
        assert!(call.has_endpoints());
        assert_eq!(calls.len(), 1);
    }

    #[tokio::test]
    async fn test_status_only_callback_never_creates() {
        let calls = Arc::new(FakeCallLogs::new());
        let recordings = Arc::new(FakeRecordings::new());
        let correlator = correlator(calls.clone(), recordings);

        let outcome = correlator
            .process(&status_event("CA2", CallStatus::Completed))
            .await
            .unwrap();

        assert!(outcome.call.is_none());
        assert_eq!(calls.len(), 0);
    }

    #[tokio::test]
    async fn test_status_overwrites_and_endpoints_fill_nulls_only() {
        let calls = Arc::new(FakeCallLogs::new());
        let recordings = Arc::new(FakeRecordings::new());
        let correlator = correlator(calls.clone(), recordings);

        correlator.process(&create_event("CA3")).await.unwrap();

        // Later callback: new status, a duration, and a different origin.
        let event = CallWebhookEvent {
            call_sid: "CA3".to_string(),
            status: Some(CallStatus::Completed),
            from_number: Some("+15559999999".to_string()),
            to_number: Some("+15550002222".to_string()),
            duration_secs: Some(42),
            ..Default::default()
        };
        let outcome = correlator.process(&event).await.unwrap();

        let call = outcome.call.unwrap();
        assert_eq!(call.status, CallStatus::Completed);
        assert_eq!(call.duration_secs, Some(42));
        // Non-null origin preserved, not overwritten
        assert_eq!(call.from_number.as_deref(), Some("+15550001111"));
        assert_eq!(calls.len(), 1);
    }

    #[tokio::test]
    async fn test_duration_only_callback_leaves_record_untouched() {
        let calls = Arc::new(FakeCallLogs::new());
        let recordings = Arc::new(FakeRecordings::new());
        let correlator = correlator(calls.clone(), recordings);

        correlator.process(&create_event("CA10")).await.unwrap();

        // Duration rides along with status or endpoints; alone it is not
        // part of the update trigger set.
        let event = CallWebhookEvent {
            call_sid: "CA10".to_string(),
            duration_secs: Some(99),
            ..Default::default()
        };
        let outcome = correlator.process(&event).await.unwrap();

        assert!(outcome.call.is_none());
        let stored = correlator.calls.find_by_sid("CA10").await.unwrap().unwrap();
        assert_eq!(stored.duration_secs, None);
    }

    #[tokio::test]
    async fn test_terminal_transitions_accepted_verbatim() {
        let calls = Arc::new(FakeCallLogs::new());
        let recordings = Arc::new(FakeRecordings::new());
        let correlator = correlator(calls.clone(), recordings);

        correlator.process(&create_event("CA4")).await.unwrap();
        correlator
            .process(&status_event("CA4", CallStatus::Completed))
            .await
            .unwrap();

        // completed -> ringing is accepted silently (provider-driven)
        let outcome = correlator
            .process(&status_event("CA4", CallStatus::Ringing))
            .await
            .unwrap();
        assert_eq!(outcome.call.unwrap().status, CallStatus::Ringing);
    }

    #[tokio::test]
    async fn test_recording_attaches_to_existing_call() {
        let calls = Arc::new(FakeCallLogs::new());
        let recordings = Arc::new(FakeRecordings::new());
        let correlator = correlator(calls.clone(), recordings.clone());

        correlator.process(&create_event("CA5")).await.unwrap();

        let event = CallWebhookEvent {
            call_sid: "CA5".to_string(),
            recording: Some(RecordingPayload {
                recording_sid: "RE1".to_string(),
                url: "https://api.example.com/recordings/RE1".to_string(),
                duration_secs: Some(30),
            }),
            ..Default::default()
        };
        let outcome = correlator.process(&event).await.unwrap();

        assert!(outcome.recording_attached);
        assert!(outcome.orphaned_recording_sid.is_none());
        assert_eq!(recordings.len(), 1);
    }

    #[tokio::test]
    async fn test_repeated_recording_callback_updates_in_place() {
        let calls = Arc::new(FakeCallLogs::new());
        let recordings = Arc::new(FakeRecordings::new());
        let correlator = correlator(calls.clone(), recordings.clone());

        correlator.process(&create_event("CA6")).await.unwrap();

        let mut event = CallWebhookEvent {
            call_sid: "CA6".to_string(),
            recording: Some(RecordingPayload {
                recording_sid: "RE2".to_string(),
                url: "https://api.example.com/recordings/RE2".to_string(),
                duration_secs: None,
            }),
            ..Default::default()
        };
        correlator.process(&event).await.unwrap();

        event.recording = Some(RecordingPayload {
            recording_sid: "RE2".to_string(),
            url: "https://api.example.com/recordings/RE2".to_string(),
            duration_secs: Some(61),
        });
        correlator.process(&event).await.unwrap();

        assert_eq!(recordings.len(), 1);
        let stored = recordings.first().unwrap();
        assert_eq!(stored.duration_secs, Some(61));
    }

    #[tokio::test]
    async fn test_recording_before_call_retries_once_then_orphans() {
        let calls = Arc::new(FakeCallLogs::new());
        let recordings = Arc::new(FakeRecordings::new());
        let correlator = correlator(calls.clone(), recordings.clone());

        let event = CallWebhookEvent {
            call_sid: "CA7".to_string(),
            recording: Some(RecordingPayload {
                recording_sid: "RE3".to_string(),
                url: "https://api.example.com/recordings/RE3".to_string(),
                duration_secs: Some(10),
            }),
            ..Default::default()
        };
        let outcome = correlator.process(&event).await.unwrap();

        assert!(!outcome.recording_attached);
        assert_eq!(outcome.orphaned_recording_sid.as_deref(), Some("RE3"));
        // Initial lookup plus exactly one retry
        assert_eq!(calls.lookup_count(), 2);
        // Orphaned recording is never persisted
        assert_eq!(recordings.len(), 0);
    }

    #[tokio::test]
    async fn test_recording_attached_when_call_appears_within_retry_window() {
        let calls = Arc::new(FakeCallLogs::new());
        let recordings = Arc::new(FakeRecordings::new());
        let correlator = correlator(calls.clone(), recordings.clone());

        // Call record becomes visible only after the first missed lookup,
        // simulating replication lag.
        calls.hide_until_miss(
            CallRecord {
                id: 99,
                call_sid: "CA8".to_string(),
                from_number: Some("+15550001111".to_string()),
                to_number: Some("+15550002222".to_string()),
                status: CallStatus::Completed,
                ..Default::default()
            },
            1,
        );

        let event = CallWebhookEvent {
            call_sid: "CA8".to_string(),
            recording: Some(RecordingPayload {
                recording_sid: "RE4".to_string(),
                url: "https://api.example.com/recordings/RE4".to_string(),
                duration_secs: Some(15),
            }),
            ..Default::default()
        };
        let outcome = correlator.process(&event).await.unwrap();

        assert!(outcome.recording_attached);
        assert_eq!(recordings.len(), 1);
        assert_eq!(recordings.first().unwrap().call_id, 99);
    }
}
