//! In-memory repository fakes for service tests

use haven_core::{
    models::{
        CallEventUpdate, CallRecord, CallStatus, NewPost, NewRecording, Platform, PostStatus,
        RecordingEntry, SocialPost,
    },
    traits::{CallLogRepository, PlatformPublisher, PostRepository, RecordingRepository},
    AppError,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

/// In-memory call log store
///
/// Mirrors the SQL merge semantics: status and duration overwrite when
/// present, endpoints only fill nulls. Can hide a pre-seeded record for a
/// number of lookups to simulate replication lag.
pub struct FakeCallLogs {
    records: Mutex<Vec<CallRecord>>,
    next_id: Mutex<i64>,
    lookups: Mutex<u64>,
    hidden: Mutex<Option<(CallRecord, u32)>>,
}

impl FakeCallLogs {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            next_id: Mutex::new(1),
            lookups: Mutex::new(0),
            hidden: Mutex::new(None),
        }
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Number of `find_by_sid` calls observed so far
    pub fn lookup_count(&self) -> u64 {
        *self.lookups.lock()
    }

    /// Seed a record that only becomes visible after `misses` failed
    /// lookups of its identifier.
    pub fn hide_until_miss(&self, record: CallRecord, misses: u32) {
        *self.hidden.lock() = Some((record, misses));
    }

    fn merge(record: &mut CallRecord, update: &CallEventUpdate) {
        if let Some(status) = update.status {
            record.status = status;
            if status.is_terminal() && record.ended_at.is_none() {
                record.ended_at = Some(Utc::now());
            }
        }
        if update.duration_secs.is_some() {
            record.duration_secs = update.duration_secs;
        }
        if record.from_number.is_none() {
            record.from_number = update.from_number.clone();
        }
        if record.to_number.is_none() {
            record.to_number = update.to_number.clone();
        }
        record.updated_at = Utc::now();
    }
}

#[async_trait]
impl CallLogRepository for FakeCallLogs {
    async fn find_by_sid(&self, call_sid: &str) -> Result<Option<CallRecord>, AppError> {
        *self.lookups.lock() += 1;

        let mut hidden = self.hidden.lock();
        if let Some((record, misses)) = hidden.as_mut() {
            if record.call_sid == call_sid {
                if *misses == 0 {
                    let found = record.clone();
                    let surfaced = hidden.take().map(|(r, _)| r);
                    drop(hidden);
                    if let Some(r) = surfaced {
                        self.records.lock().push(r);
                    }
                    return Ok(Some(found));
                }
                *misses -= 1;
                return Ok(None);
            }
        }
        drop(hidden);

        Ok(self
            .records
            .lock()
            .iter()
            .find(|r| r.call_sid == call_sid)
            .cloned())
    }

    async fn upsert_event(&self, update: &CallEventUpdate) -> Result<CallRecord, AppError> {
        let mut records = self.records.lock();
        if let Some(record) = records.iter_mut().find(|r| r.call_sid == update.call_sid) {
            Self::merge(record, update);
            return Ok(record.clone());
        }

        let mut next_id = self.next_id.lock();
        let record = CallRecord {
            id: *next_id,
            call_sid: update.call_sid.clone(),
            from_number: update.from_number.clone(),
            to_number: update.to_number.clone(),
            status: update.status.unwrap_or(CallStatus::Unknown),
            duration_secs: update.duration_secs,
            ..Default::default()
        };
        *next_id += 1;
        records.push(record.clone());
        Ok(record)
    }

    async fn apply_update(
        &self,
        update: &CallEventUpdate,
    ) -> Result<Option<CallRecord>, AppError> {
        let mut records = self.records.lock();
        match records.iter_mut().find(|r| r.call_sid == update.call_sid) {
            Some(record) => {
                Self::merge(record, update);
                Ok(Some(record.clone()))
            }
            None => Ok(None),
        }
    }

    async fn list(
        &self,
        status: Option<CallStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<CallRecord>, i64), AppError> {
        let records = self.records.lock();
        let filtered: Vec<CallRecord> = records
            .iter()
            .filter(|r| status.map(|s| r.status == s).unwrap_or(true))
            .cloned()
            .collect();
        let total = filtered.len() as i64;
        let page = filtered
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();
        Ok((page, total))
    }
}

/// In-memory recording store
pub struct FakeRecordings {
    entries: Mutex<Vec<RecordingEntry>>,
    next_id: Mutex<i64>,
}

impl FakeRecordings {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            next_id: Mutex::new(1),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn first(&self) -> Option<RecordingEntry> {
        self.entries.lock().first().cloned()
    }
}

#[async_trait]
impl RecordingRepository for FakeRecordings {
    async fn find_by_call(&self, call_id: i64) -> Result<Option<RecordingEntry>, AppError> {
        Ok(self
            .entries
            .lock()
            .iter()
            .find(|e| e.call_id == call_id)
            .cloned())
    }

    async fn insert(&self, recording: &NewRecording) -> Result<RecordingEntry, AppError> {
        let mut entries = self.entries.lock();
        if entries.iter().any(|e| e.call_id == recording.call_id) {
            return Err(AppError::AlreadyExists(format!(
                "recording for call {}",
                recording.call_id
            )));
        }

        let mut next_id = self.next_id.lock();
        let now = Utc::now();
        let entry = RecordingEntry {
            id: *next_id,
            recording_sid: recording.recording_sid.clone(),
            call_id: recording.call_id,
            url: recording.url.clone(),
            duration_secs: recording.duration_secs,
            consent: false,
            processing: false,
            created_at: now,
            updated_at: now,
        };
        *next_id += 1;
        entries.push(entry.clone());
        Ok(entry)
    }

    async fn update_for_call(
        &self,
        call_id: i64,
        recording_sid: &str,
        url: &str,
        duration_secs: Option<i32>,
    ) -> Result<RecordingEntry, AppError> {
        let mut entries = self.entries.lock();
        let entry = entries
            .iter_mut()
            .find(|e| e.call_id == call_id)
            .ok_or_else(|| AppError::NotFound(format!("recording for call {}", call_id)))?;

        entry.recording_sid = recording_sid.to_string();
        entry.url = url.to_string();
        if duration_secs.is_some() {
            entry.duration_secs = duration_secs;
        }
        entry.updated_at = Utc::now();
        Ok(entry.clone())
    }
}

/// In-memory post store
pub struct FakePosts {
    posts: Mutex<Vec<SocialPost>>,
    next_id: Mutex<i64>,
}

impl FakePosts {
    pub fn new() -> Self {
        Self {
            posts: Mutex::new(Vec::new()),
            next_id: Mutex::new(1),
        }
    }

    pub fn get(&self, id: i64) -> Option<SocialPost> {
        self.posts.lock().iter().find(|p| p.id == id).cloned()
    }
}

#[async_trait]
impl PostRepository for FakePosts {
    async fn create(&self, post: &NewPost) -> Result<SocialPost, AppError> {
        let mut posts = self.posts.lock();
        let mut next_id = self.next_id.lock();
        let stored = SocialPost {
            id: *next_id,
            content: post.content.clone(),
            media_urls: post.media_urls.clone(),
            platforms: post.platforms.clone(),
            status: post.initial_status(),
            scheduled_at: post.scheduled_at,
            ..Default::default()
        };
        *next_id += 1;
        posts.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<SocialPost>, AppError> {
        Ok(self.get(id))
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<(Vec<SocialPost>, i64), AppError> {
        let posts = self.posts.lock();
        let total = posts.len() as i64;
        let mut page: Vec<SocialPost> = posts.clone();
        page.reverse();
        let page = page
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();
        Ok((page, total))
    }

    async fn find_due(&self, now: DateTime<Utc>) -> Result<Vec<SocialPost>, AppError> {
        Ok(self
            .posts
            .lock()
            .iter()
            .filter(|p| p.is_due(now))
            .cloned()
            .collect())
    }

    async fn mark_published(
        &self,
        id: i64,
        published_at: DateTime<Utc>,
    ) -> Result<SocialPost, AppError> {
        let mut posts = self.posts.lock();
        let post = posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| AppError::PostNotFound(id.to_string()))?;

        post.status = PostStatus::Published;
        post.published_at = Some(published_at);
        post.updated_at = Utc::now();
        Ok(post.clone())
    }
}

/// Publisher fake recording every attempt; named platforms fail
pub struct RecordingPublisher {
    pub attempts: Mutex<Vec<(Platform, i64)>>,
    failing: Vec<Platform>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self {
            attempts: Mutex::new(Vec::new()),
            failing: Vec::new(),
        }
    }

    pub fn failing_on(platforms: Vec<Platform>) -> Self {
        Self {
            attempts: Mutex::new(Vec::new()),
            failing: platforms,
        }
    }

    pub fn attempt_count(&self) -> usize {
        self.attempts.lock().len()
    }
}

#[async_trait]
impl PlatformPublisher for RecordingPublisher {
    async fn publish(&self, platform: Platform, post: &SocialPost) -> Result<String, AppError> {
        self.attempts.lock().push((platform, post.id));
        if self.failing.contains(&platform) {
            return Err(AppError::PublishFailed {
                platform: platform.to_string(),
                reason: "simulated outage".to_string(),
            });
        }
        Ok(format!("{}-{}", platform, post.id))
    }
}
