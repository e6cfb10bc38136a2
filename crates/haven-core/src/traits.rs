//! Common traits for repositories and services
//!
//! Defines abstractions for database access and platform publishing. The
//! in-memory stores of the original system are replaced by these injected
//! repository interfaces; tests substitute in-memory fakes.

use crate::error::AppError;
use crate::models::{
    CallEventUpdate, CallRecord, CallStatus, NewPost, NewRecording, Platform, RecordingEntry,
    SocialPost,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Call log repository
#[async_trait]
pub trait CallLogRepository: Send + Sync {
    /// Find a call record by its provider identifier
    async fn find_by_sid(&self, call_sid: &str) -> Result<Option<CallRecord>, AppError>;

    /// Atomically insert-or-merge a callback carrying both endpoints.
    ///
    /// Merge rules: status and duration overwrite when present; endpoints
    /// only fill null fields. Safe under concurrent deliveries for the
    /// same identifier.
    async fn upsert_event(&self, update: &CallEventUpdate) -> Result<CallRecord, AppError>;

    /// Merge a callback into an existing record only. Returns `None` when
    /// no record exists; never creates one.
    async fn apply_update(&self, update: &CallEventUpdate)
        -> Result<Option<CallRecord>, AppError>;

    /// List call records with optional status filter and pagination
    async fn list(
        &self,
        status: Option<CallStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<CallRecord>, i64), AppError>;
}

/// Call recording repository
#[async_trait]
pub trait RecordingRepository: Send + Sync {
    /// Find the recording attached to a call, if any
    async fn find_by_call(&self, call_id: i64) -> Result<Option<RecordingEntry>, AppError>;

    /// Insert a new recording for a call
    async fn insert(&self, recording: &NewRecording) -> Result<RecordingEntry, AppError>;

    /// Refresh the recording attached to a call (identifier, URL, duration)
    async fn update_for_call(
        &self,
        call_id: i64,
        recording_sid: &str,
        url: &str,
        duration_secs: Option<i32>,
    ) -> Result<RecordingEntry, AppError>;
}

/// Social post repository
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Store a new post (draft or scheduled per its schedule time)
    async fn create(&self, post: &NewPost) -> Result<SocialPost, AppError>;

    /// Find a post by id
    async fn find_by_id(&self, id: i64) -> Result<Option<SocialPost>, AppError>;

    /// List posts with pagination, newest first
    async fn list(&self, limit: i64, offset: i64) -> Result<(Vec<SocialPost>, i64), AppError>;

    /// Scheduled posts whose schedule time has elapsed at `now`
    async fn find_due(&self, now: DateTime<Utc>) -> Result<Vec<SocialPost>, AppError>;

    /// Transition a post to published
    async fn mark_published(
        &self,
        id: i64,
        published_at: DateTime<Utc>,
    ) -> Result<SocialPost, AppError>;
}

/// Platform publishing service
///
/// One implementation per transport; the scheduler only sees this trait.
#[async_trait]
pub trait PlatformPublisher: Send + Sync {
    /// Publish a post to one platform, returning the provider-side post id
    async fn publish(&self, platform: Platform, post: &SocialPost) -> Result<String, AppError>;
}

/// Pagination parameters
#[derive(Debug, Clone, Default)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
}

impl Pagination {
    pub fn new(page: i64, per_page: i64) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, 1000),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }
}

/// Paginated response wrapper
#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, Serialize)]
pub struct PaginationMeta {
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

impl PaginationMeta {
    pub fn new(total: i64, page: i64, per_page: i64) -> Self {
        let total_pages = if per_page > 0 {
            (total + per_page - 1) / per_page
        } else {
            0
        };

        Self {
            total,
            page,
            per_page,
            total_pages,
        }
    }
}
