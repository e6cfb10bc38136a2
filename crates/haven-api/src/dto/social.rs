//! Social post DTOs

use chrono::{DateTime, Utc};
use haven_core::{
    models::{NewPost, Platform, PublishOutcome, SocialPost},
    AppError, AppResult,
};
use haven_services::PostRun;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request body for creating a post
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePostRequest {
    /// Post body
    #[validate(length(min = 1, max = 5000))]
    pub content: String,

    /// Attached media references
    #[serde(default)]
    pub media_urls: Vec<String>,

    /// Target platform names
    #[validate(length(min = 1))]
    pub platforms: Vec<String>,

    /// When the post should fire; absent means draft
    pub scheduled_at: Option<DateTime<Utc>>,
}

impl CreatePostRequest {
    /// Decode into the domain insert payload
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an unrecognized platform name.
    pub fn into_new_post(self) -> AppResult<NewPost> {
        let platforms = self
            .platforms
            .iter()
            .map(|name| {
                Platform::from_name(name)
                    .ok_or_else(|| AppError::InvalidInput(format!("unknown platform: {}", name)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(NewPost {
            content: self.content,
            media_urls: self.media_urls,
            platforms,
            scheduled_at: self.scheduled_at,
        })
    }
}

/// Request body for immediate publishing
#[derive(Debug, Clone, Deserialize)]
pub struct PublishRequest {
    /// Post to publish
    pub post_id: i64,
}

/// Post representation in responses
#[derive(Debug, Clone, Serialize)]
pub struct PostResponse {
    /// Unique identifier
    pub id: i64,
    /// Post body
    pub content: String,
    /// Attached media references
    pub media_urls: Vec<String>,
    /// Target platforms
    pub platforms: Vec<Platform>,
    /// Lifecycle status
    pub status: String,
    /// When the post should fire, if scheduled
    pub scheduled_at: Option<DateTime<Utc>>,
    /// When the post fired
    pub published_at: Option<DateTime<Utc>>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl From<SocialPost> for PostResponse {
    fn from(post: SocialPost) -> Self {
        Self {
            id: post.id,
            content: post.content,
            media_urls: post.media_urls,
            platforms: post.platforms,
            status: post.status.to_string(),
            scheduled_at: post.scheduled_at,
            published_at: post.published_at,
            created_at: post.created_at,
        }
    }
}

/// Per-post result of a scheduler sweep or publish call
#[derive(Debug, Clone, Serialize)]
pub struct PostRunResponse {
    /// Post that was fired
    pub post_id: i64,
    /// Per-platform outcomes
    pub results: Vec<PublishOutcome>,
}

impl From<PostRun> for PostRunResponse {
    fn from(run: PostRun) -> Self {
        Self {
            post_id: run.post_id,
            results: run.results,
        }
    }
}
