//! Social post models
//!
//! Represents marketing posts targeting one or more social platforms,
//! and the per-platform outcome of a publish attempt.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Supported social platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Facebook,
    Instagram,
    Twitter,
    Linkedin,
}

impl Platform {
    /// Parse a platform name
    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "facebook" => Some(Self::Facebook),
            "instagram" => Some(Self::Instagram),
            "twitter" | "x" => Some(Self::Twitter),
            "linkedin" => Some(Self::Linkedin),
            _ => None,
        }
    }

    /// Storage representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Facebook => "facebook",
            Self::Instagram => "instagram",
            Self::Twitter => "twitter",
            Self::Linkedin => "linkedin",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Post lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    /// Stored without a schedule, publishable on demand
    Draft,
    /// Waiting for its schedule time
    Scheduled,
    /// Fired once; never revisited by the scheduler
    Published,
}

impl PostStatus {
    /// Storage representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Scheduled => "scheduled",
            Self::Published => "published",
        }
    }

    /// Parse a stored status string
    pub fn from_str_or_draft(s: &str) -> Self {
        match s {
            "scheduled" => Self::Scheduled,
            "published" => Self::Published,
            _ => Self::Draft,
        }
    }
}

impl std::fmt::Display for PostStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Social post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialPost {
    /// Unique identifier
    pub id: i64,

    /// Post body
    pub content: String,

    /// Attached media references
    pub media_urls: Vec<String>,

    /// Target platforms
    pub platforms: Vec<Platform>,

    /// Lifecycle status
    pub status: PostStatus,

    /// When the post should fire, if scheduled
    pub scheduled_at: Option<DateTime<Utc>>,

    /// When the post fired
    pub published_at: Option<DateTime<Utc>>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl SocialPost {
    /// Whether the scheduler should fire this post at `now`
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status == PostStatus::Scheduled
            && self.scheduled_at.map(|at| at <= now).unwrap_or(false)
    }
}

impl Default for SocialPost {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            content: String::new(),
            media_urls: Vec::new(),
            platforms: Vec::new(),
            status: PostStatus::Draft,
            scheduled_at: None,
            published_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Post fields for insertion
#[derive(Debug, Clone)]
pub struct NewPost {
    pub content: String,
    pub media_urls: Vec<String>,
    pub platforms: Vec<Platform>,
    pub scheduled_at: Option<DateTime<Utc>>,
}

impl NewPost {
    /// Initial status: scheduled when a schedule time is present, else draft
    pub fn initial_status(&self) -> PostStatus {
        if self.scheduled_at.is_some() {
            PostStatus::Scheduled
        } else {
            PostStatus::Draft
        }
    }
}

/// Outcome of one platform publish attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishOutcome {
    /// Target platform
    pub platform: Platform,

    /// Whether the platform accepted the post
    pub success: bool,

    /// Provider-side post identifier, when accepted
    pub external_id: Option<String>,

    /// Failure reason, when rejected
    pub error: Option<String>,
}

impl PublishOutcome {
    /// Successful publish
    pub fn sent(platform: Platform, external_id: impl Into<String>) -> Self {
        Self {
            platform,
            success: true,
            external_id: Some(external_id.into()),
            error: None,
        }
    }

    /// Failed publish
    pub fn failed(platform: Platform, error: impl Into<String>) -> Self {
        Self {
            platform,
            success: false,
            external_id: None,
            error: Some(error.into()),
        }
    }
}
