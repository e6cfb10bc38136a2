//! Shared response envelope and pagination
//!
//! The admin dashboard pages through call logs and posts with the same
//! two query parameters. Its HTTP client is not consistent about quoting,
//! so numeric parameters accept both `page=2` and `page="2"`.

use haven_core::traits::{PaginatedResponse, PaginationMeta};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Envelope for single-object responses
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    /// Payload
    pub data: T,
    /// Optional human-readable note, omitted from the body when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Wrap a payload
    pub fn success(data: T) -> Self {
        Self {
            data,
            message: None,
        }
    }

    /// Wrap a payload with a note
    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: Some(message.into()),
        }
    }
}

/// Pagination query parameters
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PaginationParams {
    /// Page number (1-indexed)
    #[serde(default = "default_page", deserialize_with = "lenient_i64")]
    #[validate(range(min = 1))]
    pub page: i64,

    /// Items per page
    #[serde(default = "default_per_page", deserialize_with = "lenient_i64")]
    #[validate(range(min = 1, max = 1000))]
    pub per_page: i64,
}

/// Accept an integer whether it arrives as a number or a quoted string
fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum MaybeQuoted {
        Number(i64),
        Text(String),
    }

    match MaybeQuoted::deserialize(deserializer)? {
        MaybeQuoted::Number(n) => Ok(n),
        MaybeQuoted::Text(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

fn default_page() -> i64 {
    1
}

fn default_per_page() -> i64 {
    50
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

impl PaginationParams {
    /// Row offset for the database query
    #[inline]
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }

    /// Row limit for the database query
    #[inline]
    pub fn limit(&self) -> i64 {
        self.per_page
    }

    /// Metadata block for this page of a `total`-row result
    pub fn metadata(&self, total: i64) -> PaginationMeta {
        PaginationMeta::new(total, self.page, self.per_page)
    }

    /// Assemble the paginated response body
    pub fn paginate<T>(&self, data: Vec<T>, total: i64) -> PaginatedResponse<T> {
        PaginatedResponse {
            data,
            pagination: self.metadata(total),
        }
    }
}
