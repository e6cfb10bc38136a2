//! Social post repository implementation
//!
//! Durable storage for scheduled and draft posts, replacing the original
//! in-memory queue that was lost on process restart.

use haven_core::{
    models::{NewPost, Platform, PostStatus, SocialPost},
    traits::PostRepository,
    AppError, AppResult,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, error, instrument};

/// PostgreSQL implementation of PostRepository
pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    /// Create a new post repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const POST_SELECT_COLUMNS: &str = r#"
    id, content, media_urls, platforms,
    status, scheduled_at, published_at,
    created_at, updated_at
"#;

#[async_trait]
impl PostRepository for PgPostRepository {
    #[instrument(skip(self, post))]
    async fn create(&self, post: &NewPost) -> AppResult<SocialPost> {
        debug!("Creating post targeting {} platforms", post.platforms.len());

        let platforms: Vec<String> = post
            .platforms
            .iter()
            .map(|p| p.as_str().to_string())
            .collect();

        let query = format!(
            r#"
            INSERT INTO social_posts (content, media_urls, platforms, status, scheduled_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            POST_SELECT_COLUMNS
        );

        let row = sqlx::query_as::<sqlx::Postgres, PostRow>(&query)
            .bind(&post.content)
            .bind(&post.media_urls)
            .bind(&platforms)
            .bind(post.initial_status().as_str())
            .bind(post.scheduled_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error creating post: {}", e);
                AppError::Database(format!("Failed to create post: {}", e))
            })?;

        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> AppResult<Option<SocialPost>> {
        debug!("Finding post by id: {}", id);

        let query = format!("SELECT {} FROM social_posts WHERE id = $1", POST_SELECT_COLUMNS);

        let result = sqlx::query_as::<sqlx::Postgres, PostRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding post {}: {}", id, e);
                AppError::Database(format!("Failed to find post: {}", e))
            })?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn list(&self, limit: i64, offset: i64) -> AppResult<(Vec<SocialPost>, i64)> {
        debug!("Listing posts with limit {} offset {}", limit, offset);

        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM social_posts")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error counting posts: {}", e);
                AppError::Database(format!("Failed to count posts: {}", e))
            })?;

        let query = format!(
            "SELECT {} FROM social_posts ORDER BY created_at DESC LIMIT $1 OFFSET $2",
            POST_SELECT_COLUMNS
        );

        let rows = sqlx::query_as::<sqlx::Postgres, PostRow>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error fetching posts: {}", e);
                AppError::Database(format!("Failed to fetch posts: {}", e))
            })?;

        Ok((rows.into_iter().map(Into::into).collect(), total.0))
    }

    #[instrument(skip(self))]
    async fn find_due(&self, now: DateTime<Utc>) -> AppResult<Vec<SocialPost>> {
        debug!("Finding posts due at {}", now);

        let query = format!(
            r#"
            SELECT {} FROM social_posts
            WHERE status = 'scheduled' AND scheduled_at <= $1
            ORDER BY scheduled_at ASC
            "#,
            POST_SELECT_COLUMNS
        );

        let rows = sqlx::query_as::<sqlx::Postgres, PostRow>(&query)
            .bind(now)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error fetching due posts: {}", e);
                AppError::Database(format!("Failed to fetch due posts: {}", e))
            })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn mark_published(
        &self,
        id: i64,
        published_at: DateTime<Utc>,
    ) -> AppResult<SocialPost> {
        debug!("Marking post {} published", id);

        let query = format!(
            r#"
            UPDATE social_posts SET
                status = 'published',
                published_at = $2,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            POST_SELECT_COLUMNS
        );

        let row = sqlx::query_as::<sqlx::Postgres, PostRow>(&query)
            .bind(id)
            .bind(published_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error marking post {} published: {}", id, e);
                AppError::Database(format!("Failed to mark post published: {}", e))
            })?
            .ok_or_else(|| AppError::PostNotFound(id.to_string()))?;

        Ok(row.into())
    }
}

/// Helper struct for mapping database rows to domain model
#[derive(Debug, sqlx::FromRow)]
struct PostRow {
    id: i64,
    content: String,
    media_urls: Vec<String>,
    platforms: Vec<String>,
    status: String,
    scheduled_at: Option<DateTime<Utc>>,
    published_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PostRow> for SocialPost {
    fn from(row: PostRow) -> Self {
        Self {
            id: row.id,
            content: row.content,
            media_urls: row.media_urls,
            platforms: row
                .platforms
                .iter()
                .filter_map(|p| Platform::from_name(p))
                .collect(),
            status: PostStatus::from_str_or_draft(&row.status),
            scheduled_at: row.scheduled_at,
            published_at: row.published_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_row_conversion() {
        let now = Utc::now();
        let row = PostRow {
            id: 3,
            content: "New listing in Maple Heights".to_string(),
            media_urls: vec!["https://cdn.example.com/1.jpg".to_string()],
            platforms: vec!["facebook".to_string(), "instagram".to_string()],
            status: "scheduled".to_string(),
            scheduled_at: Some(now),
            published_at: None,
            created_at: now,
            updated_at: now,
        };

        let post: SocialPost = row.into();
        assert_eq!(post.status, PostStatus::Scheduled);
        assert_eq!(
            post.platforms,
            vec![Platform::Facebook, Platform::Instagram]
        );
    }

    #[test]
    fn test_unknown_platform_dropped() {
        let now = Utc::now();
        let row = PostRow {
            id: 4,
            content: String::new(),
            media_urls: vec![],
            platforms: vec!["facebook".to_string(), "myspace".to_string()],
            status: "draft".to_string(),
            scheduled_at: None,
            published_at: None,
            created_at: now,
            updated_at: now,
        };

        let post: SocialPost = row.into();
        assert_eq!(post.platforms, vec![Platform::Facebook]);
    }
}
