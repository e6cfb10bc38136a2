//! Social post scheduler
//!
//! Owns the post lifecycle: creation, the scheduler sweep that fires due
//! posts, and on-demand publishing. Firing is single-shot: once a post is
//! picked up it transitions to published whatever the per-platform
//! outcomes were, so the sweep never retries a post. Per-platform results
//! are returned to the caller instead.

use crate::rate_limit::RateLimiter;
use haven_core::{
    models::{NewPost, PostStatus, PublishOutcome, SocialPost},
    traits::{PlatformPublisher, PostRepository},
    AppError, AppResult,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Per-post result of one scheduler sweep or publish call
#[derive(Debug)]
pub struct PostRun {
    pub post_id: i64,
    pub results: Vec<PublishOutcome>,
}

impl PostRun {
    /// Whether every targeted platform accepted the post
    pub fn all_sent(&self) -> bool {
        self.results.iter().all(|r| r.success)
    }
}

/// Social post scheduler service
pub struct PostScheduler<P: PostRepository> {
    posts: Arc<P>,
    publisher: Arc<dyn PlatformPublisher>,
    limiter: Arc<RateLimiter>,
}

impl<P: PostRepository> PostScheduler<P> {
    pub fn new(
        posts: Arc<P>,
        publisher: Arc<dyn PlatformPublisher>,
        limiter: Arc<RateLimiter>,
    ) -> Self {
        Self {
            posts,
            publisher,
            limiter,
        }
    }

    /// Store a new post; scheduled when a schedule time is given, draft
    /// otherwise.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when no target platform is given.
    #[instrument(skip(self, post))]
    pub async fn create_post(&self, post: &NewPost) -> AppResult<SocialPost> {
        if post.platforms.is_empty() {
            return Err(AppError::InvalidInput(
                "at least one target platform is required".to_string(),
            ));
        }

        let stored = self.posts.create(post).await?;
        info!(
            post_id = stored.id,
            status = %stored.status,
            "Post created"
        );
        Ok(stored)
    }

    /// Fire every scheduled post whose time has elapsed at `now`
    ///
    /// Each fired post is marked published exactly once; per-platform
    /// failures are reported in the returned runs, never retried.
    #[instrument(skip(self))]
    pub async fn run(&self, now: DateTime<Utc>) -> AppResult<Vec<PostRun>> {
        let due = self.posts.find_due(now).await?;
        if due.is_empty() {
            return Ok(Vec::new());
        }
        info!(count = due.len(), "Firing due posts");

        let mut runs = Vec::with_capacity(due.len());
        for post in &due {
            let results = self.fire(post).await;
            self.posts.mark_published(post.id, now).await?;
            runs.push(PostRun {
                post_id: post.id,
                results,
            });
        }

        Ok(runs)
    }

    /// Publish one post immediately, regardless of its schedule
    ///
    /// # Errors
    ///
    /// Returns `PostNotFound` for an unknown id and `Conflict` when the
    /// post has already been published.
    #[instrument(skip(self))]
    pub async fn publish_now(&self, post_id: i64) -> AppResult<PostRun> {
        let post = self
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| AppError::PostNotFound(post_id.to_string()))?;

        if post.status == PostStatus::Published {
            return Err(AppError::Conflict(format!(
                "post {} is already published",
                post_id
            )));
        }

        let results = self.fire(&post).await;
        self.posts.mark_published(post.id, Utc::now()).await?;

        Ok(PostRun {
            post_id: post.id,
            results,
        })
    }

    /// Attempt every target platform of one post
    ///
    /// Platform failures do not abort the remaining platforms. A drained
    /// rate bucket counts as a failure for that platform; no token is
    /// consumed by failed publish calls either way.
    async fn fire(&self, post: &SocialPost) -> Vec<PublishOutcome> {
        let mut results = Vec::with_capacity(post.platforms.len());

        for &platform in &post.platforms {
            if !self.limiter.try_acquire(platform) {
                warn!(post_id = post.id, %platform, "Publish skipped, rate limited");
                results.push(PublishOutcome::failed(platform, "rate limited"));
                continue;
            }

            match self.publisher.publish(platform, post).await {
                Ok(external_id) => {
                    info!(post_id = post.id, %platform, "Post published");
                    results.push(PublishOutcome::sent(platform, external_id));
                }
                Err(e) => {
                    warn!(post_id = post.id, %platform, error = %e, "Publish failed");
                    results.push(PublishOutcome::failed(platform, e.to_string()));
                }
            }
        }

        results
    }
}
