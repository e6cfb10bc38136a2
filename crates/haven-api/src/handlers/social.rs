//! Social post handlers

use crate::dto::{
    ApiResponse, CreatePostRequest, PaginationParams, PostResponse, PostRunResponse,
    PublishRequest,
};
use actix_web::{
    web::{self, Data, Json, Query},
    Result,
};
use chrono::Utc;
use haven_core::{
    error::AppError,
    traits::{PaginatedResponse, PlatformPublisher, PostRepository},
};
use haven_db::repositories::PgPostRepository;
use haven_services::{PostScheduler, RateLimiter};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

fn scheduler(
    db: &Data<PgPool>,
    publisher: &Data<dyn PlatformPublisher>,
    limiter: &Data<RateLimiter>,
) -> PostScheduler<PgPostRepository> {
    PostScheduler::new(
        Arc::new(PgPostRepository::new(db.get_ref().clone())),
        publisher.clone().into_inner(),
        limiter.clone().into_inner(),
    )
}

/// Create a post; scheduled when `scheduled_at` is given, draft otherwise
///
/// # Errors
///
/// Returns 400 for validation failures or unknown platform names.
///
/// # Examples
///
/// ```text
/// POST /api/social/posts
/// {"content": "Open house Sunday", "platforms": ["facebook"], "scheduled_at": "2026-09-01T14:00:00Z"}
/// ```
#[instrument(skip(body, db, publisher, limiter))]
pub async fn create_post(
    body: Json<CreatePostRequest>,
    db: Data<PgPool>,
    publisher: Data<dyn PlatformPublisher>,
    limiter: Data<RateLimiter>,
) -> Result<Json<ApiResponse<PostResponse>>> {
    body.validate().map_err(|e| {
        warn!("Invalid post payload: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let new_post = body.into_inner().into_new_post()?;
    let post = scheduler(&db, &publisher, &limiter)
        .create_post(&new_post)
        .await?;

    info!(post_id = post.id, status = %post.status, "Post created");

    Ok(Json(ApiResponse::success(PostResponse::from(post))))
}

/// List posts, newest first
///
/// # Errors
///
/// Returns error if validation or the database query fails.
#[instrument(skip(db, query))]
pub async fn list_posts(
    query: Query<PaginationParams>,
    db: Data<PgPool>,
) -> Result<Json<PaginatedResponse<PostResponse>>> {
    query.validate().map_err(|e| {
        warn!("Invalid query parameters: {}", e);
        AppError::Validation(e.to_string())
    })?;

    debug!(
        "Listing posts: page={}, per_page={}",
        query.page, query.per_page
    );

    let repo = PgPostRepository::new(db.get_ref().clone());
    let (posts, total) = repo.list(query.limit(), query.offset()).await?;

    let data: Vec<PostResponse> = posts.into_iter().map(PostResponse::from).collect();
    Ok(Json(query.paginate(data, total)))
}

/// Publish a post immediately, bypassing its schedule
///
/// # Errors
///
/// Returns 404 for an unknown post and 409 when it is already published.
#[instrument(skip(body, db, publisher, limiter))]
pub async fn publish_post(
    body: Json<PublishRequest>,
    db: Data<PgPool>,
    publisher: Data<dyn PlatformPublisher>,
    limiter: Data<RateLimiter>,
) -> Result<Json<ApiResponse<PostRunResponse>>> {
    let run = scheduler(&db, &publisher, &limiter)
        .publish_now(body.post_id)
        .await?;

    info!(post_id = run.post_id, "Post published on demand");

    Ok(Json(ApiResponse::success(PostRunResponse::from(run))))
}

/// Fire every scheduled post whose time has elapsed
///
/// Per-platform failures are reported in the response; fired posts are
/// never retried by a later sweep.
///
/// # Errors
///
/// Returns error if the database query fails.
#[instrument(skip(db, publisher, limiter))]
pub async fn run_scheduler(
    db: Data<PgPool>,
    publisher: Data<dyn PlatformPublisher>,
    limiter: Data<RateLimiter>,
) -> Result<Json<ApiResponse<Vec<PostRunResponse>>>> {
    let runs = scheduler(&db, &publisher, &limiter).run(Utc::now()).await?;

    info!(fired = runs.len(), "Scheduler sweep complete");

    let data: Vec<PostRunResponse> = runs.into_iter().map(PostRunResponse::from).collect();
    Ok(Json(ApiResponse::with_message(
        data,
        "scheduler sweep complete",
    )))
}

/// Register social post routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/social")
            .route("/posts", web::post().to(create_post))
            .route("/posts", web::get().to(list_posts))
            .route("/publish", web::post().to(publish_post))
            .route("/scheduler/run", web::post().to(run_scheduler)),
    );
}
