//! PostgreSQL pool setup
//!
//! One shared pool serves the webhook correlator, the call log views, and
//! the post scheduler. Webhook callbacks arrive in bursts when the
//! provider flushes retries, so connections are validated before hand-out
//! rather than discovered dead mid-callback.

use haven_core::{AppError, AppResult};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use tracing::info;

/// Pool size when `DATABASE_MAX_CONNECTIONS` is not set
const DEFAULT_MAX_CONNECTIONS: u32 = 20;

/// Give up acquiring a connection after this long
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);

/// Close connections idle longer than this
const IDLE_TIMEOUT: Duration = Duration::from_secs(600);

/// Connect a pool and verify it with a round-trip query.
///
/// The binary passes `DATABASE_MAX_CONNECTIONS` here; `None` falls back
/// to 20.
///
/// # Errors
///
/// Returns `AppError::Pool` when the URL is unusable or the server is
/// unreachable, and `AppError::Database` when the post-connect health
/// query fails.
pub async fn create_pool(database_url: &str, max_connections: Option<u32>) -> AppResult<PgPool> {
    let max_connections = max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS);

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .idle_timeout(IDLE_TIMEOUT)
        .test_before_acquire(true)
        .connect(database_url)
        .await
        .map_err(|e| AppError::Pool(format!("Failed to connect to database: {}", e)))?;

    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .map_err(|e| AppError::Database(format!("Database health check failed: {}", e)))?;

    info!(max_connections, "Database pool ready");

    Ok(pool)
}
