//! Haven Realty Database Layer
//!
//! This crate provides PostgreSQL database access and repository implementations
//! for the Haven Realty backend. It includes:
//!
//! - Connection pool management with sqlx
//! - Repository implementations for call logs, recordings, and social posts
//! - Atomic upsert for concurrent webhook deliveries

pub mod pool;
pub mod repositories;

pub use pool::create_pool;
pub use repositories::*;

// Re-export commonly used types
pub use haven_core::{AppError, AppResult};
pub use sqlx::PgPool;
