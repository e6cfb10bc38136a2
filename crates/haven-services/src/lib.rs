//! Business logic services for the Haven Realty backend
//!
//! This crate contains the services that sit between the HTTP layer and
//! the repositories.
//!
//! # Architecture
//!
//! Services are designed to be composable and testable:
//! - Each service owns its dependencies (repositories, publisher, limiter)
//! - Services are generic over repository traits; tests inject in-memory fakes
//! - All operations are instrumented with tracing
//! - Comprehensive error handling with AppError
//!
//! # Services
//!
//! - `CallCorrelator` - correlates out-of-order webhook callbacks into call records
//! - `PostScheduler` - fires scheduled posts and immediate publishes
//! - `RateLimiter` - per-platform token bucket
//! - `HttpPublisher` - posts to platform endpoints over HTTP

pub mod correlator;
pub mod publisher;
pub mod rate_limit;
pub mod scheduler;

pub use correlator::{CallCorrelator, WebhookOutcome};
pub use publisher::HttpPublisher;
pub use rate_limit::RateLimiter;
pub use scheduler::{PostRun, PostScheduler};

#[cfg(test)]
pub(crate) mod testing;
