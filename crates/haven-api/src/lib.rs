//! API layer for the Haven Realty backend
//!
//! HTTP handlers for the telephony webhook, social post management, and
//! call log browsing.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    missing_docs
)]

pub mod dto;
pub mod handlers;

// Re-export DTOs (common types)
pub use dto::{ApiResponse, PaginationParams};

// Re-export handler configuration functions and the webhook handler
// (registered manually in main.rs)
pub use handlers::{configure_calls, configure_social, twilio_webhook};
