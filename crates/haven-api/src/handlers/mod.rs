//! HTTP request handlers

pub mod calls;
pub mod social;
pub mod webhook;

pub use calls::configure as configure_calls;
pub use social::configure as configure_social;
pub use webhook::twilio_webhook;
