//! Domain models for the Haven Realty backend
//!
//! This module contains all the core domain models used throughout the application.

pub mod call;
pub mod social;

pub use call::{
    CallEventUpdate, CallRecord, CallStatus, CallWebhookEvent, NewRecording, RecordingEntry,
    RecordingPayload,
};
pub use social::{NewPost, Platform, PostStatus, PublishOutcome, SocialPost};
