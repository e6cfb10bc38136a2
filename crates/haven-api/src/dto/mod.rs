//! Data Transfer Objects (DTOs) for API requests and responses

pub mod call;
pub mod common;
pub mod social;
pub mod webhook;

pub use call::*;
pub use common::*;
pub use social::*;
pub use webhook::*;
