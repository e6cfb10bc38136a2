//! Repository implementations

pub mod call_log_repo;
pub mod post_repo;
pub mod recording_repo;

pub use call_log_repo::PgCallLogRepository;
pub use post_repo::PgPostRepository;
pub use recording_repo::PgRecordingRepository;
