//! Per-platform token bucket rate limiter
//!
//! In-memory, shared across all callers in the process, refilled lazily on
//! check. Not coordinated across multiple process instances.

use haven_core::models::Platform;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Instant;
use tracing::debug;

/// Single token bucket
#[derive(Debug)]
struct TokenBucket {
    capacity: f64,
    tokens: f64,
    refill_per_sec: f64,
    last_refill: Instant,
}

impl TokenBucket {
    fn new(capacity: f64, refill_per_sec: f64) -> Self {
        Self {
            capacity,
            tokens: capacity,
            refill_per_sec,
            last_refill: Instant::now(),
        }
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.refill_per_sec).min(self.capacity);
        self.last_refill = now;
    }

    fn try_acquire(&mut self) -> bool {
        self.refill();
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

/// Token bucket limiter keyed by platform
pub struct RateLimiter {
    capacity: f64,
    refill_per_sec: f64,
    buckets: Mutex<HashMap<Platform, TokenBucket>>,
}

impl RateLimiter {
    /// Create a limiter granting `capacity` burst operations per platform,
    /// refilled at `refill_per_minute` tokens per minute.
    pub fn new(capacity: u32, refill_per_minute: u32) -> Self {
        Self {
            capacity: f64::from(capacity),
            refill_per_sec: f64::from(refill_per_minute) / 60.0,
            buckets: Mutex::new(HashMap::new()),
        }
    }

    /// Take one token for the platform; `false` when the bucket is drained
    pub fn try_acquire(&self, platform: Platform) -> bool {
        let mut buckets = self.buckets.lock();
        let bucket = buckets
            .entry(platform)
            .or_insert_with(|| TokenBucket::new(self.capacity, self.refill_per_sec));

        let granted = bucket.try_acquire();
        if !granted {
            debug!("Rate limit hit for platform {}", platform);
        }
        granted
    }
}
