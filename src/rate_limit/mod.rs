//! Sliding-window rate limiter, constructed once at startup and shared
//! through application state rather than as a lazily-initialized global.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

pub struct RateLimiterConfig {
    pub max_requests: usize,
    pub window: Duration,
}

/// Sliding-window admission counter. Thread-safe; intended to be
/// constructed once in the composition root and placed in shared state.
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    admissions: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            max_requests: config.max_requests,
            window: config.window,
            admissions: Mutex::new(VecDeque::new()),
        }
    }

    fn purge_expired(admissions: &mut VecDeque<Instant>, window: Duration, now: Instant) {
        while let Some(&oldest) = admissions.front() {
            if now.duration_since(oldest) >= window {
                admissions.pop_front();
            } else {
                break;
            }
        }
    }

    /// Purges expired admissions, then admits `now` if under the limit.
    pub fn is_allowed(&self) -> bool {
        let now = Instant::now();
        let mut admissions = self.admissions.lock().expect("rate limiter mutex poisoned");
        Self::purge_expired(&mut admissions, self.window, now);
        if admissions.len() >= self.max_requests {
            return false;
        }
        admissions.push_back(now);
        true
    }

    /// Duration until the oldest admission falls out of the window, or
    /// `Duration::ZERO` if the limiter is not currently saturated.
    pub fn retry_after(&self) -> Duration {
        let now = Instant::now();
        let mut admissions = self.admissions.lock().expect("rate limiter mutex poisoned");
        Self::purge_expired(&mut admissions, self.window, now);
        match admissions.front() {
            Some(&oldest) if admissions.len() >= self.max_requests => {
                (oldest + self.window).saturating_duration_since(now)
            }
            _ => Duration::ZERO,
        }
    }
}
