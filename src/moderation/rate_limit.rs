//! Per-user message-rate limiting for spam detection.
//!
//! A fixed 10-second window is used instead of a true sliding window for
//! O(1) memory per user. Windows are keyed by user id only, so a user
//! active in several groups shares one counter (observed behavior,
//! preserved).

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Messages allowed per window before a user counts as flooding.
const MAX_MESSAGES_PER_WINDOW: u32 = 5;

/// Window length.
const WINDOW: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy)]
struct RateWindow {
    count: u32,
    window_start: Instant,
}

/// Result of recording one message.
#[derive(Debug, Clone, Copy)]
pub struct RateCheck {
    pub exceeded: bool,
    pub count: u32,
}

/// In-memory per-user message counters.
///
/// Windows live indefinitely; there is no expiry sweep.
#[derive(Clone, Default)]
pub struct RateLimiter {
    windows: Arc<DashMap<u64, RateWindow>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one message from the user and report whether the rate is
    /// exceeded.
    pub fn record_and_check(&self, user_id: u64) -> RateCheck {
        self.record_at(user_id, Instant::now())
    }

    fn record_at(&self, user_id: u64, now: Instant) -> RateCheck {
        let mut entry = self.windows.entry(user_id).or_insert(RateWindow {
            count: 0,
            window_start: now,
        });

        if now.duration_since(entry.window_start) > WINDOW {
            entry.count = 0;
            entry.window_start = now;
        }

        entry.count += 1;

        RateCheck {
            exceeded: entry.count > MAX_MESSAGES_PER_WINDOW,
            count: entry.count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sixth_message_in_window_exceeds() {
        let limiter = RateLimiter::new();
        let start = Instant::now();

        for i in 1..=5 {
            let check = limiter.record_at(1, start);
            assert!(!check.exceeded, "message {} should pass", i);
            assert_eq!(check.count, i);
        }

        let check = limiter.record_at(1, start);
        assert!(check.exceeded);
        assert_eq!(check.count, 6);
    }

    #[test]
    fn test_gap_resets_window() {
        let limiter = RateLimiter::new();
        let start = Instant::now();

        for _ in 0..6 {
            limiter.record_at(1, start);
        }
        assert!(limiter.record_at(1, start).exceeded);

        let later = start + Duration::from_secs(11);
        let check = limiter.record_at(1, later);
        assert!(!check.exceeded);
        assert_eq!(check.count, 1);
    }

    #[test]
    fn test_boundary_is_strictly_greater_than_window() {
        let limiter = RateLimiter::new();
        let start = Instant::now();
        limiter.record_at(1, start);

        // Exactly 10s does not reset; just over does.
        let check = limiter.record_at(1, start + Duration::from_secs(10));
        assert_eq!(check.count, 2);

        let check = limiter.record_at(1, start + Duration::from_millis(10_001));
        assert_eq!(check.count, 1);
    }

    #[test]
    fn test_counters_are_per_user() {
        let limiter = RateLimiter::new();
        let now = Instant::now();

        for _ in 0..6 {
            limiter.record_at(1, now);
        }
        assert!(!limiter.record_at(2, now).exceeded);
    }
}
