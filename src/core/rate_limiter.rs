//! Fixed-window rate limiting for the public site endpoints.
//!
//! Every AI-backed endpoint shares one limiter instance and supplies its own
//! per-window request limit. Keys are client identifiers (forwarded IP,
//! namespaced per endpoint), each tracked by a counter that resets a fixed
//! duration after the first request of its window.

use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Window applied when none is configured: one day, so quotas read as
/// "requests per day" to the site visitor.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(24 * 60 * 60);

/// Expired entries are swept once per this many checks, keeping the map
/// bounded by the set of keys active within the current window.
const SWEEP_INTERVAL: usize = 4096;

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    /// Whether the request may proceed.
    pub allowed: bool,
    /// Requests left in the current window after this one.
    pub remaining: u32,
}

/// Per-key counter state. `reset_at` is advanced by the window length
/// whenever a check arrives after it has passed.
struct WindowEntry {
    count: u32,
    reset_at: Instant,
}

/// Rate limiter enforcing a per-key quota over a fixed rolling window.
pub struct RateLimiter {
    /// Map of client key -> window counter
    entries: DashMap<String, WindowEntry>,
    window: Duration,
    checks: AtomicUsize,
}

impl RateLimiter {
    /// Create a limiter with the given window duration.
    pub fn new(window: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            window,
            checks: AtomicUsize::new(0),
        }
    }

    /// Check whether `key` may make another request under `limit`.
    ///
    /// The first call for a key, or the first call after its window expired,
    /// starts a fresh window with the counter at 1. Within a live window the
    /// counter increments until `limit` is reached; blocked calls do not
    /// increment it further, so hammering a blocked key cannot extend or
    /// corrupt its window.
    pub fn check(&self, key: &str, limit: u32) -> RateLimitDecision {
        self.maybe_sweep();

        let now = Instant::now();
        let mut entry = self.entries.entry(key.to_string()).or_insert(WindowEntry {
            count: 0,
            reset_at: now + self.window,
        });

        if now >= entry.reset_at {
            entry.count = 0;
            entry.reset_at = now + self.window;
        }

        if entry.count >= limit {
            return RateLimitDecision {
                allowed: false,
                remaining: 0,
            };
        }

        entry.count += 1;
        RateLimitDecision {
            allowed: true,
            remaining: limit - entry.count,
        }
    }

    /// Drop every entry whose window has already expired.
    ///
    /// Runs automatically every [`SWEEP_INTERVAL`] checks; exposed so callers
    /// with their own maintenance schedule can trigger it directly.
    pub fn evict_expired(&self) {
        let now = Instant::now();
        self.entries.retain(|_, entry| now < entry.reset_at);
    }

    /// Number of keys currently tracked (expired entries included until the
    /// next sweep).
    pub fn tracked_keys(&self) -> usize {
        self.entries.len()
    }

    fn maybe_sweep(&self) {
        let n = self.checks.fetch_add(1, Ordering::Relaxed) + 1;
        if n % SWEEP_INTERVAL == 0 {
            self.evict_expired();
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    // -- window accounting ----

    #[test]
    fn test_allows_within_limit_with_decreasing_remaining() {
        let limiter = RateLimiter::default();

        for expected_remaining in (0..5).rev() {
            let decision = limiter.check("10.0.0.1", 5);
            assert!(decision.allowed);
            assert_eq!(decision.remaining, expected_remaining);
        }
    }

    #[test]
    fn test_blocks_call_over_limit() {
        let limiter = RateLimiter::default();

        for _ in 0..3 {
            assert!(limiter.check("10.0.0.1", 3).allowed);
        }

        let decision = limiter.check("10.0.0.1", 3);
        assert!(!decision.allowed);
        assert_eq!(decision.remaining, 0);
    }

    #[test]
    fn test_blocked_calls_do_not_increment() {
        let limiter = RateLimiter::default();

        limiter.check("10.0.0.1", 1);
        for _ in 0..50 {
            let decision = limiter.check("10.0.0.1", 1);
            assert!(!decision.allowed);
            assert_eq!(decision.remaining, 0);
        }

        let entry = limiter.entries.get("10.0.0.1").unwrap();
        assert_eq!(entry.count, 1);
    }

    #[test]
    fn test_window_expiry_resets_counter() {
        let limiter = RateLimiter::new(Duration::from_millis(30));

        for _ in 0..2 {
            assert!(limiter.check("10.0.0.1", 2).allowed);
        }
        assert!(!limiter.check("10.0.0.1", 2).allowed);

        std::thread::sleep(Duration::from_millis(40));

        let decision = limiter.check("10.0.0.1", 2);
        assert!(decision.allowed);
        assert_eq!(decision.remaining, 1);
    }

    #[test]
    fn test_keys_are_independent() {
        let limiter = RateLimiter::default();

        limiter.check("10.0.0.1", 1);
        assert!(!limiter.check("10.0.0.1", 1).allowed);

        let decision = limiter.check("10.0.0.2", 1);
        assert!(decision.allowed);
    }

    #[test]
    fn test_zero_limit_blocks_everything() {
        let limiter = RateLimiter::default();

        let decision = limiter.check("10.0.0.1", 0);
        assert!(!decision.allowed);
        assert_eq!(decision.remaining, 0);
    }

    // -- concurrency ----

    #[test]
    fn test_concurrent_checks_never_exceed_limit() {
        let limiter = Arc::new(RateLimiter::default());
        let mut handles = Vec::new();

        for _ in 0..8 {
            let limiter = Arc::clone(&limiter);
            handles.push(std::thread::spawn(move || {
                let mut allowed = 0u32;
                for _ in 0..25 {
                    if limiter.check("shared-key", 100).allowed {
                        allowed += 1;
                    }
                }
                allowed
            }));
        }

        let total: u32 = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(total, 100);
    }

    // -- eviction ----

    #[test]
    fn test_evict_expired_drops_only_dead_windows() {
        let limiter = RateLimiter::new(Duration::from_millis(20));

        limiter.check("old-1", 5);
        limiter.check("old-2", 5);
        std::thread::sleep(Duration::from_millis(30));

        limiter.evict_expired();
        assert_eq!(limiter.tracked_keys(), 0);

        limiter.check("fresh", 5);
        limiter.evict_expired();
        assert_eq!(limiter.tracked_keys(), 1);
    }

    #[test]
    fn test_default_window_is_one_day() {
        let limiter = RateLimiter::default();
        assert_eq!(limiter.window, Duration::from_secs(86400));
    }
}
