//! # Tiered backoff for reconnect attempts.
//!
//! [`BackoffPolicy`] maps the number of consecutive failed attempts to a wait
//! duration using three fixed tiers:
//! - attempts below [`BackoffPolicy::medium_after`] wait [`BackoffPolicy::short`];
//! - attempts below [`BackoffPolicy::long_after`] wait [`BackoffPolicy::medium`];
//! - everything after waits [`BackoffPolicy::long`].
//!
//! The mapping is deterministic: no jitter, no growth beyond the last tier.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use chatvisor::BackoffPolicy;
//!
//! let backoff = BackoffPolicy::default();
//!
//! assert_eq!(backoff.delay(0), Duration::from_secs(3));
//! assert_eq!(backoff.delay(5), Duration::from_secs(10));
//! assert_eq!(backoff.delay(10), Duration::from_secs(20));
//! assert_eq!(backoff.delay(u32::MAX), Duration::from_secs(20));
//! ```

use std::time::Duration;

/// Three-tier reconnect delay.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BackoffPolicy {
    /// Delay for the first attempts.
    pub short: Duration,
    /// Delay once `medium_after` attempts have failed.
    pub medium: Duration,
    /// Delay once `long_after` attempts have failed.
    pub long: Duration,
    /// Attempt count at which `medium` applies.
    pub medium_after: u32,
    /// Attempt count at which `long` applies.
    pub long_after: u32,
}

impl Default for BackoffPolicy {
    /// Returns the protocol tiers:
    /// - `0..5` attempts → 3s;
    /// - `5..10` attempts → 10s;
    /// - `10..` attempts → 20s.
    fn default() -> Self {
        Self {
            short: Duration::from_secs(3),
            medium: Duration::from_secs(10),
            long: Duration::from_secs(20),
            medium_after: 5,
            long_after: 10,
        }
    }
}

impl BackoffPolicy {
    /// Returns the wait before the next attempt, given how many attempts have already failed.
    pub fn delay(&self, attempts: u32) -> Duration {
        if attempts < self.medium_after {
            self.short
        } else if attempts < self.long_after {
            self.medium
        } else {
            self.long
        }
    }
}
