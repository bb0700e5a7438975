//! # Reconnect policies for connection supervisors.
//!
//! [`ReconnectPolicy`] decides how long a supervisor waits after a failed
//! attempt before dialing again.
//!
//! - [`ReconnectPolicy::Immediate`] dial again right away.
//! - [`ReconnectPolicy::Backoff`] wait according to a [`BackoffPolicy`].
//!
//! ## Defaults per direction
//! ```text
//! read path   → Backoff(BackoffPolicy::default())   timed poll, silence counts as failure
//! write path  → Immediate                           gated by the outbound queue
//! ```
//!
//! The two directions differ on purpose: the read supervisor polls the wire on
//! a timer, so it needs to slow down while the server is away. The write
//! supervisor spends its idle time parked on the outbound queue and only
//! touches the network when there is something to say.

use std::time::Duration;

use crate::policies::backoff::BackoffPolicy;

/// Policy controlling the pause between reconnect attempts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReconnectPolicy {
    /// Reconnect without waiting.
    Immediate,
    /// Wait `backoff.delay(attempts)` before reconnecting.
    Backoff(BackoffPolicy),
}

impl Default for ReconnectPolicy {
    /// Returns [`ReconnectPolicy::Backoff`] with the default tiers.
    fn default() -> Self {
        ReconnectPolicy::Backoff(BackoffPolicy::default())
    }
}

impl ReconnectPolicy {
    /// Returns the pause before the next attempt, or `None` for an immediate retry.
    pub fn delay(&self, attempts: u32) -> Option<Duration> {
        match self {
            ReconnectPolicy::Immediate => None,
            ReconnectPolicy::Backoff(backoff) => Some(backoff.delay(attempts)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn immediate_never_waits() {
        for attempt in [0, 7, 42] {
            assert_eq!(ReconnectPolicy::Immediate.delay(attempt), None);
        }
    }

    #[test]
    fn backoff_delegates_to_tiers() {
        let policy = ReconnectPolicy::default();
        assert_eq!(policy.delay(0), Some(Duration::from_secs(3)));
        assert_eq!(policy.delay(9), Some(Duration::from_secs(10)));
        assert_eq!(policy.delay(10), Some(Duration::from_secs(20)));
    }
}
