//! Reconnect policies.
//!
//! This module groups the knobs that control **how long** a supervisor waits
//! between connection attempts.
//!
//! ## Contents
//! - [`BackoffPolicy`]   three fixed tiers indexed by the attempt counter
//! - [`ReconnectPolicy`] immediate retry or tiered backoff
//!
//! ## Quick wiring
//! ```text
//! Config { read_reconnect, write_reconnect }
//!      └─► core::reader::ReadSupervisor  uses read_reconnect.delay(attempts)
//!      └─► core::writer::WriteSupervisor uses write_reconnect.delay(attempts)
//! ```
//!
//! ## Defaults
//! - read path: `ReconnectPolicy::Backoff(BackoffPolicy::default())` → 3s / 10s / 20s.
//! - write path: `ReconnectPolicy::Immediate`.

mod backoff;
mod reconnect;

pub use backoff::BackoffPolicy;
pub use reconnect::ReconnectPolicy;
