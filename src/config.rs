//! # Client configuration.
//!
//! Provides [`Config`]: every setting the engine needs, built once at
//! startup and handed to each task by value or reference. Nothing in the
//! engine reads the environment on its own; see [`Cli`](crate::Cli) for the
//! flag/env front end.
//!
//! ## Sentinel values
//! - `token = None` → the write supervisor registers a new account
//! - `history_path = None` → persistence and replay are disabled
//! - `read_timeout = 0s` → treated as the protocol default (5s)

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use crate::policies::ReconnectPolicy;

/// Silence on the read channel after which the link counts as broken.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Immutable client configuration.
///
/// ## Field semantics
/// - `host`, `read_port`, `write_port`: server endpoints of the two channels
/// - `token`: existing account token; absent selects registration
/// - `nickname`: desired nickname for registration; absent means "ask the user"
/// - `history_path`: append-only history file; absent disables persistence
/// - `debug`: verbose logging
/// - `read_timeout`: bound on one line read on the read channel
/// - `grace`: how long shutdown waits for tasks to close their sockets
/// - `read_reconnect`, `write_reconnect`: pause policy between attempts per direction
#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub read_port: u16,
    pub write_port: u16,
    pub token: Option<String>,
    pub nickname: Option<String>,
    pub history_path: Option<PathBuf>,
    pub debug: bool,

    /// Bound on a single line read from the read channel.
    ///
    /// A quiet server and a dead link look the same from here: both end the
    /// read with a timeout and send the supervisor into backoff.
    pub read_timeout: Duration,

    /// Maximum time to wait for tasks to exit after shutdown is requested.
    pub grace: Duration,

    /// Pause policy of the read supervisor.
    pub read_reconnect: ReconnectPolicy,

    /// Pause policy of the write supervisor.
    pub write_reconnect: ReconnectPolicy,
}

impl Config {
    /// Checks invariants the engine relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        if self.read_port == 0 {
            return Err(ConfigError::ZeroPort { which: "read" });
        }
        if self.write_port == 0 {
            return Err(ConfigError::ZeroPort { which: "write" });
        }
        if self.token.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(ConfigError::BlankToken);
        }
        Ok(())
    }

    /// Returns the read bound, substituting the default for `0s`.
    #[inline]
    pub fn read_timeout(&self) -> Duration {
        if self.read_timeout == Duration::ZERO {
            DEFAULT_READ_TIMEOUT
        } else {
            self.read_timeout
        }
    }

    /// `host:port` of the read channel, for logs.
    pub fn read_addr(&self) -> String {
        format!("{}:{}", self.host, self.read_port)
    }

    /// `host:port` of the write channel, for logs.
    pub fn write_addr(&self) -> String {
        format!("{}:{}", self.host, self.write_port)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `host = "minechat.dvmn.org"`, `read_port = 5000`, `write_port = 5050`
    /// - `history_path = Some("history.txt")`
    /// - `read_timeout = 5s`, `grace = 5s`
    /// - read path backs off in tiers, write path retries immediately
    fn default() -> Self {
        Self {
            host: "minechat.dvmn.org".to_string(),
            read_port: 5000,
            write_port: 5050,
            token: None,
            nickname: None,
            history_path: Some(PathBuf::from("history.txt")),
            debug: false,
            read_timeout: DEFAULT_READ_TIMEOUT,
            grace: Duration::from_secs(5),
            read_reconnect: ReconnectPolicy::default(),
            write_reconnect: ReconnectPolicy::Immediate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert_eq!(Config::default().validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_bad_values() {
        let cfg = Config {
            host: " ".into(),
            ..Config::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::EmptyHost));

        let cfg = Config {
            write_port: 0,
            ..Config::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroPort { which: "write" }));

        let cfg = Config {
            token: Some(String::new()),
            ..Config::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::BlankToken));
    }

    #[test]
    fn zero_read_timeout_means_default() {
        let cfg = Config {
            read_timeout: Duration::ZERO,
            ..Config::default()
        };
        assert_eq!(cfg.read_timeout(), DEFAULT_READ_TIMEOUT);
    }
}
