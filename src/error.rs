//! Error types used by the chatvisor connection engine.
//!
//! This module defines three error enums:
//!
//! - [`LinkError`]: errors raised by one connection attempt (connect, handshake, read, write).
//! - [`RuntimeError`]: unrecoverable errors that escape the supervisors to the top level.
//! - [`ConfigError`]: invalid startup configuration.
//!
//! All types provide helper methods (`as_label`, `as_message`) for logging,
//! and [`LinkError`] additionally classifies itself via [`LinkError::is_retryable`].

use std::io;
use std::time::Duration;

use thiserror::Error;

/// # Errors produced by a single connection attempt.
///
/// Transient variants (`Connect`, `Io`, `Timeout`, `Closed`) are absorbed by the
/// owning supervisor and turned into a reconnect. `InvalidToken` and `Malformed`
/// describe a server answer that retrying cannot fix.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum LinkError {
    /// Opening the connection failed (refused, DNS resolution, unreachable).
    #[error("connect to {addr} failed: {source}")]
    Connect {
        /// Address that was dialed.
        addr: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Reading from or writing to an open connection failed.
    #[error("connection i/o failed: {0}")]
    Io(#[from] io::Error),

    /// No line arrived within the read bound.
    #[error("no data within {timeout:?}")]
    Timeout {
        /// The bound that was exceeded.
        timeout: Duration,
    },

    /// The peer closed the connection.
    #[error("connection closed by peer")]
    Closed,

    /// The server rejected the token (replied with the `null` sentinel).
    #[error("token rejected by server")]
    InvalidToken,

    /// The server replied with something that is not a valid account object.
    #[error("malformed server response {line:?}: {error}")]
    Malformed {
        /// The raw line as received.
        line: String,
        /// Parser diagnostic.
        error: String,
    },

    /// The attempt was interrupted by shutdown.
    #[error("context cancelled")]
    Canceled,
}

impl LinkError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use chatvisor::LinkError;
    ///
    /// assert_eq!(LinkError::InvalidToken.as_label(), "link_invalid_token");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            LinkError::Connect { .. } => "link_connect",
            LinkError::Io(_) => "link_io",
            LinkError::Timeout { .. } => "link_timeout",
            LinkError::Closed => "link_closed",
            LinkError::InvalidToken => "link_invalid_token",
            LinkError::Malformed { .. } => "link_malformed",
            LinkError::Canceled => "link_canceled",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            LinkError::Connect { addr, source } => format!("connect {addr}: {source}"),
            LinkError::Io(e) => format!("i/o: {e}"),
            LinkError::Timeout { timeout } => format!("timeout: {timeout:?}"),
            LinkError::Closed => "closed by peer".to_string(),
            LinkError::InvalidToken => "invalid token".to_string(),
            LinkError::Malformed { line, error } => format!("malformed {line:?}: {error}"),
            LinkError::Canceled => "context cancelled".to_string(),
        }
    }

    /// Indicates whether a reconnect may cure the error.
    ///
    /// Returns `true` for connection-level failures, `false` for server
    /// verdicts (`InvalidToken`, `Malformed`) and for cancellation.
    ///
    /// # Example
    /// ```
    /// use chatvisor::LinkError;
    ///
    /// assert!(LinkError::Closed.is_retryable());
    /// assert!(!LinkError::InvalidToken.is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LinkError::Connect { .. } | LinkError::Io(_) | LinkError::Timeout { .. } | LinkError::Closed
        )
    }
}

/// # Errors that escape to the top level.
///
/// Only unrecoverable conditions end up here; transient failures never do.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// The configured token was rejected. Retrying will not help.
    #[error("authorization failed: the token was rejected by the server")]
    Unauthorized,

    /// The server broke the handshake protocol.
    #[error("protocol error during handshake: {reason}")]
    Protocol {
        /// Description of the offending reply.
        reason: String,
    },

    /// A single-attempt operation could not reach the server or lost the link.
    #[error("link failed: {reason}")]
    Link {
        /// Description of the connection failure.
        reason: String,
    },

    /// The configuration cannot drive the requested operation.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A supervised task panicked.
    #[error("task panicked: {reason}")]
    Panicked {
        /// Join error description.
        reason: String,
    },

    /// Tasks did not stop within the shutdown grace period.
    #[error("shutdown timeout {grace:?} exceeded; stuck: {stuck:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Names of the tasks that were still running.
        stuck: Vec<String>,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::Unauthorized => "runtime_unauthorized",
            RuntimeError::Protocol { .. } => "runtime_protocol",
            RuntimeError::Link { .. } => "runtime_link",
            RuntimeError::Config(_) => "runtime_config",
            RuntimeError::Panicked { .. } => "runtime_panicked",
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::Unauthorized => {
                "the token was rejected; check it or register a new account".to_string()
            }
            RuntimeError::Protocol { reason } => format!("protocol violation: {reason}"),
            RuntimeError::Link { reason } => format!("server unreachable: {reason}"),
            RuntimeError::Config(e) => format!("configuration: {e}"),
            RuntimeError::Panicked { reason } => format!("task panicked: {reason}"),
            RuntimeError::GraceExceeded { grace, stuck } => {
                format!("grace exceeded after {grace:?}; stuck tasks={stuck:?}")
            }
        }
    }
}

impl From<LinkError> for RuntimeError {
    /// Maps a link failure that was not retried to its top-level counterpart.
    fn from(e: LinkError) -> Self {
        match e {
            LinkError::InvalidToken => RuntimeError::Unauthorized,
            LinkError::Malformed { .. } => RuntimeError::Protocol {
                reason: e.as_message(),
            },
            other => RuntimeError::Link {
                reason: other.as_message(),
            },
        }
    }
}

/// # Errors produced while validating configuration.
#[non_exhaustive]
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Host is empty.
    #[error("host must not be empty")]
    EmptyHost,

    /// A port is zero.
    #[error("{which} port must be non-zero")]
    ZeroPort {
        /// `"read"` or `"write"`.
        which: &'static str,
    },

    /// The token is present but blank.
    #[error("token must not be blank")]
    BlankToken,

    /// Registering without a token needs a nickname up front.
    #[error("a nickname is required to register without a token")]
    NicknameRequired,
}
