//! # Status events published by the connection supervisors.
//!
//! [`StatusEvent`] is the vocabulary shared between the supervisors and the
//! presentation layer. It carries connection-state changes for either
//! direction and the nickname resolved by the handshake; it never carries
//! chat content.
//!
//! ## Ordering guarantees
//! Events from one supervisor arrive in publish order. Events from the read
//! and write supervisors are not ordered relative to each other.
//!
//! ## Example
//! ```rust
//! use chatvisor::{ConnectionState, StatusEvent};
//!
//! let ev = StatusEvent::ReadStateChanged(ConnectionState::Established);
//! assert_eq!(ev.as_label(), "read_state_changed");
//! ```

use std::fmt;

/// State of one direction's connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    /// Attempting to connect, or waiting to retry.
    Initiated,
    /// Socket open and usable.
    Established,
    /// Socket torn down.
    Closed,
}

impl ConnectionState {
    /// Returns a short stable label for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Initiated => "initiated",
            ConnectionState::Established => "established",
            ConnectionState::Closed => "closed",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Notification about connection state or identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusEvent {
    /// The read connection changed state.
    ReadStateChanged(ConnectionState),
    /// The write connection changed state.
    SendStateChanged(ConnectionState),
    /// The handshake resolved the account nickname.
    NicknameReceived(String),
}

impl StatusEvent {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            StatusEvent::ReadStateChanged(_) => "read_state_changed",
            StatusEvent::SendStateChanged(_) => "send_state_changed",
            StatusEvent::NicknameReceived(_) => "nickname_received",
        }
    }
}

impl fmt::Display for StatusEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusEvent::ReadStateChanged(state) => write!(f, "[read] {state}"),
            StatusEvent::SendStateChanged(state) => write!(f, "[send] {state}"),
            StatusEvent::NicknameReceived(nickname) => write!(f, "[nickname] {nickname}"),
        }
    }
}
