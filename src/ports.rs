//! # Queue boundary between the connection engine and the presentation layer.
//!
//! Three unbounded FIFO queues are the only coordination between tasks:
//!
//! ```text
//!               inbound (String)
//!   ReadSupervisor ──────────────────────┐
//!   HistoryLoader  ──────────────────────┼──► presentation
//!                                        │
//!               status (StatusEvent)     │
//!   Read/WriteSupervisor ────────────────┘
//!
//!               outbound (String)
//!   presentation ────────────────────────────► WriteSupervisor
//! ```
//!
//! [`channel`] creates both ends at once: [`EnginePorts`] go to
//! [`Client`](crate::Client), [`PresenterPorts`] to whatever renders the chat.
//!
//! The queues are unbounded and carry no backpressure; a stalled presenter
//! grows the inbound queue without limit.

use tokio::sync::mpsc;

use crate::events::{StatusBus, StatusEvent};

/// Engine side of the queue boundary.
#[derive(Debug)]
pub struct EnginePorts {
    /// Received chat lines and informational notices.
    pub inbound: mpsc::UnboundedSender<String>,
    /// Messages typed by the user, in submission order.
    pub outbound: mpsc::UnboundedReceiver<String>,
    /// Connection state and identity updates.
    pub status: StatusBus,
}

/// Presentation side of the queue boundary.
#[derive(Debug)]
pub struct PresenterPorts {
    /// Lines to display.
    pub inbound: mpsc::UnboundedReceiver<String>,
    /// Messages to send.
    pub outbound: mpsc::UnboundedSender<String>,
    /// Status updates to display.
    pub status: mpsc::UnboundedReceiver<StatusEvent>,
}

/// Creates the three queues and returns both ends.
pub fn channel() -> (EnginePorts, PresenterPorts) {
    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
    let (status, status_rx) = StatusBus::new();

    (
        EnginePorts {
            inbound: inbound_tx,
            outbound: outbound_rx,
            status,
        },
        PresenterPorts {
            inbound: inbound_rx,
            outbound: outbound_tx,
            status: status_rx,
        },
    )
}
