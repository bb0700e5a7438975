//! # Status event bus.
//!
//! [`StatusBus`] is a thin wrapper around an unbounded [`tokio::sync::mpsc`]
//! channel carrying [`StatusEvent`]s from the supervisors to the presentation
//! layer.
//!
//! ## Architecture
//! ```text
//! Publishers (many):                    Consumer (one):
//!   ReadSupervisor  ──┐
//!                     ├──► StatusBus ───► presentation loop
//!   WriteSupervisor ──┘  (unbounded mpsc)
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never waits; the queue is unbounded.
//! - **Per-producer FIFO**: events from one publisher keep their order.
//! - **Single consumer**: only the holder of the receiver drains the queue.
//! - **Fire-and-forget**: once the consumer is gone, events are dropped silently.

use tokio::sync::mpsc;

use super::event::StatusEvent;

/// Publishing side of the status-event queue.
///
/// Cheap to clone; every supervisor holds its own copy.
#[derive(Clone, Debug)]
pub struct StatusBus {
    tx: mpsc::UnboundedSender<StatusEvent>,
}

impl StatusBus {
    /// Creates a bus and the receiver its single consumer drains.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<StatusEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Publishes an event.
    ///
    /// If the consumer has gone away the event is dropped and this still returns immediately.
    pub fn publish(&self, ev: StatusEvent) {
        let _ = self.tx.send(ev);
    }
}
