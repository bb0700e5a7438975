//! Status events: types and queue.
//!
//! This module groups the status **data model** and the **bus** used to
//! publish connection-state changes from the supervisors to the presentation
//! layer.
//!
//! ## Contents
//! - [`ConnectionState`], [`StatusEvent`] event vocabulary
//! - [`StatusBus`] thin wrapper over an unbounded `tokio::sync::mpsc` channel
//!
//! ## Quick reference
//! - **Publishers**: `ReadSupervisor`, `WriteSupervisor`.
//! - **Consumer**: the presentation layer, via [`PresenterPorts`](crate::PresenterPorts).

mod bus;
mod event;

pub use bus::StatusBus;
pub use event::{ConnectionState, StatusEvent};
