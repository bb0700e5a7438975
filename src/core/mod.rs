//! Connection engine: supervisors and orchestration.
//!
//! The only public API from this module is [`Client`], which wires the
//! supervisors to the queue boundary and handles shutdown. The supervisors are
//! exported for callers that assemble their own runtime.
//!
//! Internal modules:
//! - [`reader`]: read-channel state machine with tiered backoff;
//! - [`writer`]: write-channel state machine with handshake and framing;
//! - [`client`]: spawns tasks, waits for signal or fatal exit, graceful stop;
//! - [`shutdown`]: cross-platform termination signal handling.

mod client;
mod reader;
mod shutdown;
mod writer;

pub use client::Client;
pub use reader::ReadSupervisor;
pub use writer::WriteSupervisor;
