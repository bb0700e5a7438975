//! # chatvisor
//!
//! **chatvisor** is a resilient client for a line-oriented, text-based chat
//! protocol spread over two TCP connections: a read-only feed and a write
//! channel that must be authorized (or registered) before it carries messages.
//!
//! Each direction is owned by its own supervisor task that reconnects on its
//! own schedule. Tasks never share mutable state; they talk to the
//! presentation layer through three unbounded queues.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   ┌────────────────┐                           ┌────────────────┐
//!   │ ReadSupervisor │ ◄── (host, read_port)     │WriteSupervisor │ ◄── (host, write_port)
//!   │ connect / read │                           │ connect /      │
//!   │ / backoff      │                           │ handshake /    │
//!   └──┬──────┬───┬──┘                           │ send           │
//!      │      │   │                              └──┬──────────▲──┘
//!      │      │   └──► HistorySink (append)         │          │
//!      │      │                                     │          │
//!      │      ▼  status (StatusBus)                 ▼          │ outbound
//!      │   ┌───────────────────────────────────────────┐       │
//!      │   │      unbounded mpsc<StatusEvent>          │       │
//!      │   └───────────────────┬───────────────────────┘       │
//!      ▼  inbound              ▼                                │
//!   ┌─────────────────────────────────────────────────────────────┐
//!   │                 presentation layer (any)                    │
//!   └─────────────────────────────────────────────────────────────┘
//!      ▲
//!      └── HistoryLoader (one shot, before the first live line)
//! ```
//!
//! ### Read path
//! ```text
//! loop {
//!   ├─► connect(host, read_port)
//!   │     ├─ Ok  ──► attempts = 0, publish ReadStateChanged(Established)
//!   │     │          └─► loop: read_line (≤ 5s) ──► inbound + history
//!   │     └─ Err ──► publish ReadStateChanged(Initiated)
//!   ├─► notice "retrying in N sec" ──► inbound + history
//!   ├─► sleep(BackoffPolicy::delay(attempts))   3s / 10s / 20s
//!   └─► attempts += 1
//! }
//! ```
//!
//! ### Write path
//! ```text
//! loop {
//!   ├─► connect(host, write_port) ──► publish SendStateChanged(Established)
//!   ├─► read greeting
//!   ├─► token?  authorize ──► NicknameReceived      | null ──► fatal Unauthorized
//!   │   none?   register  ──► NicknameReceived, keep issued token
//!   ├─► loop: outbound.recv() ──► "<text>\n\n"
//!   └─► on i/o failure: publish SendStateChanged(Initiated), reconnect at once
//! }
//! ```
//!
//! ## Features
//! | Area              | Description                                              | Key types                                  |
//! |-------------------|----------------------------------------------------------|--------------------------------------------|
//! | **Client**        | Spawns supervisors, handles signals and graceful stop.   | [`Client`]                                 |
//! | **Supervisors**   | Per-direction reconnect state machines.                  | [`ReadSupervisor`], [`WriteSupervisor`]    |
//! | **Policies**      | Tiered backoff, per-direction reconnect policy.          | [`BackoffPolicy`], [`ReconnectPolicy`]     |
//! | **Protocol**      | Line framing and the handshake.                          | [`LineCodec`], [`AccountInfo`]             |
//! | **Boundary**      | Queues shared with the presentation layer.               | [`EnginePorts`], [`PresenterPorts`]        |
//! | **History**       | Append-only store and one-shot replay.                   | [`HistorySink`], [`FileHistory`]           |
//! | **Errors**        | Transient vs fatal classification.                       | [`LinkError`], [`RuntimeError`]            |
//! | **Configuration** | Immutable settings, CLI/env front end.                   | [`Config`], [`Cli`]                        |
//!
//! ## Example
//! ```rust,no_run
//! use chatvisor::{Client, Config};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = Config {
//!         host: "chat.example.org".into(),
//!         token: Some("my-token".into()),
//!         ..Config::default()
//!     };
//!
//!     let (engine, mut presenter) = chatvisor::channel();
//!     tokio::spawn(async move {
//!         while let Some(line) = presenter.inbound.recv().await {
//!             print!("{line}");
//!         }
//!     });
//!
//!     Client::new(cfg).run(engine).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
mod cli;
mod codec;
mod config;
mod core;
mod error;
mod events;
mod history;
mod policies;
mod ports;
mod transport;

// ---- Public re-exports ----

pub use auth::AccountInfo;
pub use cli::Cli;
pub use codec::LineCodec;
pub use config::{Config, DEFAULT_READ_TIMEOUT};
pub use crate::core::{Client, ReadSupervisor, WriteSupervisor};
pub use error::{ConfigError, LinkError, RuntimeError};
pub use events::{ConnectionState, StatusBus, StatusEvent};
pub use history::{FileHistory, HistoryLoader, HistoryRecord, HistorySink, HistorySource, NoHistory};
pub use policies::{BackoffPolicy, ReconnectPolicy};
pub use ports::{EnginePorts, PresenterPorts, channel};
pub use transport::{Connect, TcpConnector};
