//! # ReadSupervisor: owner of the read-only feed.
//!
//! Keeps one connection to `(host, read_port)` alive, forwards each received
//! line to the inbound queue and the history sink, and reconnects with tiered
//! backoff whenever the link fails or goes quiet.
//!
//! ## State machine
//! ```text
//!            ┌──────────────────────────────────────────────┐
//!            ▼                                              │
//!   ┌──────────────┐  ok: attempts = 0     ┌───────────┐    │
//!   │  CONNECTING  │──────────────────────►│  READING  │◄─┐ │
//!   └──────┬───────┘  publish Established  └─────┬─────┘  │ │
//!          │ refused / DNS                       │ line   │ │
//!          │                                     └────────┘ │
//!          │           timeout / i/o / EOF       │          │
//!          ▼◄────────────────────────────────────┘          │
//!   publish Initiated                                       │
//!          ▼                                                │
//!   ┌──────────────┐  notice, sleep(delay(attempts))        │
//!   │   BACKOFF    │────────────────────────────────────────┘
//!   └──────────────┘  attempts += 1
//! ```
//!
//! ## Rules
//! - The socket lives inside one session future; leaving CONNECTING/READING
//!   for any reason (failure, cancellation) drops and thereby closes it.
//! - A read bounded by [`Config::read_timeout`] that elapses counts as a link
//!   failure, same as a refused connect.
//! - Lines are forwarded in wire order; each one is appended to the history
//!   sink right after it is queued.
//! - History write failures are logged and never affect the connection.
//! - Cancellation is honored at every suspension point; the supervisor then
//!   publishes `ReadStateChanged(Closed)` and returns.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::BufReader;
use tokio::sync::mpsc;
use tokio::{select, time};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::codec::LineCodec;
use crate::config::Config;
use crate::error::LinkError;
use crate::events::{ConnectionState, StatusBus, StatusEvent};
use crate::history::{HistoryRecord, HistorySink};
use crate::policies::ReconnectPolicy;
use crate::transport::Connect;

/// Why a read session ended without error.
enum SessionEnd {
    /// Nobody is draining the inbound queue any more.
    ConsumerGone,
}

/// Supervises the read channel.
pub struct ReadSupervisor<C: Connect> {
    connector: Arc<C>,
    host: String,
    port: u16,
    read_timeout: Duration,
    reconnect: ReconnectPolicy,
    inbound: mpsc::UnboundedSender<String>,
    history: Arc<dyn HistorySink>,
    status: StatusBus,
}

impl<C: Connect> ReadSupervisor<C> {
    /// Creates a supervisor for the read endpoint of `cfg`.
    pub fn new(
        cfg: &Config,
        connector: Arc<C>,
        inbound: mpsc::UnboundedSender<String>,
        history: Arc<dyn HistorySink>,
        status: StatusBus,
    ) -> Self {
        Self {
            connector,
            host: cfg.host.clone(),
            port: cfg.read_port,
            read_timeout: cfg.read_timeout(),
            reconnect: cfg.read_reconnect,
            inbound,
            history,
            status,
        }
    }

    /// Runs until cancelled or until the inbound consumer disappears.
    pub async fn run(self, token: CancellationToken) {
        let mut attempts: u32 = 0;

        loop {
            let res = select! {
                res = self.session(&mut attempts) => res,
                _ = token.cancelled() => Err(LinkError::Canceled),
            };

            match res {
                Ok(SessionEnd::ConsumerGone) => {
                    debug!("inbound queue closed; read supervisor stopping");
                    break;
                }
                Err(LinkError::Canceled) => break,
                Err(e) => {
                    warn!(
                        direction = "read",
                        attempts,
                        kind = e.as_label(),
                        error = %e,
                        "read link failed"
                    );
                    self.status
                        .publish(StatusEvent::ReadStateChanged(ConnectionState::Initiated));
                }
            }

            if let Some(delay) = self.reconnect.delay(attempts) {
                info!(direction = "read", attempts, delay_ms = delay.as_millis() as u64, "backing off");
                if !self.deliver(Self::backoff_notice(delay)).await {
                    break;
                }
                let sleep = time::sleep(delay);
                tokio::pin!(sleep);
                select! {
                    _ = &mut sleep => {}
                    _ = token.cancelled() => break,
                }
            }
            attempts = attempts.saturating_add(1);
        }

        self.status
            .publish(StatusEvent::ReadStateChanged(ConnectionState::Closed));
    }

    /// One connection lifetime: connect, then read lines until something breaks.
    async fn session(&self, attempts: &mut u32) -> Result<SessionEnd, LinkError> {
        let stream = self
            .connector
            .connect(&self.host, self.port)
            .await
            .map_err(|source| LinkError::Connect {
                addr: format!("{}:{}", self.host, self.port),
                source,
            })?;

        *attempts = 0;
        self.status
            .publish(StatusEvent::ReadStateChanged(ConnectionState::Established));
        info!(direction = "read", host = %self.host, port = self.port, "connected");

        let mut reader = BufReader::new(stream);
        loop {
            let line = time::timeout(self.read_timeout, LineCodec::read_line(&mut reader))
                .await
                .map_err(|_elapsed| LinkError::Timeout {
                    timeout: self.read_timeout,
                })??;

            if !self.deliver(line).await {
                return Ok(SessionEnd::ConsumerGone);
            }
        }
    }

    /// Queues a line for display and persists it. Returns `false` if the queue is closed.
    async fn deliver(&self, line: String) -> bool {
        let record = HistoryRecord::now(line.clone());
        if self.inbound.send(line).is_err() {
            return false;
        }
        if let Err(e) = self.history.append(&record).await {
            warn!(error = %e, "history append failed");
        }
        true
    }

    fn backoff_notice(delay: Duration) -> String {
        format!(
            "No connection to the chat. Retrying in {} sec...\n",
            delay.as_secs()
        )
    }
}
