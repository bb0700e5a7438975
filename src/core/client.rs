//! # Client: runs both supervisors and the history replay, handles shutdown.
//!
//! The [`Client`] owns the immutable [`Config`], the transport and the history
//! store. It spawns the long-lived tasks, waits for a shutdown signal or a
//! fatal task exit, then cancels everything and waits for sockets to close.
//!
//! ## High-level architecture
//! ```text
//! Inputs to run():
//!   EnginePorts { inbound, outbound, status }
//!
//! Spawned tasks (JoinSet):
//!   "read"  : HistoryLoader::run() ──► ReadSupervisor::run(child_token)
//!   "write" : WriteSupervisor::run(child_token) ──► Result<(), RuntimeError>
//!
//! Exit paths:
//!   shutdown signal ─────────────┐
//!   write task fatal error ──────┼──► runtime_token.cancel()
//!   task panicked ───────────────┘         └─► wait_all_with_grace(cfg.grace)
//!                                                 ├─ all joined → outcome
//!                                                 └─ timeout    → GraceExceeded
//!   all tasks ended on their own ──► outcome
//! ```
//!
//! The history replay runs inside the read task, ahead of the read supervisor,
//! so the replayed blob is always the first inbound item.
//!
//! [`Client::send_once`] skips all of the above: one write connection, one
//! message, no reconnect.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::{Id, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::auth::AccountInfo;
use crate::config::Config;
use crate::core::{reader::ReadSupervisor, shutdown, writer::WriteSupervisor};
use crate::error::RuntimeError;
use crate::events::StatusBus;
use crate::history::{FileHistory, HistoryLoader, HistorySink, HistorySource, NoHistory};
use crate::ports::EnginePorts;
use crate::transport::{Connect, TcpConnector};

const READ_TASK: &str = "read";
const WRITE_TASK: &str = "write";

type TaskExit = Result<(), RuntimeError>;

/// Names of the tasks still in the set, keyed by task id.
type Running = HashMap<Id, &'static str>;

/// Chat client: wires the supervisors to the queue boundary.
pub struct Client<C: Connect = TcpConnector> {
    cfg: Config,
    connector: Arc<C>,
    sink: Arc<dyn HistorySink>,
    source: Arc<dyn HistorySource>,
}

impl Client<TcpConnector> {
    /// Creates a TCP client; history goes to `cfg.history_path` if set.
    pub fn new(cfg: Config) -> Self {
        Self::with_connector(cfg, TcpConnector)
    }
}

impl<C: Connect> Client<C> {
    /// Creates a client over a custom transport.
    pub fn with_connector(cfg: Config, connector: C) -> Self {
        let (sink, source): (Arc<dyn HistorySink>, Arc<dyn HistorySource>) =
            match &cfg.history_path {
                Some(path) => {
                    let file = Arc::new(FileHistory::new(path.clone()));
                    (
                        file.clone() as Arc<dyn HistorySink>,
                        file as Arc<dyn HistorySource>,
                    )
                }
                None => (
                    Arc::new(NoHistory) as Arc<dyn HistorySink>,
                    Arc::new(NoHistory) as Arc<dyn HistorySource>,
                ),
            };
        Self {
            cfg,
            connector: Arc::new(connector),
            sink,
            source,
        }
    }

    /// Replaces the history store.
    pub fn with_history(
        mut self,
        sink: Arc<dyn HistorySink>,
        source: Arc<dyn HistorySource>,
    ) -> Self {
        self.sink = sink;
        self.source = source;
        self
    }

    /// Sends one message over a fresh write connection and returns the account
    /// it was sent from.
    ///
    /// Neither the read channel nor history is involved. See
    /// [`WriteSupervisor::send_once`] for the error cases.
    pub async fn send_once(self, message: &str) -> Result<AccountInfo, RuntimeError> {
        let (_outbound_tx, outbound) = mpsc::unbounded_channel();
        let (status, _events) = StatusBus::new();
        WriteSupervisor::new(&self.cfg, self.connector, outbound, status)
            .send_once(message)
            .await
    }

    /// Runs until an OS termination signal arrives or a fatal error occurs.
    pub async fn run(self, ports: EnginePorts) -> Result<(), RuntimeError> {
        let signal = async {
            match shutdown::wait_for_shutdown_signal().await {
                Ok(name) => info!(signal = name, "shutdown requested"),
                Err(e) => {
                    warn!(error = %e, "cannot listen for shutdown signals");
                    std::future::pending::<()>().await;
                }
            }
        };
        self.run_until(ports, signal).await
    }

    /// Runs until `shutdown` completes or a fatal error occurs.
    pub async fn run_until<F>(self, ports: EnginePorts, shutdown: F) -> Result<(), RuntimeError>
    where
        F: Future<Output = ()>,
    {
        let Self {
            cfg,
            connector,
            sink,
            source,
        } = self;
        let token = CancellationToken::new();
        let mut set: JoinSet<TaskExit> = JoinSet::new();
        let mut running = Running::new();

        let loader = HistoryLoader::new(source, ports.inbound.clone());
        let reader = ReadSupervisor::new(
            &cfg,
            Arc::clone(&connector),
            ports.inbound,
            sink,
            ports.status.clone(),
        );
        let writer = WriteSupervisor::new(&cfg, connector, ports.outbound, ports.status);

        let read_token = token.child_token();
        let read = set.spawn(async move {
            loader.run().await;
            reader.run(read_token).await;
            Ok(())
        });
        running.insert(read.id(), READ_TASK);
        let write_token = token.child_token();
        let write = set.spawn(async move { writer.run(write_token).await });
        running.insert(write.id(), WRITE_TASK);

        info!(
            read = %cfg.read_addr(),
            write = %cfg.write_addr(),
            "client started"
        );

        let mut outcome = Ok(());
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                joined = set.join_next_with_id() => match joined {
                    None => return outcome,
                    Some(Ok((id, Ok(())))) => {
                        let name = running.remove(&id).unwrap_or("unknown");
                        debug!(task = name, "task finished");
                    }
                    Some(Ok((id, Err(e)))) => {
                        let name = running.remove(&id).unwrap_or("unknown");
                        error!(task = name, kind = e.as_label(), error = %e, "task failed");
                        outcome = Err(e);
                        break;
                    }
                    Some(Err(e)) => {
                        let name = running.remove(&e.id()).unwrap_or("unknown");
                        error!(task = name, error = %e, "task panicked");
                        outcome = Err(RuntimeError::Panicked { reason: e.to_string() });
                        break;
                    }
                },
            }
        }

        token.cancel();
        wait_all_with_grace(cfg.grace, &mut set, &mut running).await?;
        info!("client stopped");
        outcome
    }
}

/// Waits for all tasks to finish within `grace`.
///
/// On timeout the remaining tasks are aborted and reported as stuck.
async fn wait_all_with_grace(
    grace: Duration,
    set: &mut JoinSet<TaskExit>,
    running: &mut Running,
) -> Result<(), RuntimeError> {
    let done = async {
        while let Some(joined) = set.join_next_with_id().await {
            let id = match joined {
                Ok((id, _)) => id,
                Err(e) => e.id(),
            };
            running.remove(&id);
        }
    };

    let timed = tokio::time::timeout(grace, done).await;
    match timed {
        Ok(()) => Ok(()),
        Err(_) => {
            set.abort_all();
            let mut stuck: Vec<String> = running.values().map(|n| n.to_string()).collect();
            stuck.sort();
            Err(RuntimeError::GraceExceeded { grace, stuck })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn explode() -> TaskExit {
        panic!("boom")
    }

    #[tokio::test(start_paused = true)]
    async fn grace_report_skips_tasks_that_already_died() {
        let mut set: JoinSet<TaskExit> = JoinSet::new();
        let mut running = Running::new();
        let dead = set.spawn(explode());
        running.insert(dead.id(), "dead");
        let hung = set.spawn(std::future::pending());
        running.insert(hung.id(), "hung");

        let res = wait_all_with_grace(Duration::from_secs(1), &mut set, &mut running).await;
        match res {
            Err(RuntimeError::GraceExceeded { stuck, .. }) => assert_eq!(stuck, ["hung"]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn grace_drain_succeeds_when_everything_stops() {
        let mut set: JoinSet<TaskExit> = JoinSet::new();
        let mut running = Running::new();
        let done = set.spawn(async { Ok(()) });
        running.insert(done.id(), "done");

        let res = wait_all_with_grace(Duration::from_secs(1), &mut set, &mut running).await;
        assert!(res.is_ok());
        assert!(running.is_empty());
    }
}
