//! # WriteSupervisor: owner of the write channel.
//!
//! Connects to `(host, write_port)`, binds the connection to an account via
//! the handshake, then forwards messages from the outbound queue as frames.
//!
//! ## State machine
//! ```text
//!   ┌──────────────┐ ok: publish Established ┌───────────────┐ token  ┌─────────┐
//!   │  CONNECTING  │────────────────────────►│  HANDSHAKING  │───────►│ SENDING │◄─┐
//!   └──────────────┘   read greeting         └───────────────┘ or reg └────┬────┘  │
//!          ▲                                         │                    │ frame  │
//!          │                                         │ InvalidToken /     └────────┘
//!          │  i/o failure anywhere                   │ Malformed
//!          │  publish Initiated                      ▼
//!          └──────────────────────────────── fatal: return Err to the client
//! ```
//!
//! ## Rules
//! - Reconnects follow [`Config::write_reconnect`], `Immediate` by default:
//!   this path idles on the outbound queue rather than on the wire, so it has
//!   no timed poll to slow down.
//! - Token flow publishes `NicknameReceived`; registration does too and keeps
//!   the issued token for later reconnects.
//! - Without a token or a configured nickname, the first non-blank outbound
//!   message is taken as the nickname to register with.
//! - A message whose write failed is sent first after the next handshake.
//! - The socket lives inside one session future and is dropped on every exit.
//! - `InvalidToken` and `Malformed` are never retried.
//! - [`WriteSupervisor::send_once`] runs a single connection for one message
//!   and returns whatever goes wrong instead of reconnecting.

use std::sync::Arc;

use tokio::io::BufReader;
use tokio::sync::mpsc;
use tokio::{select, time};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::auth::{self, AccountInfo};
use crate::codec::LineCodec;
use crate::config::Config;
use crate::error::{ConfigError, LinkError, RuntimeError};
use crate::events::{ConnectionState, StatusBus, StatusEvent};
use crate::policies::ReconnectPolicy;
use crate::transport::Connect;

/// Supervises the write channel.
pub struct WriteSupervisor<C: Connect> {
    connector: Arc<C>,
    host: String,
    port: u16,
    reconnect: ReconnectPolicy,
    token: Option<String>,
    nickname: Option<String>,
    outbound: mpsc::UnboundedReceiver<String>,
    status: StatusBus,
    /// Message popped from the queue whose write did not complete.
    pending: Option<String>,
}

impl<C: Connect> WriteSupervisor<C> {
    /// Creates a supervisor for the write endpoint of `cfg`.
    pub fn new(
        cfg: &Config,
        connector: Arc<C>,
        outbound: mpsc::UnboundedReceiver<String>,
        status: StatusBus,
    ) -> Self {
        Self {
            connector,
            host: cfg.host.clone(),
            port: cfg.write_port,
            reconnect: cfg.write_reconnect,
            token: cfg.token.clone(),
            nickname: cfg.nickname.clone(),
            outbound,
            status,
            pending: None,
        }
    }

    /// Runs until cancelled, until the outbound queue closes, or until the server
    /// rejects the handshake.
    ///
    /// # Errors
    /// - [`RuntimeError::Unauthorized`] when the token is rejected;
    /// - [`RuntimeError::Protocol`] when a handshake reply is malformed.
    pub async fn run(mut self, token: CancellationToken) -> Result<(), RuntimeError> {
        let mut attempts: u32 = 0;

        loop {
            let res = select! {
                res = self.session(&mut attempts) => res,
                _ = token.cancelled() => Err(LinkError::Canceled),
            };

            match res {
                Ok(()) => {
                    debug!("outbound queue closed; write supervisor stopping");
                    break;
                }
                Err(LinkError::Canceled) => break,
                Err(e) if e.is_retryable() => {
                    warn!(
                        direction = "write",
                        attempts,
                        kind = e.as_label(),
                        error = %e,
                        "write link failed"
                    );
                    self.status
                        .publish(StatusEvent::SendStateChanged(ConnectionState::Initiated));
                }
                Err(e) => {
                    error!(direction = "write", kind = e.as_label(), error = %e, "handshake rejected");
                    self.status
                        .publish(StatusEvent::SendStateChanged(ConnectionState::Closed));
                    return Err(e.into());
                }
            }

            if let Some(delay) = self.reconnect.delay(attempts) {
                info!(direction = "write", attempts, delay_ms = delay.as_millis() as u64, "backing off");
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
            .publish(StatusEvent::SendStateChanged(ConnectionState::Closed));
        Ok(())
    }

    /// Connects, authorizes or registers, and sends `message` as one frame.
    ///
    /// A single attempt with no retry: any failure is returned. The
    /// connection is closed before this returns.
    ///
    /// # Errors
    /// - [`RuntimeError::Config`] when there is neither a token nor a nickname;
    /// - [`RuntimeError::Unauthorized`] when the token is rejected;
    /// - [`RuntimeError::Protocol`] when a handshake reply is malformed;
    /// - [`RuntimeError::Link`] when the server cannot be reached or drops the link.
    pub async fn send_once(mut self, message: &str) -> Result<AccountInfo, RuntimeError> {
        if self.token.is_none() && self.nickname.is_none() {
            return Err(ConfigError::NicknameRequired.into());
        }

        let res = async {
            let mut attempts = 0;
            let (mut conn, account) = self.open(&mut attempts).await?;
            LineCodec::send(&mut conn, &LineCodec::frame(message)).await?;
            debug!(message = %message, "sent");
            Ok::<_, LinkError>(account)
        }
        .await;

        self.status
            .publish(StatusEvent::SendStateChanged(ConnectionState::Closed));
        res.map_err(RuntimeError::from)
    }

    /// One connection lifetime. `Ok(())` means the outbound queue closed.
    async fn session(&mut self, attempts: &mut u32) -> Result<(), LinkError> {
        if self.token.is_none() && self.nickname.is_none() {
            info!("no token configured; waiting for a nickname to register with");
            loop {
                let Some(candidate) = self.outbound.recv().await else {
                    return Ok(());
                };
                let nickname = LineCodec::encode(&candidate).trim().to_string();
                if nickname.is_empty() {
                    debug!("ignoring blank nickname");
                    continue;
                }
                self.nickname = Some(nickname);
                break;
            }
        }

        let (mut conn, _account) = self.open(attempts).await?;

        loop {
            let message = match self.pending.take() {
                Some(message) => message,
                None => match self.outbound.recv().await {
                    Some(message) => message,
                    None => return Ok(()),
                },
            };
            debug!(message = %message, "sending");
            if let Err(e) = LineCodec::send(&mut conn, &LineCodec::frame(&message)).await {
                self.pending = Some(message);
                return Err(e);
            }
        }
    }

    /// Connects, consumes the greeting and binds the connection to an account.
    async fn open(
        &mut self,
        attempts: &mut u32,
    ) -> Result<(BufReader<C::Stream>, AccountInfo), LinkError> {
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
            .publish(StatusEvent::SendStateChanged(ConnectionState::Established));
        info!(direction = "write", host = %self.host, port = self.port, "connected");

        let mut conn = BufReader::new(stream);
        let greeting = LineCodec::read_line(&mut conn).await?;
        debug!(greeting = %greeting.trim_end(), "server ready");

        let account = self.handshake(&mut conn).await?;
        self.status
            .publish(StatusEvent::NicknameReceived(account.nickname.clone()));
        Ok((conn, account))
    }

    /// Binds the connection to an account: token flow if a token is known, registration otherwise.
    async fn handshake<S>(&mut self, conn: &mut S) -> Result<AccountInfo, LinkError>
    where
        S: tokio::io::AsyncBufRead + tokio::io::AsyncWrite + Unpin + Send,
    {
        if let Some(token) = self.token.as_deref() {
            let account = auth::authorize(conn, token).await?;
            info!(nickname = %account.nickname, "authorized");
            return Ok(account);
        }

        let nickname = self.nickname.clone().unwrap_or_default();
        let account = auth::register(conn, &nickname).await?;
        match account.token.as_deref() {
            Some(issued) => {
                info!(nickname = %account.nickname, token = %issued, "registered; reuse this token with --token");
                self.token = Some(issued.to_string());
            }
            None => warn!(nickname = %account.nickname, "registration reply carried no token"),
        }
        Ok(account)
    }
}
