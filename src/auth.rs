//! # Write-channel handshake: token authorization and registration.
//!
//! After the server greeting, the write channel must be bound to an account
//! before it carries user messages.
//!
//! ## Token flow
//! ```text
//! client ── "<token>\n" ─────────────► server
//! client ◄─ {"nickname": ...} | null ─ server
//! ```
//!
//! ## Registration flow
//! ```text
//! client ── "\n" ────────────────────► server
//! client ◄─ prompt line ────────────── server
//! client ── "<nickname>\n" ──────────► server
//! client ◄─ {"nickname": ..., "token": ...}
//! ```
//!
//! ## Rules
//! - Exactly one request/reply per step; no retry inside this module.
//! - The literal `null` reply means the token is invalid; nothing else is sent.
//! - Any other reply that is not an account object is [`LinkError::Malformed`].

use serde::Deserialize;
use serde_json::{Map, Value};
use tokio::io::{AsyncBufRead, AsyncWrite};
use tracing::debug;

use crate::codec::LineCodec;
use crate::error::LinkError;

/// Reply sent by the server for an unknown token.
const INVALID_TOKEN_SENTINEL: &str = "null";

/// Field some servers use for the issued token instead of `token`.
const LEGACY_TOKEN_FIELD: &str = "account_hash";

/// Account bound to the write channel.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AccountInfo {
    /// Display name.
    pub nickname: String,
    /// Token issued by registration; absent after plain authorization.
    ///
    /// Read from `token`, or from `account_hash` when `token` is missing.
    #[serde(default)]
    pub token: Option<String>,
    /// Any other fields supplied by the server.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Authorizes the connection with an existing token.
///
/// Sends `<token>\n`, flushes, and reads one reply line.
///
/// # Errors
/// - [`LinkError::InvalidToken`] when the server answers `null`;
/// - [`LinkError::Malformed`] when the reply is not an account object;
/// - connection-level errors from the underlying stream.
pub async fn authorize<S>(conn: &mut S, token: &str) -> Result<AccountInfo, LinkError>
where
    S: AsyncBufRead + AsyncWrite + Unpin + ?Sized,
{
    LineCodec::send(conn, &LineCodec::line(token)).await?;
    let reply = LineCodec::read_line(conn).await?;
    let account = parse_account(&reply)?;
    debug!(nickname = %account.nickname, "authorized");
    Ok(account)
}

/// Registers a new account under `nickname`.
///
/// Sends an empty token line, consumes the server prompt, sends the nickname
/// and reads the issued account.
pub async fn register<S>(conn: &mut S, nickname: &str) -> Result<AccountInfo, LinkError>
where
    S: AsyncBufRead + AsyncWrite + Unpin + ?Sized,
{
    LineCodec::send(conn, "\n").await?;
    let prompt = LineCodec::read_line(conn).await?;
    debug!(prompt = %prompt.trim_end(), "registration prompt");

    LineCodec::send(conn, &LineCodec::line(nickname)).await?;
    let reply = LineCodec::read_line(conn).await?;
    match parse_account(&reply) {
        Ok(account) => {
            debug!(nickname = %account.nickname, "registered");
            Ok(account)
        }
        Err(LinkError::InvalidToken) => Err(LinkError::Malformed {
            line: reply,
            error: "registration answered null".to_string(),
        }),
        Err(e) => Err(e),
    }
}

/// Parses one handshake reply line.
fn parse_account(line: &str) -> Result<AccountInfo, LinkError> {
    let trimmed = line.trim_end_matches(['\n', '\r']);
    if trimmed == INVALID_TOKEN_SENTINEL {
        return Err(LinkError::InvalidToken);
    }
    let mut account: AccountInfo =
        serde_json::from_str(trimmed).map_err(|e| LinkError::Malformed {
            line: line.to_string(),
            error: e.to_string(),
        })?;
    if account.token.is_none() {
        account.token = account
            .extra
            .get(LEGACY_TOKEN_FIELD)
            .and_then(Value::as_str)
            .map(str::to_string);
    }
    Ok(account)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader, duplex};

    #[test]
    fn parse_keeps_extra_fields() {
        let account =
            parse_account("{\"nickname\":\"Bob\",\"account_hash\":\"abc\",\"karma\":3}\n").unwrap();
        assert_eq!(account.nickname, "Bob");
        assert_eq!(account.token.as_deref(), Some("abc"));
        assert_eq!(account.extra.get("karma"), Some(&Value::from(3)));
    }

    #[test]
    fn parse_prefers_token_when_both_fields_are_present() {
        let account = parse_account(
            "{\"nickname\":\"Ann\",\"token\":\"t-1\",\"account_hash\":\"legacy\"}\n",
        )
        .unwrap();
        assert_eq!(account.nickname, "Ann");
        assert_eq!(account.token.as_deref(), Some("t-1"));
        assert_eq!(account.extra.get("account_hash"), Some(&Value::from("legacy")));
    }

    #[test]
    fn parse_ignores_non_string_legacy_token() {
        let account = parse_account("{\"nickname\":\"Ann\",\"account_hash\":42}\n").unwrap();
        assert_eq!(account.token, None);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(matches!(
            parse_account("not json\n"),
            Err(LinkError::Malformed { .. })
        ));
        assert!(matches!(
            parse_account("{\"name\":\"Bob\"}\n"),
            Err(LinkError::Malformed { .. })
        ));
    }

    #[tokio::test]
    async fn authorize_returns_account() {
        let (client, server) = duplex(1024);
        let mut client = BufReader::new(client);
        let mut server = BufReader::new(server);

        let srv = tokio::spawn(async move {
            let line = LineCodec::read_line(&mut server).await.unwrap();
            assert_eq!(line, "secret\n");
            server
                .write_all(b"{\"nickname\":\"Bob\"}\n")
                .await
                .unwrap();
            server
        });

        let account = authorize(&mut client, "secret").await.unwrap();
        assert_eq!(account.nickname, "Bob");
        assert_eq!(account.token, None);
        srv.await.unwrap();
    }

    #[tokio::test]
    async fn authorize_null_is_invalid_token_without_further_io() {
        let (client, server) = duplex(1024);
        let mut client = BufReader::new(client);
        let mut server = BufReader::new(server);

        server.write_all(b"null\n").await.unwrap();
        let res = authorize(&mut client, "stale").await;
        assert!(matches!(res, Err(LinkError::InvalidToken)));
        drop(client);

        let mut rest = String::new();
        server.read_to_string(&mut rest).await.unwrap();
        assert_eq!(rest, "stale\n");
    }

    #[tokio::test]
    async fn register_walks_the_exchange() {
        let (client, server) = duplex(1024);
        let mut client = BufReader::new(client);
        let mut server = BufReader::new(server);

        let srv = tokio::spawn(async move {
            assert_eq!(LineCodec::read_line(&mut server).await.unwrap(), "\n");
            server.write_all(b"Enter preferred nickname below:\n").await.unwrap();
            assert_eq!(LineCodec::read_line(&mut server).await.unwrap(), "Ann Lee\n");
            server
                .write_all(b"{\"nickname\":\"Ann Lee\",\"account_hash\":\"t-1\"}\n")
                .await
                .unwrap();
            server
        });

        let account = register(&mut client, "Ann\nLee").await.unwrap();
        assert_eq!(account.nickname, "Ann Lee");
        assert_eq!(account.token.as_deref(), Some("t-1"));
        srv.await.unwrap();
    }

    #[tokio::test]
    async fn register_null_is_malformed() {
        let (client, server) = duplex(1024);
        let mut client = BufReader::new(client);
        let mut server = BufReader::new(server);

        server.write_all(b"prompt\nnull\n").await.unwrap();
        let res = register(&mut client, "Ann").await;
        assert!(matches!(res, Err(LinkError::Malformed { .. })));
        drop(server);
    }
}
