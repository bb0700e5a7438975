//! # Line framing for both channels.
//!
//! Both channels are UTF-8 text split on `\n`.
//!
//! - **Outgoing**: a message never contains a newline once encoded; embedded
//!   newlines become spaces. On the write channel a message frame is
//!   `<encoded>\n\n`, the blank line terminating the frame.
//! - **Incoming**: one line is read up to and including its `\n` and decoded
//!   lossily, so a stray invalid byte never tears down the connection.
//!
//! ## Example
//! ```rust
//! use chatvisor::LineCodec;
//!
//! assert_eq!(LineCodec::encode("a\nb"), "a b");
//! assert_eq!(LineCodec::frame("a\nb"), "a b\n\n");
//! ```

use std::borrow::Cow;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::LinkError;

/// Stateless encoder/decoder for protocol lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineCodec;

impl LineCodec {
    /// Replaces embedded line breaks with spaces.
    pub fn encode(text: &str) -> Cow<'_, str> {
        if text.contains(['\n', '\r']) {
            Cow::Owned(text.replace("\r\n", " ").replace(['\n', '\r'], " "))
        } else {
            Cow::Borrowed(text)
        }
    }

    /// Builds a message frame: encoded text followed by the blank-line terminator.
    pub fn frame(text: &str) -> String {
        let mut out = Self::encode(text).into_owned();
        out.push_str("\n\n");
        out
    }

    /// Builds a single-line command (token, nickname, empty line).
    pub fn line(text: &str) -> String {
        let mut out = Self::encode(text).into_owned();
        out.push('\n');
        out
    }

    /// Decodes raw bytes of one received line.
    pub fn decode(bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes).into_owned()
    }

    /// Reads one line, keeping its terminator.
    ///
    /// Returns [`LinkError::Closed`] when the peer has closed the stream.
    pub async fn read_line<R>(reader: &mut R) -> Result<String, LinkError>
    where
        R: AsyncBufRead + Unpin + ?Sized,
    {
        let mut buf = Vec::new();
        let n = reader.read_until(b'\n', &mut buf).await?;
        if n == 0 {
            return Err(LinkError::Closed);
        }
        Ok(Self::decode(&buf))
    }

    /// Writes raw protocol text and flushes it.
    pub async fn send<W>(writer: &mut W, text: &str) -> Result<(), LinkError>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        writer.write_all(text.as_bytes()).await?;
        writer.flush().await?;
        Ok(())
    }
}
