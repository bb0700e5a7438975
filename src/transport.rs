//! # Transport seam.
//!
//! The supervisors never dial sockets directly; they ask a [`Connect`]
//! implementation for a fresh duplex stream on every attempt. The default
//! [`TcpConnector`] opens plain TCP; tests and callers that bring their own
//! transport (TLS, proxies, in-memory pipes) plug in here.

use std::io;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;

/// # Opens duplex byte streams.
///
/// Each call returns a new, exclusively owned stream; the caller closes it by dropping it.
///
/// # Example
/// ```
/// use std::io;
/// use async_trait::async_trait;
/// use tokio::io::DuplexStream;
/// use chatvisor::Connect;
///
/// struct Refusing;
///
/// #[async_trait]
/// impl Connect for Refusing {
///     type Stream = DuplexStream;
///
///     async fn connect(&self, _host: &str, _port: u16) -> io::Result<DuplexStream> {
///         Err(io::ErrorKind::ConnectionRefused.into())
///     }
/// }
/// ```
#[async_trait]
pub trait Connect: Send + Sync + 'static {
    /// Stream type produced by this transport.
    type Stream: AsyncRead + AsyncWrite + Unpin + Send + 'static;

    /// Opens a stream to `host:port`.
    async fn connect(&self, host: &str, port: u16) -> io::Result<Self::Stream>;
}

/// Plain TCP transport.
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpConnector;

#[async_trait]
impl Connect for TcpConnector {
    type Stream = TcpStream;

    async fn connect(&self, host: &str, port: u16) -> io::Result<TcpStream> {
        let stream = TcpStream::connect((host, port)).await?;
        stream.set_nodelay(true)?;
        Ok(stream)
    }
}
