//! Establishing the byte stream the client talks over.
//!
//! The connection task never opens sockets itself; it asks a [`Connector`].
//! [`TcpConnector`] is the real thing. Tests substitute in-memory streams.

use std::io;
use std::time::Duration;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tracing::{debug, warn};

/// Maximum accepted inbound line length in bytes, terminator excluded.
pub const MAX_IRC_LINE_LEN: usize = 8191;

/// Opens a duplex byte stream to `host:port`.
pub trait Connector: Send + Sync + 'static {
    /// The stream produced on success.
    type Stream: AsyncRead + AsyncWrite + Unpin + Send + 'static;

    /// Start connecting. The returned future is dropped if the attempt is
    /// cancelled or times out, which must release any half-open socket.
    fn connect(&self, host: &str, port: u16) -> BoxFuture<'static, io::Result<Self::Stream>>;
}

/// Plain TCP with OS-level keepalive enabled.
#[derive(Clone, Copy, Debug, Default)]
pub struct TcpConnector;

impl TcpConnector {
    fn enable_keepalive(stream: &TcpStream) -> io::Result<()> {
        use socket2::{SockRef, TcpKeepalive};

        let sock = SockRef::from(stream);
        let keepalive = TcpKeepalive::new()
            .with_time(Duration::from_secs(120))
            .with_interval(Duration::from_secs(30));

        sock.set_tcp_keepalive(&keepalive)
    }
}

impl Connector for TcpConnector {
    type Stream = TcpStream;

    fn connect(&self, host: &str, port: u16) -> BoxFuture<'static, io::Result<TcpStream>> {
        let host = host.to_owned();
        async move {
            let stream = TcpStream::connect((host.as_str(), port)).await?;
            if let Err(e) = Self::enable_keepalive(&stream) {
                warn!("failed to enable TCP keepalive: {}", e);
            }
            if let Err(e) = stream.set_nodelay(true) {
                debug!("failed to set TCP_NODELAY: {}", e);
            }
            Ok(stream)
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_tcp_connector_reaches_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let accept = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4];
            socket.read_exact(&mut buf).await.unwrap();
            buf
        });

        let mut stream = TcpConnector.connect("127.0.0.1", port).await.unwrap();
        stream.write_all(b"NICK").await.unwrap();
        assert_eq!(&accept.await.unwrap(), b"NICK");
    }
}
