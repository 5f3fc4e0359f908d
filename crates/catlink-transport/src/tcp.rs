//! TCP transport.
//!
//! [`TcpTransport`] carries the rig's native byte stream over a socket: a
//! serial-to-network bridge such as ser2net, a remote station's port
//! server, or a simulator. Framing is untouched, so every backend works
//! over TCP exactly as it does over a local serial port.
//!
//! # Example
//!
//! ```no_run
//! use catlink_transport::TcpTransport;
//! use catlink_core::transport::Transport;
//! use std::time::Duration;
//!
//! # async fn example() -> catlink_core::Result<()> {
//! let mut transport = TcpTransport::connect("192.168.1.50:4001").await?;
//! transport.send(b"FA;").await?;
//! let mut buf = [0u8; 64];
//! let n = transport.receive(&mut buf, Duration::from_secs(1)).await?;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use catlink_core::error::{Error, Result};
use catlink_core::framer::to_hex;
use catlink_core::transport::Transport;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Transport over a TCP stream.
#[derive(Debug)]
pub struct TcpTransport {
    stream: Option<TcpStream>,
    addr: String,
}

impl TcpTransport {
    /// Connect to `addr` (`host:port`) with a 5 second deadline.
    pub async fn connect(addr: &str) -> Result<Self> {
        Self::connect_with_timeout(addr, DEFAULT_CONNECT_TIMEOUT).await
    }

    pub async fn connect_with_timeout(addr: &str, timeout: Duration) -> Result<Self> {
        tracing::debug!(addr = %addr, timeout_ms = timeout.as_millis() as u64, "connecting");

        let stream = tokio::time::timeout(timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| {
                tracing::error!(addr = %addr, "TCP connect timed out");
                Error::Timeout
            })?
            .map_err(|e| {
                tracing::error!(addr = %addr, error = %e, "TCP connect failed");
                map_connect_error(e, addr)
            })?;

        // Frames are a few bytes each; don't let Nagle hold them back.
        if let Err(e) = stream.set_nodelay(true) {
            tracing::warn!(addr = %addr, error = %e, "failed to set TCP_NODELAY");
        }

        tracing::info!(addr = %addr, "TCP connection established");
        Ok(TcpTransport {
            stream: Some(stream),
            addr: addr.to_string(),
        })
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;
        tracing::trace!(addr = %self.addr, bytes = %to_hex(data), "tcp write");

        stream.write_all(data).await.map_err(|e| {
            tracing::error!(addr = %self.addr, error = %e, "tcp write failed");
            map_io_error(e)
        })?;
        stream.flush().await.map_err(map_io_error)
    }

    async fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize> {
        let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;

        match tokio::time::timeout(timeout, stream.read(buf)).await {
            Ok(Ok(0)) => {
                tracing::warn!(addr = %self.addr, "peer closed connection");
                Err(Error::ConnectionLost)
            }
            Ok(Ok(n)) => {
                tracing::trace!(addr = %self.addr, bytes = %to_hex(&buf[..n]), "tcp read");
                Ok(n)
            }
            Ok(Err(e)) => {
                tracing::error!(addr = %self.addr, error = %e, "tcp read failed");
                Err(map_io_error(e))
            }
            Err(_) => Err(Error::Timeout),
        }
    }

    /// Drain whatever the socket already holds without waiting.
    async fn clear_input(&mut self) -> Result<()> {
        let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;
        let mut scratch = [0u8; 512];
        let mut dropped = 0usize;
        loop {
            match stream.try_read(&mut scratch) {
                Ok(0) => return Err(Error::ConnectionLost),
                Ok(n) => dropped += n,
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => break,
                Err(e) => return Err(map_io_error(e)),
            }
        }
        if dropped > 0 {
            tracing::debug!(addr = %self.addr, dropped, "discarded stale input");
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.shutdown().await {
                tracing::warn!(addr = %self.addr, error = %e, "TCP shutdown failed");
            }
            tracing::info!(addr = %self.addr, "TCP connection closed");
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }
}

fn map_connect_error(e: std::io::Error, addr: &str) -> Error {
    match e.kind() {
        std::io::ErrorKind::ConnectionRefused => {
            Error::Transport(format!("connection refused: {addr}"))
        }
        _ => Error::Io(e),
    }
}

fn map_io_error(e: std::io::Error) -> Error {
    match e.kind() {
        std::io::ErrorKind::ConnectionReset
        | std::io::ErrorKind::BrokenPipe
        | std::io::ErrorKind::NotConnected
        | std::io::ErrorKind::ConnectionAborted => Error::ConnectionLost,
        _ => Error::Io(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    async fn listener() -> (TcpListener, String) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        (listener, addr)
    }

    #[tokio::test]
    async fn newcat_round_trip() {
        let (listener, addr) = listener().await;
        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 16];
            let n = stream.read(&mut buf).await.unwrap();
            assert_eq!(&buf[..n], b"FA;");
            stream.write_all(b"FA014074000;").await.unwrap();
        });

        let mut transport = TcpTransport::connect(&addr).await.unwrap();
        transport.send(b"FA;").await.unwrap();

        let mut buf = [0u8; 64];
        let mut got = Vec::new();
        while !got.ends_with(b";") {
            let n = transport
                .receive(&mut buf, Duration::from_secs(2))
                .await
                .unwrap();
            got.extend_from_slice(&buf[..n]);
        }
        assert_eq!(got, b"FA014074000;");

        transport.close().await.unwrap();
        server.await.unwrap();
    }

    #[tokio::test]
    async fn clear_input_discards_unsolicited_bytes() {
        let (listener, addr) = listener().await;
        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            stream.write_all(b"IF001407400;").await.unwrap();
            tokio::time::sleep(Duration::from_secs(2)).await;
        });

        let mut transport = TcpTransport::connect(&addr).await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        transport.clear_input().await.unwrap();

        let mut buf = [0u8; 64];
        let result = transport.receive(&mut buf, Duration::from_millis(50)).await;
        assert!(matches!(result, Err(Error::Timeout)));
        server.abort();
    }

    #[tokio::test]
    async fn receive_times_out_on_silence() {
        let (listener, addr) = listener().await;
        let server = tokio::spawn(async move {
            let (_stream, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let mut transport = TcpTransport::connect(&addr).await.unwrap();
        let mut buf = [0u8; 8];
        let result = transport.receive(&mut buf, Duration::from_millis(100)).await;
        assert!(matches!(result, Err(Error::Timeout)));
        server.abort();
    }

    #[tokio::test]
    async fn connect_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        match TcpTransport::connect(&addr).await {
            Err(Error::Transport(msg)) => assert!(msg.contains("connection refused")),
            other => panic!("expected Transport error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn peer_close_is_connection_lost() {
        let (listener, addr) = listener().await;
        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            drop(stream);
        });

        let mut transport = TcpTransport::connect(&addr).await.unwrap();
        server.await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        let mut buf = [0u8; 8];
        let result = transport.receive(&mut buf, Duration::from_secs(2)).await;
        assert!(matches!(result, Err(Error::ConnectionLost)));
    }

    #[tokio::test]
    async fn calls_after_close_fail() {
        let (listener, addr) = listener().await;
        let server = tokio::spawn(async move {
            let (_stream, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let mut transport = TcpTransport::connect(&addr).await.unwrap();
        transport.close().await.unwrap();
        assert!(!transport.is_connected());
        assert!(matches!(transport.send(b"x").await, Err(Error::NotConnected)));
        assert!(matches!(transport.clear_input().await, Err(Error::NotConnected)));
        server.abort();
    }
}
