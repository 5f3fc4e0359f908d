//! Byte transports and the paced, buffered session on top of them.
//!
//! The [`Transport`] trait abstracts over the physical link to a rig:
//! serial ports and TCP sockets in `catlink-transport`, scripted mocks in
//! `catlink-test-harness`. [`TransportSession`] wraps one transport and
//! adds what every protocol family needs: discarding stale input,
//! inter-byte and post-write pacing, and reads that stop at a terminator
//! byte or a fixed length while keeping any surplus for the next read.

use std::time::Duration;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::framer::to_hex;

/// Asynchronous byte-level transport to a rig.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send raw bytes to the rig, returning once all of them are written.
    async fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Receive bytes into `buf`, waiting up to `timeout` for the first one.
    ///
    /// Returns the number of bytes read, or
    /// [`Error::Timeout`](crate::error::Error::Timeout) if nothing arrived
    /// before the deadline.
    async fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize>;

    /// Discard any input that has arrived but not been read.
    ///
    /// The default implementation drains with zero-timeout reads.
    async fn clear_input(&mut self) -> Result<()> {
        let mut scratch = [0u8; 256];
        loop {
            match self.receive(&mut scratch, Duration::ZERO).await {
                Ok(0) | Err(Error::Timeout) => return Ok(()),
                Ok(_) => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// Close the connection. Later calls should fail with
    /// [`Error::NotConnected`](crate::error::Error::NotConnected).
    async fn close(&mut self) -> Result<()>;

    fn is_connected(&self) -> bool;
}

/// Write pacing applied by a [`TransportSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pacing {
    /// Delay between consecutive bytes. Zero writes the frame in one call.
    pub write_delay: Duration,
    /// Delay after the last byte of every frame.
    pub post_write_delay: Duration,
}

/// A transport plus a read-ahead buffer and write pacing.
///
/// Not safe for concurrent use; `RigSession` holds it behind its lock.
pub struct TransportSession {
    transport: Box<dyn Transport>,
    pending: BytesMut,
    pacing: Pacing,
}

impl TransportSession {
    pub fn new(transport: Box<dyn Transport>, pacing: Pacing) -> Self {
        TransportSession {
            transport,
            pending: BytesMut::with_capacity(256),
            pacing,
        }
    }

    pub fn pacing(&self) -> Pacing {
        self.pacing
    }

    pub fn set_pacing(&mut self, pacing: Pacing) {
        self.pacing = pacing;
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    /// Number of bytes read ahead and not yet returned.
    pub fn buffered(&self) -> usize {
        self.pending.len()
    }

    /// Discard unread input: the transport's buffer and anything read
    /// ahead past a previous terminator.
    pub async fn flush(&mut self) -> Result<()> {
        if !self.pending.is_empty() {
            debug!(
                stale = %to_hex(&self.pending),
                "discarding buffered input"
            );
            self.pending.clear();
        }
        self.transport.clear_input().await
    }

    /// Write a whole frame, honouring the pacing delays.
    pub async fn write_block(&mut self, data: &[u8]) -> Result<()> {
        trace!(bytes = %to_hex(data), "tx");
        if self.pacing.write_delay.is_zero() {
            self.transport.send(data).await?;
        } else {
            for (i, byte) in data.iter().enumerate() {
                if i > 0 {
                    tokio::time::sleep(self.pacing.write_delay).await;
                }
                self.transport.send(std::slice::from_ref(byte)).await?;
            }
        }
        if !self.pacing.post_write_delay.is_zero() {
            tokio::time::sleep(self.pacing.post_write_delay).await;
        }
        Ok(())
    }

    /// Read up to and including `terminator`.
    ///
    /// Returns early with exactly `max_len` bytes if the terminator has not
    /// been seen by then. Bytes after the terminator stay buffered for the
    /// next read. Fails with [`Error::Timeout`] once `timeout` has elapsed.
    pub async fn read_until(
        &mut self,
        terminator: u8,
        max_len: usize,
        timeout: Duration,
    ) -> Result<Bytes> {
        let deadline = Instant::now() + timeout;
        loop {
            let window = self.pending.len().min(max_len);
            if let Some(pos) = self.pending[..window].iter().position(|&b| b == terminator) {
                return Ok(self.take(pos + 1));
            }
            if self.pending.len() >= max_len {
                debug!(max_len, "no terminator within max_len");
                return Ok(self.take(max_len));
            }
            self.fill(deadline).await?;
        }
    }

    /// Read exactly `len` bytes.
    pub async fn read_exact(&mut self, len: usize, timeout: Duration) -> Result<Bytes> {
        let deadline = Instant::now() + timeout;
        while self.pending.len() < len {
            self.fill(deadline).await?;
        }
        Ok(self.take(len))
    }

    pub async fn close(&mut self) -> Result<()> {
        self.pending.clear();
        self.transport.close().await
    }

    fn take(&mut self, n: usize) -> Bytes {
        let frame = self.pending.split_to(n).freeze();
        trace!(bytes = %to_hex(&frame), "rx");
        frame
    }

    async fn fill(&mut self, deadline: Instant) -> Result<()> {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(Error::Timeout);
        }
        let mut buf = [0u8; 256];
        let n = self.transport.receive(&mut buf, remaining).await?;
        self.pending.extend_from_slice(&buf[..n]);
        Ok(())
    }
}

impl std::fmt::Debug for TransportSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportSession")
            .field("connected", &self.transport.is_connected())
            .field("buffered", &self.pending.len())
            .field("pacing", &self.pacing)
            .finish()
    }
}
