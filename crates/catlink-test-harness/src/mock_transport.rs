//! Scripted transport for deterministic tests of backends and the engine.
//!
//! [`MockTransport`] is loaded with request/reply pairs before it is handed
//! to a session. Each time the code under test writes a complete expected
//! request, the paired reply becomes readable. A [`MockProbe`] obtained
//! before the transport is boxed keeps a view onto the shared state, so a
//! test can inspect what was written after the session owns the mock.
//!
//! # Example
//!
//! ```
//! use catlink_test_harness::MockTransport;
//!
//! let mut mock = MockTransport::new();
//! let probe = mock.probe();
//! // CI-V "read frequency": the bus echoes the command, then the rig answers.
//! let cmd = [0xFE, 0xFE, 0x6A, 0xE0, 0x03, 0xFD];
//! let mut reply = cmd.to_vec();
//! reply.extend_from_slice(&[0xFE, 0xFE, 0xE0, 0x6A, 0x03, 0x00, 0x40, 0x07, 0x14, 0x00, 0xFD]);
//! mock.expect(&cmd, &reply);
//! assert_eq!(probe.remaining_expectations(), 1);
//! ```

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use catlink_core::error::{Error, Result};
use catlink_core::transport::Transport;

#[derive(Debug, Clone)]
struct Expectation {
    request: Vec<u8>,
    /// Empty for a request the rig never answers.
    response: Vec<u8>,
}

#[derive(Debug)]
struct MockState {
    expectations: VecDeque<Expectation>,
    /// Bytes readable by `receive`.
    rx: VecDeque<u8>,
    /// Bytes of a frame written piecewise (paced writes).
    partial: Vec<u8>,
    sent: Vec<Vec<u8>>,
    send_calls: usize,
    flushes: usize,
    fail_sends: Option<io::ErrorKind>,
    connected: bool,
}

impl MockState {
    fn finish_frame(&mut self) -> Vec<u8> {
        let frame = std::mem::take(&mut self.partial);
        self.sent.push(frame.clone());
        frame
    }
}

fn lock(state: &Mutex<MockState>) -> MutexGuard<'_, MockState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A scripted [`Transport`].
///
/// Expectations are consumed in order. Writing anything other than the
/// next expected request, or writing when none are left, fails with
/// [`Error::Protocol`]. Reads with nothing queued fail with
/// [`Error::Timeout`] immediately, whatever the requested deadline.
#[derive(Debug)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

/// Read-only view onto a [`MockTransport`] that outlives boxing it.
#[derive(Debug, Clone)]
pub struct MockProbe {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    /// Create a connected mock with no expectations.
    pub fn new() -> Self {
        MockTransport {
            state: Arc::new(Mutex::new(MockState {
                expectations: VecDeque::new(),
                rx: VecDeque::new(),
                partial: Vec::new(),
                sent: Vec::new(),
                send_calls: 0,
                flushes: 0,
                fail_sends: None,
                connected: true,
            })),
        }
    }

    /// A handle for inspecting traffic after the mock is moved into a session.
    pub fn probe(&self) -> MockProbe {
        MockProbe {
            state: Arc::clone(&self.state),
        }
    }

    /// When `request` is written, make `response` readable.
    pub fn expect(&mut self, request: &[u8], response: &[u8]) {
        lock(&self.state).expectations.push_back(Expectation {
            request: request.to_vec(),
            response: response.to_vec(),
        });
    }

    /// Expect `request` and never answer it.
    pub fn expect_silence(&mut self, request: &[u8]) {
        self.expect(request, &[]);
    }

    /// Queue bytes that are readable before anything is written, as if the
    /// rig had sent them unprompted.
    pub fn inject(&mut self, bytes: &[u8]) {
        lock(&self.state).rx.extend(bytes.iter().copied());
    }

    /// Make every later `send` fail with an I/O error of `kind`.
    pub fn fail_sends_with(&mut self, kind: io::ErrorKind) {
        lock(&self.state).fail_sends = Some(kind);
    }

    /// Set the connected state. A disconnected mock fails every call with
    /// [`Error::NotConnected`].
    pub fn set_connected(&mut self, connected: bool) {
        lock(&self.state).connected = connected;
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProbe {
    /// Every frame written, in order.
    pub fn sent(&self) -> Vec<Vec<u8>> {
        lock(&self.state).sent.clone()
    }

    /// The most recent frame written.
    pub fn last_sent(&self) -> Option<Vec<u8>> {
        lock(&self.state).sent.last().cloned()
    }

    /// Number of complete frames written.
    pub fn write_count(&self) -> usize {
        lock(&self.state).sent.len()
    }

    /// Number of `send` calls; larger than [`write_count`](Self::write_count)
    /// when frames are written a byte at a time.
    pub fn send_calls(&self) -> usize {
        lock(&self.state).send_calls
    }

    /// Number of `clear_input` calls.
    pub fn flush_count(&self) -> usize {
        lock(&self.state).flushes
    }

    pub fn remaining_expectations(&self) -> usize {
        lock(&self.state).expectations.len()
    }

    /// Bytes queued for reading and not yet consumed.
    pub fn unread(&self) -> usize {
        lock(&self.state).rx.len()
    }

    pub fn is_connected(&self) -> bool {
        lock(&self.state).connected
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        let mut state = lock(&self.state);
        if !state.connected {
            return Err(Error::NotConnected);
        }
        if let Some(kind) = state.fail_sends {
            return Err(Error::Io(io::Error::new(kind, "injected send failure")));
        }
        state.send_calls += 1;
        state.partial.extend_from_slice(data);

        let Some(next) = state.expectations.front() else {
            let frame = state.finish_frame();
            return Err(Error::Protocol(format!(
                "no more expectations in mock transport, got {frame:02X?}"
            )));
        };
        if !next.request.starts_with(&state.partial) {
            let expected = next.request.clone();
            let frame = state.finish_frame();
            return Err(Error::Protocol(format!(
                "unexpected send data: expected {expected:02X?}, got {frame:02X?}"
            )));
        }
        if state.partial.len() < next.request.len() {
            return Ok(());
        }

        state.finish_frame();
        if let Some(expectation) = state.expectations.pop_front() {
            state.rx.extend(expectation.response);
        }
        Ok(())
    }

    async fn receive(&mut self, buf: &mut [u8], _timeout: Duration) -> Result<usize> {
        let mut state = lock(&self.state);
        if !state.connected {
            return Err(Error::NotConnected);
        }
        if state.rx.is_empty() {
            return Err(Error::Timeout);
        }
        let n = state.rx.len().min(buf.len());
        for (slot, byte) in buf.iter_mut().zip(state.rx.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }

    async fn clear_input(&mut self) -> Result<()> {
        let mut state = lock(&self.state);
        if !state.connected {
            return Err(Error::NotConnected);
        }
        state.flushes += 1;
        state.rx.clear();
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        let mut state = lock(&self.state);
        state.connected = false;
        state.rx.clear();
        Ok(())
    }

    fn is_connected(&self) -> bool {
        lock(&self.state).connected
    }
}
