//! The transaction engine: build, send, await, decode, retry on timeout.
//!
//! Every rig operation is one or more transactions. A transaction moves
//! through [`TransactionState`]:
//!
//! ```text
//! Idle -> Building -> Sending -> AwaitingResponse -> Decoding -> Done
//!            |           |              |                |
//!            +-----------+--------------+----------------+--> Failed
//! ```
//!
//! Only a timeout while awaiting the reply sends the frame again, up to the
//! configured number of attempts. Build failures happen before any I/O;
//! transport failures and undecodable replies are returned immediately.

use std::fmt;
use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::framer::to_hex;
use crate::transport::TransportSession;
use crate::types::Vfo;

/// What the engine reads after writing a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    /// Write-only command.
    None,
    /// A fixed-length block.
    Exact(usize),
    /// Bytes up to and including `terminator`, at most `max_len`.
    Terminated { terminator: u8, max_len: usize },
    /// Like `Terminated`, but silence until the deadline means the command
    /// was accepted and yields an empty reply.
    Optional { terminator: u8, max_len: usize },
}

/// One frame to send and the reply it should produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRequest {
    /// Short name for logs, e.g. `"set_freq"`.
    pub operation: &'static str,
    pub vfo: Option<Vfo>,
    pub frame: Vec<u8>,
    pub reply: Reply,
    /// Discard reply frames identical to `frame` (buses that echo).
    pub skip_echo: bool,
}

impl TransactionRequest {
    /// A command that expects no reply.
    pub fn write(operation: &'static str, frame: Vec<u8>) -> Self {
        Self::query(operation, frame, Reply::None)
    }

    pub fn query(operation: &'static str, frame: Vec<u8>, reply: Reply) -> Self {
        TransactionRequest {
            operation,
            vfo: None,
            frame,
            reply,
            skip_echo: false,
        }
    }

    pub fn for_vfo(mut self, vfo: Vfo) -> Self {
        self.vfo = Some(vfo);
        self
    }

    pub fn skip_echo(mut self) -> Self {
        self.skip_echo = true;
        self
    }
}

/// Lifecycle of the transaction most recently run by an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransactionState {
    #[default]
    Idle,
    Building,
    Sending,
    AwaitingResponse,
    Decoding,
    Done,
    Failed,
}

impl fmt::Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransactionState::Idle => "idle",
            TransactionState::Building => "building",
            TransactionState::Sending => "sending",
            TransactionState::AwaitingResponse => "awaiting response",
            TransactionState::Decoding => "decoding",
            TransactionState::Done => "done",
            TransactionState::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

/// Runs transactions against one [`TransportSession`].
#[derive(Debug)]
pub struct TransactionEngine {
    io: TransportSession,
    attempts: u32,
    timeout: Duration,
    state: TransactionState,
}

impl TransactionEngine {
    /// `attempts` counts the first send; values below 1 are raised to 1.
    pub fn new(io: TransportSession, attempts: u32, timeout: Duration) -> Self {
        TransactionEngine {
            io,
            attempts: attempts.max(1),
            timeout,
            state: TransactionState::Idle,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// State reached by the last transaction.
    pub fn state(&self) -> TransactionState {
        self.state
    }

    pub fn io(&self) -> &TransportSession {
        &self.io
    }

    pub fn io_mut(&mut self) -> &mut TransportSession {
        &mut self.io
    }

    /// Build a request, run it, and decode the reply.
    ///
    /// `build` runs before any I/O; if it fails nothing is written.
    pub async fn run<T, B, D>(&mut self, build: B, decode: D) -> Result<T>
    where
        B: FnOnce() -> Result<TransactionRequest>,
        D: FnOnce(&[u8]) -> Result<T>,
    {
        self.state = TransactionState::Building;
        let request = match build() {
            Ok(request) => request,
            Err(e) => {
                debug!(error = %e, "request rejected before I/O");
                self.state = TransactionState::Failed;
                return Err(e);
            }
        };
        let reply = self.exchange(&request).await?;

        self.state = TransactionState::Decoding;
        match decode(&reply[..]) {
            Ok(value) => {
                self.state = TransactionState::Done;
                Ok(value)
            }
            Err(e) => {
                warn!(op = request.operation, error = %e, reply = %to_hex(&reply), "undecodable reply");
                self.state = TransactionState::Failed;
                Err(e)
            }
        }
    }

    /// Run a prepared request and return the raw reply.
    pub async fn transact(&mut self, request: TransactionRequest) -> Result<Bytes> {
        let reply = self.exchange(&request).await?;
        self.state = TransactionState::Done;
        Ok(reply)
    }

    async fn exchange(&mut self, request: &TransactionRequest) -> Result<Bytes> {
        for attempt in 1..=self.attempts {
            self.state = TransactionState::Sending;
            debug!(
                op = request.operation,
                vfo = ?request.vfo,
                attempt,
                "sending"
            );
            if let Err(e) = self.send(&request.frame).await {
                self.state = TransactionState::Failed;
                return Err(e);
            }
            if request.reply == Reply::None {
                return Ok(Bytes::new());
            }

            self.state = TransactionState::AwaitingResponse;
            match self.await_reply(request).await {
                Ok(reply) => return Ok(reply),
                Err(Error::Timeout) => {
                    if let Reply::Optional { .. } = request.reply {
                        trace!(op = request.operation, "no reply, accepted");
                        return Ok(Bytes::new());
                    }
                    debug!(op = request.operation, attempt, "timeout");
                }
                Err(e) => {
                    self.state = TransactionState::Failed;
                    return Err(e);
                }
            }
        }
        warn!(
            op = request.operation,
            attempts = self.attempts,
            "no reply after all attempts"
        );
        self.state = TransactionState::Failed;
        Err(Error::Timeout)
    }

    async fn send(&mut self, frame: &[u8]) -> Result<()> {
        self.io.flush().await?;
        self.io.write_block(frame).await
    }

    async fn await_reply(&mut self, request: &TransactionRequest) -> Result<Bytes> {
        loop {
            let reply = match request.reply {
                Reply::None => return Ok(Bytes::new()),
                Reply::Exact(len) => self.io.read_exact(len, self.timeout).await?,
                Reply::Terminated {
                    terminator,
                    max_len,
                }
                | Reply::Optional {
                    terminator,
                    max_len,
                } => self.io.read_until(terminator, max_len, self.timeout).await?,
            };
            if request.skip_echo && reply[..] == request.frame[..] {
                trace!(op = request.operation, "skipping echo");
                continue;
            }
            return Ok(reply);
        }
    }
}
