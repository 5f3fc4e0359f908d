//! The rig session: one transport, one descriptor, serialized access.
//!
//! A [`RigSession`] is the aggregate root backends build on. It owns the
//! [`TransactionEngine`] (and through it the transport) together with the
//! mutable state a backend tracks between calls, all behind a single
//! `tokio::sync::Mutex`. Backends take the lock once per public operation
//! and hold it across every sub-transaction the operation needs, so
//! composite operations never interleave with other callers.

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

use crate::caps::CapabilityDescriptor;
use crate::config::SessionConfig;
use crate::engine::{TransactionEngine, TransactionRequest};
use crate::error::{Error, Result};
use crate::transport::{Transport, TransportSession};
use crate::types::{Region, Vfo};

/// Mutable per-session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    /// Always one of the descriptor's VFOs, never `Vfo::Current`.
    current_vfo: Vfo,
    pub current_memory_channel: Option<u32>,
    /// Raw bytes of the most recent status read.
    pub status_snapshot: Bytes,
    /// Model-specific pacing value last sent to the rig.
    pub pacing: u8,
}

impl SessionState {
    fn new(descriptor: &CapabilityDescriptor) -> Self {
        let current_vfo = descriptor
            .vfos
            .iter()
            .find(|v| *v != Vfo::Current)
            .unwrap_or(Vfo::A);
        SessionState {
            current_vfo,
            current_memory_channel: None,
            status_snapshot: Bytes::new(),
            pacing: 0,
        }
    }

    pub fn current_vfo(&self) -> Vfo {
        self.current_vfo
    }

    /// Replace `Vfo::Current` with the selected VFO.
    pub fn resolve(&self, vfo: Vfo) -> Vfo {
        if vfo == Vfo::Current {
            self.current_vfo
        } else {
            vfo
        }
    }

    /// Record a VFO change, refusing VFOs the model does not declare.
    pub fn set_current_vfo(&mut self, descriptor: &CapabilityDescriptor, vfo: Vfo) -> Result<()> {
        let vfo = self.resolve(vfo);
        descriptor.check_vfo(vfo)?;
        if vfo != self.current_vfo {
            debug!(from = %self.current_vfo, to = %vfo, "current VFO");
        }
        self.current_vfo = vfo;
        Ok(())
    }
}

/// Everything guarded by the session lock.
#[derive(Debug)]
pub struct SessionInner {
    pub engine: TransactionEngine,
    pub state: SessionState,
}

impl SessionInner {
    /// Shorthand for [`TransactionEngine::transact`].
    pub async fn transact(&mut self, request: TransactionRequest) -> Result<Bytes> {
        self.engine.transact(request).await
    }

    /// Shorthand for [`TransactionEngine::run`].
    pub async fn run<T, B, D>(&mut self, build: B, decode: D) -> Result<T>
    where
        B: FnOnce() -> Result<TransactionRequest>,
        D: FnOnce(&[u8]) -> Result<T>,
    {
        self.engine.run(build, decode).await
    }
}

/// A connection to one rig.
#[derive(Debug)]
pub struct RigSession {
    descriptor: Arc<CapabilityDescriptor>,
    config: SessionConfig,
    inner: Mutex<SessionInner>,
}

impl RigSession {
    /// Wrap `transport` with the descriptor's transport defaults and the
    /// config's overrides.
    pub fn new(
        descriptor: Arc<CapabilityDescriptor>,
        transport: Box<dyn Transport>,
        config: SessionConfig,
    ) -> Self {
        let settings = config.resolve(&descriptor.transport);
        let io = TransportSession::new(transport, config.pacing(&descriptor));
        let engine = TransactionEngine::new(io, settings.retry, settings.timeout);
        info!(
            model = descriptor.model_name,
            attempts = settings.retry,
            timeout_ms = settings.timeout.as_millis() as u64,
            "session created"
        );
        let state = SessionState::new(&descriptor);
        RigSession {
            descriptor,
            config,
            inner: Mutex::new(SessionInner { engine, state }),
        }
    }

    pub fn descriptor(&self) -> &CapabilityDescriptor {
        &self.descriptor
    }

    /// The shared descriptor handle.
    pub fn descriptor_arc(&self) -> Arc<CapabilityDescriptor> {
        Arc::clone(&self.descriptor)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn region(&self) -> Region {
        self.config.region
    }

    /// Take the session lock. Hold the guard for the whole of a composite
    /// operation.
    pub async fn lock(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().await
    }

    /// Snapshot of the mutable state.
    pub async fn state(&self) -> SessionState {
        self.inner.lock().await.state.clone()
    }

    pub async fn current_vfo(&self) -> Vfo {
        self.inner.lock().await.state.current_vfo()
    }

    pub async fn is_connected(&self) -> bool {
        self.inner.lock().await.engine.io().is_connected()
    }

    /// Close the underlying transport.
    pub async fn close(&self) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if !inner.engine.io().is_connected() {
            return Err(Error::NotConnected);
        }
        info!(model = self.descriptor.model_name, "closing session");
        inner.engine.io_mut().close().await
    }
}
