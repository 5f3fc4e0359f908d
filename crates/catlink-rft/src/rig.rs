//! Ekd500 -- the [`Rig`] implementation for the RFT EKD-500 receiver.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use catlink_core::caps::CapabilityDescriptor;
use catlink_core::config::SessionConfig;
use catlink_core::error::{Error, Result};
use catlink_core::rig::Rig;
use catlink_core::session::RigSession;
use catlink_core::transport::Transport;
use catlink_core::types::Vfo;

use crate::commands as cmd;

/// A connected EKD-500. Nothing can be read back.
#[derive(Debug)]
pub struct Ekd500 {
    session: RigSession,
}

impl Ekd500 {
    pub fn new(
        descriptor: Arc<CapabilityDescriptor>,
        transport: Box<dyn Transport>,
        config: SessionConfig,
    ) -> Self {
        Ekd500 {
            session: RigSession::new(descriptor, transport, config),
        }
    }
}

#[async_trait]
impl Rig for Ekd500 {
    fn session(&self) -> &RigSession {
        &self.session
    }

    async fn get_frequency(&self, _vfo: Vfo) -> Result<u64> {
        Err(Error::Unsupported(
            "EKD-500 cannot report its frequency".into(),
        ))
    }

    /// Whatever the receiver sends back, if anything, is logged and
    /// otherwise ignored.
    async fn set_frequency(&self, vfo: Vfo, freq_hz: u64) -> Result<()> {
        let desc = self.session.descriptor();
        desc.check_vfo(vfo)?;
        let mut inner = self.session.lock().await;
        let vfo = inner.state.resolve(vfo);
        desc.check_rx_frequency(self.session.region(), vfo, freq_hz)?;
        let reply = inner.transact(cmd::set_frequency(freq_hz)?).await?;
        if !reply.is_empty() {
            debug!(freq_hz, reply = %catlink_core::framer::to_hex(&reply), "receiver answered frequency write");
        }
        Ok(())
    }
}
