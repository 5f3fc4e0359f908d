//! TmD710 -- the [`Rig`] implementation for the Kenwood TM-D710.
//!
//! Both bands are addressed directly by `FO`, so frequency access never
//! moves the controls. Band selection with `BC` is tracked in the session.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use catlink_core::caps::CapabilityDescriptor;
use catlink_core::config::SessionConfig;
use catlink_core::error::{Error, Result};
use catlink_core::rig::Rig;
use catlink_core::session::RigSession;
use catlink_core::transport::Transport;
use catlink_core::types::Vfo;

use crate::commands as cmd;

#[derive(Debug)]
pub struct TmD710 {
    session: RigSession,
}

impl TmD710 {
    pub fn new(
        descriptor: Arc<CapabilityDescriptor>,
        transport: Box<dyn Transport>,
        config: SessionConfig,
    ) -> Self {
        TmD710 {
            session: RigSession::new(descriptor, transport, config),
        }
    }

    fn desc(&self) -> &CapabilityDescriptor {
        self.session.descriptor()
    }
}

fn check_band(expected: Vfo, reported: Vfo) -> Result<()> {
    if expected == reported {
        Ok(())
    } else {
        Err(Error::Protocol(format!(
            "asked about {expected}, rig answered for {reported}"
        )))
    }
}

#[async_trait]
impl Rig for TmD710 {
    fn session(&self) -> &RigSession {
        &self.session
    }

    async fn get_frequency(&self, vfo: Vfo) -> Result<u64> {
        self.desc().check_vfo(vfo)?;
        let mut inner = self.session.lock().await;
        let band = inner.state.resolve(vfo);
        let request = cmd::read_frequency(band)?;
        let reply = inner.transact(request).await?;
        let (reported, freq) = cmd::parse_frequency(&reply)?;
        check_band(band, reported)?;
        Ok(freq)
    }

    /// The rig answers with the frequency it actually tuned, which can
    /// differ when the request falls between channel steps.
    async fn set_frequency(&self, vfo: Vfo, freq_hz: u64) -> Result<()> {
        let desc = self.desc();
        desc.check_vfo(vfo)?;
        let mut inner = self.session.lock().await;
        let band = inner.state.resolve(vfo);
        desc.check_rx_frequency(self.session.region(), band, freq_hz)?;
        let request = cmd::set_frequency(band, freq_hz)?;
        let reply = inner.transact(request).await?;
        let (reported, tuned) = cmd::parse_frequency(&reply)?;
        check_band(band, reported)?;
        if tuned != freq_hz {
            warn!(requested = freq_hz, tuned, band = %band, "rig tuned a different frequency");
        }
        Ok(())
    }

    /// The band holding the controls, as reported by the rig.
    async fn get_vfo(&self) -> Result<Vfo> {
        let desc = self.desc();
        let mut inner = self.session.lock().await;
        let reply = inner.transact(cmd::read_band_control()).await?;
        let (control, _ptt) = cmd::parse_band_control(&reply)?;
        inner.state.set_current_vfo(desc, control)?;
        Ok(control)
    }

    /// Move both the controls and PTT to `vfo`.
    async fn set_vfo(&self, vfo: Vfo) -> Result<()> {
        let desc = self.desc();
        desc.check_vfo(vfo)?;
        let mut inner = self.session.lock().await;
        let band = inner.state.resolve(vfo);
        let reply = inner.transact(cmd::set_band_control(band)?).await?;
        let (control, _ptt) = cmd::parse_band_control(&reply)?;
        check_band(band, control)?;
        inner.state.set_current_vfo(desc, control)
    }
}
