//! The `Rig` trait: one control surface for every backend.
//!
//! Applications program against `dyn Rig` without knowing which protocol
//! family sits underneath. Each family (Yaesu fixed frame, Yaesu newcat,
//! CI-V, Kenwood, RFT) provides one implementation and declares per model
//! what it supports in its [`CapabilityDescriptor`].
//!
//! Everything beyond frequency access has a default body returning
//! [`Error::Unsupported`], so a backend implements only what its rigs do.

use async_trait::async_trait;

use crate::caps::CapabilityDescriptor;
use crate::error::{Error, Result};
use crate::session::RigSession;
use crate::types::*;

fn unsupported<T>(rig: &(impl Rig + ?Sized), what: &str) -> Result<T> {
    Err(Error::Unsupported(format!(
        "{what} on {}",
        rig.descriptor().model_name
    )))
}

/// Asynchronous control interface for a transceiver or receiver.
///
/// Methods taking a [`Vfo`] accept `Vfo::Current` for whichever VFO the
/// session has selected.
#[async_trait]
pub trait Rig: Send + Sync {
    /// The session this rig runs on.
    fn session(&self) -> &RigSession;

    /// Static capabilities of the model.
    fn descriptor(&self) -> &CapabilityDescriptor {
        self.session().descriptor()
    }

    /// Bring the rig into a known state after the transport is connected.
    async fn open(&self) -> Result<()> {
        Ok(())
    }

    /// Undo what [`open`](Rig::open) changed and close the transport.
    async fn close(&self) -> Result<()> {
        self.session().close().await
    }

    async fn get_frequency(&self, vfo: Vfo) -> Result<u64>;

    async fn set_frequency(&self, vfo: Vfo, freq_hz: u64) -> Result<()>;

    /// Current mode and passband; the passband is `None` when the rig does
    /// not report one.
    async fn get_mode(&self, vfo: Vfo) -> Result<(Mode, Option<Passband>)> {
        let _ = vfo;
        unsupported(self, "get_mode")
    }

    /// Set the mode. A passband of `None` selects the model's normal filter
    /// for the mode.
    async fn set_mode(&self, vfo: Vfo, mode: Mode, passband: Option<Passband>) -> Result<()> {
        let _ = (vfo, mode, passband);
        unsupported(self, "set_mode")
    }

    async fn get_vfo(&self) -> Result<Vfo> {
        Ok(self.session().current_vfo().await)
    }

    async fn set_vfo(&self, vfo: Vfo) -> Result<()> {
        let _ = vfo;
        unsupported(self, "set_vfo")
    }

    async fn get_ptt(&self, vfo: Vfo) -> Result<bool> {
        let _ = vfo;
        unsupported(self, "get_ptt")
    }

    async fn set_ptt(&self, vfo: Vfo, on: bool) -> Result<()> {
        let _ = (vfo, on);
        unsupported(self, "set_ptt")
    }

    async fn get_split(&self, vfo: Vfo) -> Result<bool> {
        let _ = vfo;
        unsupported(self, "get_split")
    }

    async fn set_split(&self, vfo: Vfo, on: bool) -> Result<()> {
        let _ = (vfo, on);
        unsupported(self, "set_split")
    }

    /// RIT offset in hertz.
    async fn get_rit(&self, vfo: Vfo) -> Result<i32> {
        let _ = vfo;
        unsupported(self, "get_rit")
    }

    /// Set the RIT offset in hertz; 0 turns RIT off.
    async fn set_rit(&self, vfo: Vfo, offset_hz: i32) -> Result<()> {
        let _ = (vfo, offset_hz);
        unsupported(self, "set_rit")
    }

    /// Read a level. Meter levels are returned in physical units via the
    /// model's calibration table.
    async fn get_level(&self, vfo: Vfo, level: Level) -> Result<LevelValue> {
        let _ = (vfo, level);
        unsupported(self, "get_level")
    }

    async fn set_level(&self, vfo: Vfo, level: Level, value: LevelValue) -> Result<()> {
        let _ = (vfo, level, value);
        unsupported(self, "set_level")
    }

    async fn get_func(&self, vfo: Vfo, func: Func) -> Result<bool> {
        let _ = (vfo, func);
        unsupported(self, "get_func")
    }

    async fn set_func(&self, vfo: Vfo, func: Func, on: bool) -> Result<()> {
        let _ = (vfo, func, on);
        unsupported(self, "set_func")
    }

    /// Selected memory channel.
    async fn get_mem(&self, vfo: Vfo) -> Result<u32> {
        let _ = vfo;
        unsupported(self, "get_mem")
    }

    async fn set_mem(&self, vfo: Vfo, channel: u32) -> Result<()> {
        let _ = (vfo, channel);
        unsupported(self, "set_mem")
    }

    async fn vfo_op(&self, vfo: Vfo, op: VfoOp) -> Result<()> {
        let _ = (vfo, op);
        unsupported(self, "vfo_op")
    }

    async fn scan(&self, vfo: Vfo, op: ScanOp) -> Result<()> {
        let _ = (vfo, op);
        unsupported(self, "scan")
    }

    async fn get_clock(&self) -> Result<ClockTime> {
        unsupported(self, "get_clock")
    }

    async fn set_clock(&self, time: &ClockTime) -> Result<()> {
        let _ = time;
        unsupported(self, "set_clock")
    }

    /// Set the rig's model-specific pacing value.
    async fn set_pacing(&self, pacing: u8) -> Result<()> {
        let _ = pacing;
        unsupported(self, "set_pacing")
    }
}
