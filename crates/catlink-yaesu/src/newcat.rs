//! NewcatRig -- the [`Rig`] implementation for semicolon-framed Yaesu rigs.
//!
//! Each VFO has its own frequency and mode mnemonic, so reads and writes
//! never switch the selected VFO. Set commands are not acknowledged; a
//! rejected command only shows up as `?;` on the next query.
//!
//! While the session is open the rig's auto-information output is turned
//! off so unsolicited status messages cannot interleave with replies.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};

use catlink_core::caps::{CapabilityDescriptor, index_to_step, step_to_index};
use catlink_core::config::SessionConfig;
use catlink_core::engine::TransactionRequest;
use catlink_core::error::{Error, Result};
use catlink_core::rig::Rig;
use catlink_core::session::{RigSession, SessionInner};
use catlink_core::transport::Transport;
use catlink_core::types::*;

use crate::commands as cmd;
use crate::protocol;

/// A connected newcat rig.
#[derive(Debug)]
pub struct NewcatRig {
    session: RigSession,
    /// AI setting found at open, restored at close.
    saved_auto_info: Mutex<Option<u8>>,
}

impl NewcatRig {
    pub fn new(
        descriptor: Arc<CapabilityDescriptor>,
        transport: Box<dyn Transport>,
        config: SessionConfig,
    ) -> Self {
        NewcatRig {
            session: RigSession::new(descriptor, transport, config),
            saved_auto_info: Mutex::new(None),
        }
    }

    fn desc(&self) -> &CapabilityDescriptor {
        self.session.descriptor()
    }
}

/// Run a query and return the reply body after the echoed mnemonic.
async fn ask(inner: &mut SessionInner, mnemonic: &str, request: TransactionRequest) -> Result<String> {
    let reply = inner.transact(request).await?;
    protocol::parse(mnemonic, &reply).map(str::to_owned)
}

async fn send(inner: &mut SessionInner, request: TransactionRequest) -> Result<()> {
    inner.transact(request).await?;
    Ok(())
}

/// A dB value from a caller, which must fit a step list entry.
fn decibels(level: Level, value: LevelValue) -> Result<u8> {
    let db = value.as_int();
    u8::try_from(db).map_err(|_| Error::InvalidParameter(format!("{level} {db} dB")))
}

#[async_trait]
impl Rig for NewcatRig {
    fn session(&self) -> &RigSession {
        &self.session
    }

    async fn open(&self) -> Result<()> {
        let mut inner = self.session.lock().await;
        let body = ask(&mut inner, "AI", cmd::read_auto_info()).await?;
        let previous = cmd::parse_index(&body)?;
        debug!(previous, "disabling auto-information");
        send(&mut inner, cmd::set_auto_info(0)?).await?;
        *self.saved_auto_info.lock().await = Some(previous);
        Ok(())
    }

    /// Restores the auto-information setting found at open when the
    /// session asks for it, then closes the transport.
    async fn close(&self) -> Result<()> {
        let saved = self.saved_auto_info.lock().await.take();
        if let (true, Some(previous)) = (self.session.config().restore_on_close, saved) {
            info!(previous, "restoring auto-information");
            let mut inner = self.session.lock().await;
            send(&mut inner, cmd::set_auto_info(previous)?).await?;
        }
        self.session.close().await
    }

    async fn get_frequency(&self, vfo: Vfo) -> Result<u64> {
        self.desc().check_vfo(vfo)?;
        let mut inner = self.session.lock().await;
        let vfo = inner.state.resolve(vfo);
        let mnemonic = cmd::frequency_mnemonic(vfo)?;
        let body = ask(&mut inner, mnemonic, cmd::read_frequency(vfo)?).await?;
        cmd::parse_frequency(&body)
    }

    async fn set_frequency(&self, vfo: Vfo, freq_hz: u64) -> Result<()> {
        let desc = self.desc();
        desc.check_vfo(vfo)?;
        let mut inner = self.session.lock().await;
        let vfo = inner.state.resolve(vfo);
        desc.check_rx_frequency(self.session.region(), vfo, freq_hz)?;
        send(&mut inner, cmd::set_frequency(vfo, freq_hz)?).await
    }

    /// The passband reported is the mode's normal filter; the rig's
    /// actual width setting is not read.
    async fn get_mode(&self, vfo: Vfo) -> Result<(Mode, Option<Passband>)> {
        let desc = self.desc();
        desc.check_vfo(vfo)?;
        let mut inner = self.session.lock().await;
        let vfo = inner.state.resolve(vfo);
        let mnemonic = cmd::mode_mnemonic(vfo)?;
        let body = ask(&mut inner, mnemonic, cmd::read_mode(vfo)?).await?;
        let mode = cmd::parse_mode(&body)?;
        Ok((mode, desc.default_filter(mode)))
    }

    async fn set_mode(&self, vfo: Vfo, mode: Mode, passband: Option<Passband>) -> Result<()> {
        let desc = self.desc();
        desc.check_vfo(vfo)?;
        desc.check_mode(self.session.region(), mode)?;
        desc.filter_for(mode, passband)?;
        let mut inner = self.session.lock().await;
        let vfo = inner.state.resolve(vfo);
        send(&mut inner, cmd::set_mode(vfo, mode)?).await
    }

    async fn get_vfo(&self) -> Result<Vfo> {
        let mut inner = self.session.lock().await;
        let body = ask(&mut inner, "VS", cmd::read_vfo()).await?;
        let vfo = cmd::parse_vfo(&body)?;
        inner.state.set_current_vfo(self.desc(), vfo)?;
        Ok(vfo)
    }

    async fn set_vfo(&self, vfo: Vfo) -> Result<()> {
        let desc = self.desc();
        desc.check_vfo(vfo)?;
        let mut inner = self.session.lock().await;
        let vfo = inner.state.resolve(vfo);
        send(&mut inner, cmd::set_vfo(vfo)?).await?;
        inner.state.set_current_vfo(desc, vfo)
    }

    async fn get_ptt(&self, _vfo: Vfo) -> Result<bool> {
        let mut inner = self.session.lock().await;
        let body = ask(&mut inner, "TX", cmd::read_ptt()).await?;
        cmd::parse_ptt(&body)
    }

    async fn set_ptt(&self, _vfo: Vfo, on: bool) -> Result<()> {
        let mut inner = self.session.lock().await;
        send(&mut inner, cmd::set_ptt(on)?).await
    }

    async fn get_split(&self, _vfo: Vfo) -> Result<bool> {
        let mut inner = self.session.lock().await;
        let body = ask(&mut inner, "FT", cmd::read_split()).await?;
        cmd::parse_split(&body)
    }

    async fn set_split(&self, _vfo: Vfo, on: bool) -> Result<()> {
        let mut inner = self.session.lock().await;
        send(&mut inner, cmd::set_split(on)?).await
    }

    /// Attenuator and preamp are reported in dB. `RawStrength` is the
    /// meter reading as sent; `Strength` is calibrated to dB over S9.
    async fn get_level(&self, _vfo: Vfo, level: Level) -> Result<LevelValue> {
        let desc = self.desc();
        desc.check_level(level, false)?;
        let mut inner = self.session.lock().await;
        match level {
            Level::Attenuator => {
                let body = ask(&mut inner, "RA0", cmd::read_attenuator()).await?;
                let db = desc.decode_attenuator(cmd::parse_index(&body)?)?;
                Ok(LevelValue::Int(i32::from(db)))
            }
            Level::Preamp => {
                let body = ask(&mut inner, "PA0", cmd::read_preamp()).await?;
                let db = index_to_step(&desc.preamp, cmd::parse_index(&body)?)?;
                Ok(LevelValue::Int(i32::from(db)))
            }
            Level::RawStrength | Level::Strength => {
                let body = ask(&mut inner, "SM0", cmd::read_meter()).await?;
                let raw = i32::from(cmd::parse_meter(&body)?);
                if level == Level::RawStrength {
                    return Ok(LevelValue::Int(raw));
                }
                let table = desc
                    .calibration(Level::Strength)
                    .ok_or_else(|| Error::Unsupported(format!("level {level}")))?;
                Ok(LevelValue::Int(table.interpolate(raw).round() as i32))
            }
            other => Err(Error::Unsupported(format!("level {other}"))),
        }
    }

    async fn set_level(&self, _vfo: Vfo, level: Level, value: LevelValue) -> Result<()> {
        let desc = self.desc();
        desc.check_level(level, true)?;
        let request = match level {
            Level::Attenuator => {
                cmd::set_attenuator(desc.encode_attenuator(decibels(level, value)?)?)?
            }
            Level::Preamp => cmd::set_preamp(step_to_index(&desc.preamp, decibels(level, value)?)?)?,
            other => return Err(Error::Unsupported(format!("setting level {other}"))),
        };
        let mut inner = self.session.lock().await;
        send(&mut inner, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catlink_test_harness::{MockProbe, MockTransport};
    use std::time::Duration;

    use crate::models;

    fn make_rig(mock: MockTransport, restore: bool) -> NewcatRig {
        let config = SessionConfig::default()
            .with_timeout(Duration::from_millis(20))
            .with_restore_on_close(restore);
        NewcatRig::new(Arc::new(models::ft_dx101d()), Box::new(mock), config)
    }

    fn scripted() -> (MockTransport, MockProbe) {
        let mock = MockTransport::new();
        let probe = mock.probe();
        (mock, probe)
    }

    #[tokio::test]
    async fn frequency_per_vfo() {
        let (mut mock, probe) = scripted();
        mock.expect(b"FA;", b"FA014074000;");
        mock.expect(b"FB007030000;", b"");
        mock.expect(b"FB;", b"FB007030000;");
        let rig = make_rig(mock, false);

        assert_eq!(rig.get_frequency(Vfo::Current).await.unwrap(), 14_074_000);
        rig.set_frequency(Vfo::B, 7_030_000).await.unwrap();
        assert_eq!(rig.get_frequency(Vfo::B).await.unwrap(), 7_030_000);
        assert_eq!(probe.remaining_expectations(), 0);
        // Writing B does not select it.
        assert_eq!(rig.session().current_vfo().await, Vfo::A);
    }

    #[tokio::test]
    async fn frequency_out_of_range_does_no_io() {
        let (mock, probe) = scripted();
        let rig = make_rig(mock, false);

        let result = rig.set_frequency(Vfo::A, 144_300_000).await;
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
        assert!(matches!(
            rig.get_frequency(Vfo::Memory).await,
            Err(Error::InvalidParameter(_))
        ));
        assert_eq!(probe.write_count(), 0);
    }

    #[tokio::test]
    async fn rejected_query_is_protocol_error() {
        let (mut mock, _probe) = scripted();
        mock.expect(b"FA;", b"?;");
        let rig = make_rig(mock, false);

        assert!(matches!(
            rig.get_frequency(Vfo::A).await,
            Err(Error::Protocol(_))
        ));
    }

    #[tokio::test]
    async fn silent_rig_times_out_after_three_attempts() {
        let (mut mock, probe) = scripted();
        for _ in 0..3 {
            mock.expect_silence(b"MD0;");
        }
        let rig = make_rig(mock, false);

        assert!(matches!(rig.get_mode(Vfo::A).await, Err(Error::Timeout)));
        assert_eq!(probe.write_count(), 3);
    }

    #[tokio::test]
    async fn mode_round_trip() {
        let (mut mock, _probe) = scripted();
        mock.expect(b"MD1C;", b"");
        mock.expect(b"MD1;", b"MD1C;");
        let rig = make_rig(mock, false);

        rig.set_mode(Vfo::B, Mode::DataUSB, None).await.unwrap();
        let (mode, width) = rig.get_mode(Vfo::B).await.unwrap();
        assert_eq!(mode, Mode::DataUSB);
        assert_eq!(width, Some(Passband::from_hz(600)));
    }

    #[tokio::test]
    async fn mode_with_undeclared_width_is_rejected() {
        let (mock, probe) = scripted();
        let rig = make_rig(mock, false);

        let result = rig
            .set_mode(Vfo::A, Mode::USB, Some(Passband::from_hz(500)))
            .await;
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
        assert_eq!(probe.write_count(), 0);
    }

    #[tokio::test]
    async fn vfo_selection_tracks_session() {
        let (mut mock, _probe) = scripted();
        mock.expect(b"VS1;", b"");
        mock.expect(b"FB;", b"FB021074000;");
        mock.expect(b"VS;", b"VS0;");
        let rig = make_rig(mock, false);

        rig.set_vfo(Vfo::B).await.unwrap();
        assert_eq!(rig.get_frequency(Vfo::Current).await.unwrap(), 21_074_000);
        assert_eq!(rig.get_vfo().await.unwrap(), Vfo::A);
        assert_eq!(rig.session().current_vfo().await, Vfo::A);
    }

    #[tokio::test]
    async fn ptt_and_split() {
        let (mut mock, _probe) = scripted();
        mock.expect(b"TX1;", b"");
        mock.expect(b"TX;", b"TX2;");
        mock.expect(b"FT3;", b"");
        mock.expect(b"FT;", b"FT1;");
        let rig = make_rig(mock, false);

        rig.set_ptt(Vfo::Current, true).await.unwrap();
        assert!(rig.get_ptt(Vfo::Current).await.unwrap());
        rig.set_split(Vfo::Current, true).await.unwrap();
        assert!(rig.get_split(Vfo::Current).await.unwrap());
    }

    #[tokio::test]
    async fn attenuator_uses_selector_index() {
        let (mut mock, _probe) = scripted();
        mock.expect(b"RA03;", b"");
        mock.expect(b"RA0;", b"RA02;");
        mock.expect(b"RA0;", b"RA00;");
        let rig = make_rig(mock, false);

        rig.set_level(Vfo::Current, Level::Attenuator, LevelValue::Int(18))
            .await
            .unwrap();
        let att = rig.get_level(Vfo::Current, Level::Attenuator).await.unwrap();
        assert_eq!(att, LevelValue::Int(12));
        let off = rig.get_level(Vfo::Current, Level::Attenuator).await.unwrap();
        assert_eq!(off, LevelValue::Int(0));
    }

    #[tokio::test]
    async fn unknown_attenuator_step_does_no_io() {
        let (mock, probe) = scripted();
        let rig = make_rig(mock, false);

        let result = rig
            .set_level(Vfo::Current, Level::Attenuator, LevelValue::Int(10))
            .await;
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
        let result = rig
            .set_level(Vfo::Current, Level::Preamp, LevelValue::Int(-3))
            .await;
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
        assert_eq!(probe.write_count(), 0);
    }

    #[tokio::test]
    async fn preamp_levels() {
        let (mut mock, _probe) = scripted();
        mock.expect(b"PA02;", b"");
        mock.expect(b"PA0;", b"PA01;");
        let rig = make_rig(mock, false);

        rig.set_level(Vfo::Current, Level::Preamp, LevelValue::Int(20))
            .await
            .unwrap();
        let amp = rig.get_level(Vfo::Current, Level::Preamp).await.unwrap();
        assert_eq!(amp, LevelValue::Int(10));
    }

    #[tokio::test]
    async fn meter_raw_and_calibrated() {
        let (mut mock, _probe) = scripted();
        mock.expect(b"SM0;", b"SM0130;");
        mock.expect(b"SM0;", b"SM0130;");
        mock.expect(b"SM0;", b"SM0000;");
        let rig = make_rig(mock, false);

        let raw = rig.get_level(Vfo::Current, Level::RawStrength).await.unwrap();
        assert_eq!(raw, LevelValue::Int(130));
        let s9 = rig.get_level(Vfo::Current, Level::Strength).await.unwrap();
        assert_eq!(s9, LevelValue::Int(0));
        let floor = rig.get_level(Vfo::Current, Level::Strength).await.unwrap();
        assert_eq!(floor, LevelValue::Int(-54));
    }

    #[tokio::test]
    async fn open_disables_auto_info_and_close_restores_it() {
        let (mut mock, probe) = scripted();
        mock.expect(b"AI;", b"AI1;");
        mock.expect(b"AI0;", b"");
        mock.expect(b"AI1;", b"");
        let rig = make_rig(mock, true);

        rig.open().await.unwrap();
        rig.close().await.unwrap();
        assert_eq!(probe.remaining_expectations(), 0);
        assert!(!probe.is_connected());
    }

    #[tokio::test]
    async fn close_without_restore_leaves_auto_info_off() {
        let (mut mock, probe) = scripted();
        mock.expect(b"AI;", b"AI1;");
        mock.expect(b"AI0;", b"");
        let rig = make_rig(mock, false);

        rig.open().await.unwrap();
        rig.close().await.unwrap();
        assert_eq!(probe.write_count(), 2);
    }

    #[tokio::test]
    async fn rit_is_unsupported() {
        let (mock, probe) = scripted();
        let rig = make_rig(mock, false);
        assert!(matches!(
            rig.set_rit(Vfo::Current, 100).await,
            Err(Error::Unsupported(_))
        ));
        assert_eq!(probe.write_count(), 0);
    }
}
