//! IcomRig -- the [`Rig`] implementation for CI-V transceivers.
//!
//! Every command is answered: reads with data, writes with ACK or NAK. The
//! bus echo of each command is skipped by the engine before the answer is
//! decoded.
//!
//! Frequency and mode commands act on the selected VFO. Addressing another
//! VFO selects it first and leaves it selected, even if the following
//! command fails.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use catlink_core::caps::{CapabilityDescriptor, index_to_step, step_to_index};
use catlink_core::config::SessionConfig;
use catlink_core::engine::TransactionRequest;
use catlink_core::error::{Error, Result};
use catlink_core::rig::Rig;
use catlink_core::session::{RigSession, SessionInner};
use catlink_core::transport::Transport;
use catlink_core::types::*;

use crate::civ::Civ;
use crate::commands::{self as cmd, FilterSlot};

/// A connected CI-V rig.
#[derive(Debug)]
pub struct IcomRig {
    session: RigSession,
    civ: Civ,
}

impl IcomRig {
    /// Fails when neither the config nor the model supplies a CI-V address.
    pub fn new(
        descriptor: Arc<CapabilityDescriptor>,
        transport: Box<dyn Transport>,
        config: SessionConfig,
    ) -> Result<Self> {
        let address = config.address_for(&descriptor).ok_or_else(|| {
            Error::InvalidParameter(format!(
                "{} needs a CI-V address",
                descriptor.model_name
            ))
        })?;
        Ok(IcomRig {
            session: RigSession::new(descriptor, transport, config),
            civ: Civ::new(address),
        })
    }

    pub fn address(&self) -> u8 {
        self.civ.rig
    }

    fn desc(&self) -> &CapabilityDescriptor {
        self.session.descriptor()
    }

    /// Whether the model switches a data modulator on top of the base mode.
    fn has_data_modes(&self) -> bool {
        self.desc()
            .check_mode(self.session.region(), Mode::DataUSB)
            .is_ok()
    }

    /// Run a set command and require an ACK.
    async fn ack(&self, inner: &mut SessionInner, request: TransactionRequest) -> Result<()> {
        let reply = inner.transact(request).await?;
        self.civ.expect_ack(&reply)
    }

    /// Run a read and return its data.
    async fn data(
        &self,
        inner: &mut SessionInner,
        request: TransactionRequest,
        cmd: u8,
        sub: &[u8],
    ) -> Result<Vec<u8>> {
        let reply = inner.transact(request).await?;
        self.civ.expect_data(&reply, cmd, sub)
    }

    /// Make `vfo` the selected VFO unless it already is.
    async fn select(&self, inner: &mut SessionInner, vfo: Vfo) -> Result<Vfo> {
        let desc = self.desc();
        let target = inner.state.resolve(vfo);
        desc.check_vfo(target)?;
        if target != inner.state.current_vfo() {
            debug!(from = %inner.state.current_vfo(), to = %target, "switching VFO");
            self.ack(inner, cmd::select_vfo(&self.civ, target)?).await?;
            inner.state.set_current_vfo(desc, target)?;
        }
        Ok(target)
    }

    async fn read_meter(&self, inner: &mut SessionInner, level: Level) -> Result<u16> {
        let sub = cmd::meter_sub(level).ok_or_else(|| Error::Unsupported(format!("level {level}")))?;
        let data = self
            .data(inner, cmd::read_meter(&self.civ, sub), cmd::CMD_METER, &[sub])
            .await?;
        cmd::parse_level(&data)
    }

    async fn read_clock_item(&self, inner: &mut SessionInner, item: [u8; 2]) -> Result<Vec<u8>> {
        let sub = [cmd::SUB_CLOCK, item[0], item[1]];
        self.data(inner, cmd::read_clock_item(&self.civ, item), cmd::CMD_MISC, &sub)
            .await
    }

    fn filter_slot(&self, mode: Mode, width: Option<Passband>) -> Option<FilterSlot> {
        let desc = self.desc();
        let width = width?;
        match desc.default_filter(mode) {
            Some(normal) if width < normal => Some(FilterSlot::Narrow),
            Some(normal) if width > normal => Some(FilterSlot::Wide),
            _ => Some(FilterSlot::Normal),
        }
    }

    fn slot_width(&self, mode: Mode, slot: Option<FilterSlot>) -> Option<Passband> {
        let desc = self.desc();
        match slot {
            Some(FilterSlot::Narrow) => desc.narrow_filter(mode),
            Some(FilterSlot::Wide) => desc.wide_filter(mode),
            _ => desc.default_filter(mode),
        }
    }
}

#[async_trait]
impl Rig for IcomRig {
    fn session(&self) -> &RigSession {
        &self.session
    }

    async fn get_frequency(&self, vfo: Vfo) -> Result<u64> {
        self.desc().check_vfo(vfo)?;
        let mut inner = self.session.lock().await;
        self.select(&mut inner, vfo).await?;
        let data = self
            .data(&mut inner, cmd::read_frequency(&self.civ), cmd::CMD_READ_FREQ, &[])
            .await?;
        crate::civ::bcd_to_freq(&data)
    }

    /// Selects `vfo` first when it is not the current one. The selection
    /// stays if the frequency write then fails.
    async fn set_frequency(&self, vfo: Vfo, freq_hz: u64) -> Result<()> {
        let desc = self.desc();
        desc.check_vfo(vfo)?;
        let mut inner = self.session.lock().await;
        let target = inner.state.resolve(vfo);
        desc.check_rx_frequency(self.session.region(), target, freq_hz)?;
        let request = cmd::set_frequency(&self.civ, freq_hz)?;
        self.select(&mut inner, target).await?;
        self.ack(&mut inner, request).await
    }

    async fn get_mode(&self, vfo: Vfo) -> Result<(Mode, Option<Passband>)> {
        self.desc().check_vfo(vfo)?;
        let mut inner = self.session.lock().await;
        self.select(&mut inner, vfo).await?;
        let data = self
            .data(&mut inner, cmd::read_mode(&self.civ), cmd::CMD_READ_MODE, &[])
            .await?;
        let (mut mode, slot) = cmd::parse_mode(&data)?;

        if let (true, Some(data_mode)) = (self.has_data_modes(), cmd::with_data(mode)) {
            let data = self
                .data(
                    &mut inner,
                    cmd::read_data_mode(&self.civ),
                    cmd::CMD_MISC,
                    &[cmd::SUB_DATA_MODE],
                )
                .await?;
            if cmd::parse_data_mode(&data)? {
                mode = data_mode;
            }
        }
        Ok((mode, self.slot_width(mode, slot)))
    }

    /// A passband picks the filter slot by comparing it with the mode's
    /// normal width. Data modes set the base mode, then the data modulator.
    async fn set_mode(&self, vfo: Vfo, mode: Mode, passband: Option<Passband>) -> Result<()> {
        let desc = self.desc();
        desc.check_vfo(vfo)?;
        desc.check_mode(self.session.region(), mode)?;
        let width = match passband {
            Some(_) => desc.filter_for(mode, passband)?,
            None => None,
        };
        let slot = self.filter_slot(mode, width);
        let data_request = if cmd::is_data_mode(mode) {
            Some(cmd::set_data_mode(
                &self.civ,
                true,
                slot.unwrap_or(FilterSlot::Normal),
            ))
        } else if self.has_data_modes() && cmd::with_data(mode).is_some() {
            Some(cmd::set_data_mode(&self.civ, false, FilterSlot::Normal))
        } else {
            None
        };

        let mut inner = self.session.lock().await;
        self.select(&mut inner, vfo).await?;
        self.ack(&mut inner, cmd::set_mode(&self.civ, mode, slot)).await?;
        if let Some(request) = data_request {
            self.ack(&mut inner, request).await?;
        }
        Ok(())
    }

    /// CI-V has no VFO query on these models; this is the VFO the session
    /// last selected.
    async fn get_vfo(&self) -> Result<Vfo> {
        Ok(self.session.current_vfo().await)
    }

    async fn set_vfo(&self, vfo: Vfo) -> Result<()> {
        let desc = self.desc();
        desc.check_vfo(vfo)?;
        let mut inner = self.session.lock().await;
        let target = inner.state.resolve(vfo);
        desc.check_vfo(target)?;
        self.ack(&mut inner, cmd::select_vfo(&self.civ, target)?).await?;
        inner.state.set_current_vfo(desc, target)
    }

    async fn get_ptt(&self, _vfo: Vfo) -> Result<bool> {
        let mut inner = self.session.lock().await;
        let data = self
            .data(&mut inner, cmd::read_ptt(&self.civ), cmd::CMD_TX, &[cmd::SUB_PTT])
            .await?;
        cmd::parse_switch(&data)
    }

    async fn set_ptt(&self, _vfo: Vfo, on: bool) -> Result<()> {
        let mut inner = self.session.lock().await;
        self.ack(&mut inner, cmd::set_ptt(&self.civ, on)).await
    }

    async fn get_split(&self, _vfo: Vfo) -> Result<bool> {
        let mut inner = self.session.lock().await;
        let data = self
            .data(&mut inner, cmd::read_split(&self.civ), cmd::CMD_SPLIT, &[])
            .await?;
        cmd::parse_switch(&data)
    }

    async fn set_split(&self, _vfo: Vfo, on: bool) -> Result<()> {
        let mut inner = self.session.lock().await;
        self.ack(&mut inner, cmd::set_split(&self.civ, on)).await
    }

    /// Meters come back calibrated: `Strength` in dB over S9, `Swr` as a
    /// ratio, power in watts, voltage and current in volts and amperes.
    /// `RfPower` is the power setting from 0.0 to 1.0.
    async fn get_level(&self, _vfo: Vfo, level: Level) -> Result<LevelValue> {
        let desc = self.desc();
        desc.check_level(level, false)?;
        let mut inner = self.session.lock().await;
        match level {
            Level::Attenuator => {
                let data = self
                    .data(
                        &mut inner,
                        cmd::read_attenuator(&self.civ),
                        cmd::CMD_ATTENUATOR,
                        &[],
                    )
                    .await?;
                let db = desc.decode_attenuator(cmd::parse_selector(&data)?)?;
                Ok(LevelValue::Int(i32::from(db)))
            }
            Level::Preamp => {
                let data = self
                    .data(
                        &mut inner,
                        cmd::read_preamp(&self.civ),
                        cmd::CMD_FUNC,
                        &[cmd::SUB_PREAMP],
                    )
                    .await?;
                let db = index_to_step(&desc.preamp, cmd::parse_selector(&data)?)?;
                Ok(LevelValue::Int(i32::from(db)))
            }
            Level::RfPower => {
                let data = self
                    .data(
                        &mut inner,
                        cmd::read_rf_power(&self.civ),
                        cmd::CMD_LEVEL,
                        &[cmd::SUB_RF_POWER],
                    )
                    .await?;
                Ok(LevelValue::Float(f32::from(cmd::parse_level(&data)?) / 255.0))
            }
            Level::RawStrength => {
                let raw = self.read_meter(&mut inner, level).await?;
                Ok(LevelValue::Int(i32::from(raw)))
            }
            meter => {
                let table = desc
                    .calibration(meter)
                    .copied()
                    .ok_or_else(|| Error::Unsupported(format!("level {meter}")))?;
                let raw = i32::from(self.read_meter(&mut inner, meter).await?);
                let value = table.interpolate(raw);
                Ok(if meter.is_float() {
                    LevelValue::Float(value)
                } else {
                    LevelValue::Int(value.round() as i32)
                })
            }
        }
    }

    async fn set_level(&self, _vfo: Vfo, level: Level, value: LevelValue) -> Result<()> {
        let desc = self.desc();
        desc.check_level(level, true)?;
        let request = match level {
            Level::Attenuator | Level::Preamp => {
                let db = u8::try_from(value.as_int())
                    .map_err(|_| Error::InvalidParameter(format!("{level} {value} dB")))?;
                if level == Level::Attenuator {
                    cmd::set_attenuator(&self.civ, desc.encode_attenuator(db)?)?
                } else {
                    cmd::set_preamp(&self.civ, step_to_index(&desc.preamp, db)?)
                }
            }
            Level::RfPower => {
                let fraction = value.as_float();
                if !(0.0..=1.0).contains(&fraction) {
                    return Err(Error::InvalidParameter(format!(
                        "RF power {fraction} outside 0.0..=1.0"
                    )));
                }
                cmd::set_rf_power(&self.civ, (fraction * 255.0).round() as u16)?
            }
            other => return Err(Error::Unsupported(format!("setting level {other}"))),
        };
        let mut inner = self.session.lock().await;
        self.ack(&mut inner, request).await
    }

    /// The channel last selected through this session; CI-V cannot read
    /// it back on these models.
    async fn get_mem(&self, _vfo: Vfo) -> Result<u32> {
        self.session
            .state()
            .await
            .current_memory_channel
            .ok_or_else(|| Error::InvalidOperation("no memory channel selected yet".into()))
    }

    /// Select `channel`, which also puts the rig in memory mode.
    async fn set_mem(&self, _vfo: Vfo, channel: u32) -> Result<()> {
        let desc = self.desc();
        desc.check_memory_channel(channel)?;
        let request = cmd::select_memory(&self.civ, channel)?;
        let mut inner = self.session.lock().await;
        self.ack(&mut inner, request).await?;
        inner.state.current_memory_channel = Some(channel);
        if desc.vfos.contains(Vfo::Memory) {
            inner.state.set_current_vfo(desc, Vfo::Memory)?;
        }
        Ok(())
    }

    async fn vfo_op(&self, _vfo: Vfo, op: VfoOp) -> Result<()> {
        self.desc().check_vfo_op(op)?;
        let mut inner = self.session.lock().await;
        self.ack(&mut inner, cmd::vfo_op(&self.civ, op)).await
    }

    /// Starting a scan first switches the rig into VFO or memory mode.
    async fn scan(&self, _vfo: Vfo, op: ScanOp) -> Result<()> {
        let desc = self.desc();
        desc.check_scan(op)?;
        let mut inner = self.session.lock().await;
        match op {
            ScanOp::Stop => {}
            ScanOp::Vfo => self.ack(&mut inner, cmd::vfo_mode(&self.civ)).await?,
            ScanOp::Memory => {
                self.ack(&mut inner, cmd::select_vfo(&self.civ, Vfo::Memory)?)
                    .await?;
                inner.state.set_current_vfo(desc, Vfo::Memory)?;
            }
        }
        self.ack(&mut inner, cmd::scan(&self.civ, op)).await
    }

    /// Seconds are not kept by the rig and read as 0.
    async fn get_clock(&self) -> Result<ClockTime> {
        self.desc().check_parm(Parm::Time, false)?;
        let mut inner = self.session.lock().await;
        let date = self.read_clock_item(&mut inner, cmd::CLOCK_DATE).await?;
        let (year, month, day) = cmd::parse_date(&date)?;
        let time = self.read_clock_item(&mut inner, cmd::CLOCK_TIME).await?;
        let (hour, minute) = cmd::parse_time(&time)?;
        let offset = self.read_clock_item(&mut inner, cmd::CLOCK_UTC_OFFSET).await?;
        let utc_offset = cmd::parse_utc_offset(&offset)?;
        Ok(ClockTime {
            year,
            month,
            day,
            hour,
            minute,
            second: 0,
            utc_offset,
        })
    }

    /// Writes date, time and UTC offset in that order, stopping at the
    /// first refusal.
    async fn set_clock(&self, time: &ClockTime) -> Result<()> {
        self.desc().check_parm(Parm::Time, true)?;
        let requests = cmd::set_clock(&self.civ, time)?;
        let mut inner = self.session.lock().await;
        for request in requests {
            self.ack(&mut inner, request).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catlink_test_harness::{MockProbe, MockTransport};
    use std::time::Duration;

    use crate::civ::encode_frame;
    use crate::models;

    const RIG: u8 = 0x6a;
    const ME: u8 = 0xe0;

    fn to_rig(cmd: u8, sub: Option<u8>, data: &[u8]) -> Vec<u8> {
        encode_frame(RIG, ME, cmd, sub, data)
    }

    fn from_rig(cmd: u8, sub: Option<u8>, data: &[u8]) -> Vec<u8> {
        encode_frame(ME, RIG, cmd, sub, data)
    }

    fn ack() -> Vec<u8> {
        from_rig(0xFB, None, &[])
    }

    /// Script a command: the bus echoes it, then the rig answers.
    fn exchange(mock: &mut MockTransport, request: Vec<u8>, answer: Vec<u8>) {
        let mut reply = request.clone();
        reply.extend(answer);
        mock.expect(&request, &reply);
    }

    fn make_rig(mock: MockTransport) -> IcomRig {
        let config = SessionConfig::default().with_timeout(Duration::from_millis(20));
        IcomRig::new(Arc::new(models::ic_7800()), Box::new(mock), config).unwrap()
    }

    fn scripted() -> (MockTransport, MockProbe) {
        let mock = MockTransport::new();
        let probe = mock.probe();
        (mock, probe)
    }

    #[tokio::test]
    async fn address_override() {
        let config = SessionConfig::default().with_address(0x42);
        let rig = IcomRig::new(
            Arc::new(models::ic_7800()),
            Box::new(MockTransport::new()),
            config,
        )
        .unwrap();
        assert_eq!(rig.address(), 0x42);
    }

    #[tokio::test]
    async fn get_frequency_skips_echo() {
        let (mut mock, _probe) = scripted();
        exchange(
            &mut mock,
            to_rig(0x03, None, &[]),
            from_rig(0x03, None, &[0x00, 0x40, 0x07, 0x14, 0x00]),
        );
        let rig = make_rig(mock);
        assert_eq!(rig.get_frequency(Vfo::Current).await.unwrap(), 14_074_000);
    }

    #[tokio::test]
    async fn set_frequency_on_sub_selects_it_first() {
        let (mut mock, probe) = scripted();
        exchange(&mut mock, to_rig(0x07, Some(0xD1), &[]), ack());
        exchange(
            &mut mock,
            to_rig(0x05, None, &[0x00, 0x00, 0x25, 0x14, 0x00]),
            ack(),
        );
        let rig = make_rig(mock);

        rig.set_frequency(Vfo::Sub, 14_250_000).await.unwrap();
        assert_eq!(rig.session().current_vfo().await, Vfo::Sub);
        assert_eq!(probe.remaining_expectations(), 0);
    }

    #[tokio::test]
    async fn nak_after_vfo_switch_keeps_new_vfo() {
        let (mut mock, _probe) = scripted();
        exchange(&mut mock, to_rig(0x07, Some(0xD1), &[]), ack());
        exchange(
            &mut mock,
            to_rig(0x05, None, &[0x00, 0x00, 0x25, 0x14, 0x00]),
            from_rig(0xFA, None, &[]),
        );
        let rig = make_rig(mock);

        let result = rig.set_frequency(Vfo::Sub, 14_250_000).await;
        assert!(matches!(result, Err(Error::Protocol(_))));
        assert_eq!(rig.session().current_vfo().await, Vfo::Sub);
    }

    #[tokio::test]
    async fn out_of_range_frequency_does_no_io() {
        let (mock, probe) = scripted();
        let rig = make_rig(mock);
        let result = rig.set_frequency(Vfo::Main, 144_000_000).await;
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
        assert!(matches!(
            rig.set_frequency(Vfo::A, 7_000_000).await,
            Err(Error::InvalidParameter(_))
        ));
        assert_eq!(probe.write_count(), 0);
    }

    #[tokio::test]
    async fn silent_rig_times_out_after_every_attempt() {
        let (mut mock, probe) = scripted();
        for _ in 0..3 {
            mock.expect_silence(&to_rig(0x03, None, &[]));
        }
        let rig = make_rig(mock);
        assert!(matches!(
            rig.get_frequency(Vfo::Current).await,
            Err(Error::Timeout)
        ));
        assert_eq!(probe.write_count(), 3);
    }

    #[tokio::test]
    async fn get_mode_reads_filter_and_data_state() {
        let (mut mock, _probe) = scripted();
        exchange(
            &mut mock,
            to_rig(0x04, None, &[]),
            from_rig(0x04, Some(0x01), &[0x03]),
        );
        exchange(
            &mut mock,
            to_rig(0x1A, Some(0x06), &[]),
            from_rig(0x1A, Some(0x06), &[0x01, 0x02]),
        );
        exchange(
            &mut mock,
            to_rig(0x04, None, &[]),
            from_rig(0x04, Some(0x03), &[0x03]),
        );
        let rig = make_rig(mock);

        assert_eq!(
            rig.get_mode(Vfo::Current).await.unwrap(),
            (Mode::DataUSB, Some(Passband::from_hz(1800)))
        );
        assert_eq!(
            rig.get_mode(Vfo::Current).await.unwrap(),
            (Mode::CW, Some(Passband::from_hz(50)))
        );
    }

    #[tokio::test]
    async fn set_mode_with_filter_clears_data_modulator() {
        let (mut mock, probe) = scripted();
        exchange(&mut mock, to_rig(0x06, None, &[0x01, 0x01]), ack());
        exchange(&mut mock, to_rig(0x1A, Some(0x06), &[0x00, 0x00]), ack());
        exchange(&mut mock, to_rig(0x06, None, &[0x03]), ack());
        let rig = make_rig(mock);

        rig.set_mode(Vfo::Current, Mode::USB, Some(Passband::from_hz(3000)))
            .await
            .unwrap();
        rig.set_mode(Vfo::Current, Mode::CW, None).await.unwrap();
        assert_eq!(probe.remaining_expectations(), 0);
    }

    #[tokio::test]
    async fn set_data_mode() {
        let (mut mock, _probe) = scripted();
        exchange(&mut mock, to_rig(0x06, None, &[0x00]), ack());
        exchange(&mut mock, to_rig(0x1A, Some(0x06), &[0x01, 0x02]), ack());
        let rig = make_rig(mock);
        rig.set_mode(Vfo::Current, Mode::DataLSB, None).await.unwrap();
    }

    #[tokio::test]
    async fn set_mode_rejects_undeclared_width() {
        let (mock, probe) = scripted();
        let rig = make_rig(mock);
        let result = rig
            .set_mode(Vfo::Current, Mode::USB, Some(Passband::from_hz(2700)))
            .await;
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
        assert_eq!(probe.write_count(), 0);
    }

    #[tokio::test]
    async fn vfo_selection() {
        let (mut mock, _probe) = scripted();
        exchange(&mut mock, to_rig(0x08, None, &[]), ack());
        let rig = make_rig(mock);

        assert_eq!(rig.get_vfo().await.unwrap(), Vfo::Main);
        rig.set_vfo(Vfo::Memory).await.unwrap();
        assert_eq!(rig.get_vfo().await.unwrap(), Vfo::Memory);
        assert!(matches!(
            rig.set_vfo(Vfo::B).await,
            Err(Error::InvalidParameter(_))
        ));
    }

    #[tokio::test]
    async fn ptt_and_split() {
        let (mut mock, _probe) = scripted();
        exchange(&mut mock, to_rig(0x1C, Some(0x00), &[0x01]), ack());
        exchange(
            &mut mock,
            to_rig(0x1C, Some(0x00), &[]),
            from_rig(0x1C, Some(0x00), &[0x01]),
        );
        exchange(&mut mock, to_rig(0x0F, Some(0x01), &[]), ack());
        exchange(
            &mut mock,
            to_rig(0x0F, None, &[]),
            from_rig(0x0F, Some(0x00), &[]),
        );
        let rig = make_rig(mock);

        rig.set_ptt(Vfo::Current, true).await.unwrap();
        assert!(rig.get_ptt(Vfo::Current).await.unwrap());
        rig.set_split(Vfo::Current, true).await.unwrap();
        assert!(!rig.get_split(Vfo::Current).await.unwrap());
    }

    #[tokio::test]
    async fn attenuator_index_remap() {
        let (mut mock, _probe) = scripted();
        exchange(
            &mut mock,
            to_rig(0x11, None, &[]),
            from_rig(0x11, Some(0x03), &[]),
        );
        exchange(
            &mut mock,
            to_rig(0x11, None, &[]),
            from_rig(0x11, Some(0x00), &[]),
        );
        exchange(&mut mock, to_rig(0x11, None, &[0x07]), ack());
        let rig = make_rig(mock);

        assert_eq!(
            rig.get_level(Vfo::Current, Level::Attenuator).await.unwrap(),
            LevelValue::Int(9)
        );
        assert_eq!(
            rig.get_level(Vfo::Current, Level::Attenuator).await.unwrap(),
            LevelValue::Int(0)
        );
        rig.set_level(Vfo::Current, Level::Attenuator, LevelValue::Int(21))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn unknown_attenuator_step_is_rejected() {
        let (mock, probe) = scripted();
        let rig = make_rig(mock);
        let result = rig
            .set_level(Vfo::Current, Level::Attenuator, LevelValue::Int(10))
            .await;
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
        assert_eq!(probe.write_count(), 0);
    }

    #[tokio::test]
    async fn preamp_and_rf_power() {
        let (mut mock, _probe) = scripted();
        exchange(&mut mock, to_rig(0x16, Some(0x02), &[0x02]), ack());
        exchange(
            &mut mock,
            to_rig(0x16, Some(0x02), &[]),
            from_rig(0x16, Some(0x02), &[0x01]),
        );
        exchange(&mut mock, to_rig(0x14, Some(0x0A), &[0x01, 0x28]), ack());
        exchange(
            &mut mock,
            to_rig(0x14, Some(0x0A), &[]),
            from_rig(0x14, Some(0x0A), &[0x02, 0x55]),
        );
        let rig = make_rig(mock);

        rig.set_level(Vfo::Current, Level::Preamp, LevelValue::Int(16))
            .await
            .unwrap();
        assert_eq!(
            rig.get_level(Vfo::Current, Level::Preamp).await.unwrap(),
            LevelValue::Int(10)
        );
        rig.set_level(Vfo::Current, Level::RfPower, LevelValue::Float(0.5))
            .await
            .unwrap();
        assert_eq!(
            rig.get_level(Vfo::Current, Level::RfPower).await.unwrap(),
            LevelValue::Float(1.0)
        );
    }

    #[tokio::test]
    async fn rf_power_out_of_range() {
        let (mock, probe) = scripted();
        let rig = make_rig(mock);
        let result = rig
            .set_level(Vfo::Current, Level::RfPower, LevelValue::Float(1.5))
            .await;
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
        assert_eq!(probe.write_count(), 0);
    }

    #[tokio::test]
    async fn meters_are_calibrated() {
        let (mut mock, _probe) = scripted();
        exchange(
            &mut mock,
            to_rig(0x15, Some(0x02), &[]),
            from_rig(0x15, Some(0x02), &[0x01, 0x20]),
        );
        exchange(
            &mut mock,
            to_rig(0x15, Some(0x12), &[]),
            from_rig(0x15, Some(0x12), &[0x01, 0x00]),
        );
        exchange(
            &mut mock,
            to_rig(0x15, Some(0x02), &[]),
            from_rig(0x15, Some(0x02), &[0x00, 0x64]),
        );
        let rig = make_rig(mock);

        assert_eq!(
            rig.get_level(Vfo::Current, Level::Strength).await.unwrap(),
            LevelValue::Int(0)
        );
        assert_eq!(
            rig.get_level(Vfo::Current, Level::Swr).await.unwrap(),
            LevelValue::Float(2.5)
        );
        assert_eq!(
            rig.get_level(Vfo::Current, Level::RawStrength).await.unwrap(),
            LevelValue::Int(64)
        );
    }

    #[tokio::test]
    async fn memory_channel() {
        let (mut mock, _probe) = scripted();
        exchange(&mut mock, to_rig(0x08, None, &[0x00, 0x42]), ack());
        let rig = make_rig(mock);

        assert!(matches!(
            rig.get_mem(Vfo::Current).await,
            Err(Error::InvalidOperation(_))
        ));
        rig.set_mem(Vfo::Current, 42).await.unwrap();
        assert_eq!(rig.get_mem(Vfo::Current).await.unwrap(), 42);
        assert_eq!(rig.session().current_vfo().await, Vfo::Memory);
        assert!(matches!(
            rig.set_mem(Vfo::Current, 100).await,
            Err(Error::InvalidParameter(_))
        ));
    }

    #[tokio::test]
    async fn scan_start_and_stop() {
        let (mut mock, _probe) = scripted();
        exchange(&mut mock, to_rig(0x08, None, &[]), ack());
        exchange(&mut mock, to_rig(0x0E, Some(0x01), &[]), ack());
        exchange(&mut mock, to_rig(0x0E, Some(0x00), &[]), ack());
        let rig = make_rig(mock);

        rig.scan(Vfo::Current, ScanOp::Memory).await.unwrap();
        rig.scan(Vfo::Current, ScanOp::Stop).await.unwrap();
    }

    #[tokio::test]
    async fn clock_round_trip() {
        let (mut mock, probe) = scripted();
        exchange(
            &mut mock,
            to_rig(0x1A, Some(0x05), &[0x00, 0x59]),
            from_rig(0x1A, Some(0x05), &[0x00, 0x59, 0x20, 0x24, 0x06, 0x01]),
        );
        exchange(
            &mut mock,
            to_rig(0x1A, Some(0x05), &[0x00, 0x60]),
            from_rig(0x1A, Some(0x05), &[0x00, 0x60, 0x13, 0x45]),
        );
        exchange(
            &mut mock,
            to_rig(0x1A, Some(0x05), &[0x00, 0x62]),
            from_rig(0x1A, Some(0x05), &[0x00, 0x62, 0x01, 0x00, 0x00]),
        );
        let rig = make_rig(mock);

        let time = rig.get_clock().await.unwrap();
        assert_eq!(
            time,
            ClockTime {
                year: 2024,
                month: 6,
                day: 1,
                hour: 13,
                minute: 45,
                second: 0,
                utc_offset: 100,
            }
        );
        assert_eq!(probe.remaining_expectations(), 0);
    }

    #[tokio::test]
    async fn set_clock_stops_at_nak() {
        let (mut mock, probe) = scripted();
        exchange(
            &mut mock,
            to_rig(0x1A, Some(0x05), &[0x00, 0x59, 0x20, 0x24, 0x06, 0x01]),
            ack(),
        );
        exchange(
            &mut mock,
            to_rig(0x1A, Some(0x05), &[0x00, 0x60, 0x13, 0x45]),
            from_rig(0xFA, None, &[]),
        );
        let rig = make_rig(mock);

        let time = ClockTime {
            year: 2024,
            month: 6,
            day: 1,
            hour: 13,
            minute: 45,
            second: 0,
            utc_offset: 0,
        };
        assert!(matches!(rig.set_clock(&time).await, Err(Error::Protocol(_))));
        assert_eq!(probe.write_count(), 2);
    }

    #[tokio::test]
    async fn ic275_has_no_clock_or_levels() {
        let (mock, probe) = scripted();
        let config = SessionConfig::default();
        let rig = IcomRig::new(Arc::new(models::ic_275()), Box::new(mock), config).unwrap();

        assert_eq!(rig.address(), 0x10);
        assert!(matches!(rig.get_clock().await, Err(Error::Unsupported(_))));
        assert!(matches!(
            rig.get_level(Vfo::Current, Level::Strength).await,
            Err(Error::Unsupported(_))
        ));
        assert!(matches!(
            rig.scan(Vfo::Current, ScanOp::Vfo).await,
            Err(Error::Unsupported(_))
        ));
        assert_eq!(probe.write_count(), 0);
    }

    #[tokio::test]
    async fn ic275_memory_transfer() {
        let (mut mock, _probe) = scripted();
        let to = |cmd, sub, data: &[u8]| encode_frame(0x10, ME, cmd, sub, data);
        let mut echo = to(0x0A, None, &[]);
        echo.extend(encode_frame(ME, 0x10, 0xFB, None, &[]));
        mock.expect(&to(0x0A, None, &[]), &echo);
        let rig = IcomRig::new(
            Arc::new(models::ic_275()),
            Box::new(mock),
            SessionConfig::default(),
        )
        .unwrap();

        rig.vfo_op(Vfo::Current, VfoOp::ToVfo).await.unwrap();
        assert!(matches!(
            rig.vfo_op(Vfo::Current, VfoOp::Exchange).await,
            Err(Error::Unsupported(_))
        ));
    }
}
