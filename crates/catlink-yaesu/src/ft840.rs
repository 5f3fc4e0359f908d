//! Ft840 -- the [`Rig`] implementation for the Yaesu FT-840.
//!
//! The FT-840 never acknowledges a command, so writes are fire-and-forget
//! and everything the rig reports comes from status block reads. Each block
//! read is cached in the session's status snapshot.
//!
//! Operations on a VFO other than the selected one switch the rig first.
//! If a later step fails the rig stays on the new VFO; nothing is rolled
//! back.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use catlink_core::caps::CapabilityDescriptor;
use catlink_core::config::SessionConfig;
use catlink_core::engine::{Reply, TransactionRequest};
use catlink_core::error::{Error, Result};
use catlink_core::rig::Rig;
use catlink_core::session::{RigSession, SessionInner};
use catlink_core::transport::Transport;
use catlink_core::types::*;

use crate::ft840_commands::{self as cmd, NativeCommand, StatusFlags};

/// A connected FT-840.
#[derive(Debug)]
pub struct Ft840 {
    session: RigSession,
}

impl Ft840 {
    pub fn new(
        descriptor: Arc<CapabilityDescriptor>,
        transport: Box<dyn Transport>,
        config: SessionConfig,
    ) -> Self {
        Ft840 {
            session: RigSession::new(descriptor, transport, config),
        }
    }

    fn desc(&self) -> &CapabilityDescriptor {
        self.session.descriptor()
    }
}

/// Send a frame that gets no reply.
async fn send(inner: &mut SessionInner, op: &'static str, frame: Vec<u8>) -> Result<()> {
    inner.transact(TransactionRequest::write(op, frame)).await?;
    Ok(())
}

/// Issue a status read and cache the block.
async fn read_block(inner: &mut SessionInner, read: NativeCommand) -> Result<Bytes> {
    let request = TransactionRequest::query(
        "read_status",
        cmd::frame(read)?,
        Reply::Exact(read.reply_len()),
    );
    let block = inner.transact(request).await?;
    inner.state.status_snapshot = block.clone();
    Ok(block)
}

/// Select `vfo` on the rig and record it in the session.
async fn select_vfo(
    inner: &mut SessionInner,
    desc: &CapabilityDescriptor,
    vfo: Vfo,
) -> Result<()> {
    let vfo = inner.state.resolve(vfo);
    desc.check_vfo(vfo)?;
    let frame = match vfo {
        Vfo::A => cmd::frame(NativeCommand::SelectVfoA)?,
        Vfo::B => cmd::frame(NativeCommand::SelectVfoB)?,
        Vfo::Memory => {
            let channel = inner.state.current_memory_channel.unwrap_or(1);
            cmd::recall_memory(memory_wire(channel)?)?
        }
        other => return Err(Error::InvalidParameter(format!("FT-840 has no {other}"))),
    };
    send(inner, "set_vfo", frame).await?;
    inner.state.set_current_vfo(desc, vfo)
}

/// Read which VFO the display shows, and the memory channel when in
/// memory mode.
async fn query_vfo(inner: &mut SessionInner, desc: &CapabilityDescriptor) -> Result<Vfo> {
    let block = read_block(inner, NativeCommand::ReadFlags).await?;
    let vfo = StatusFlags::from_block(&block)?.active_vfo()?;
    if vfo == Vfo::Memory {
        let block = read_block(inner, NativeCommand::ReadMemoryChannel).await?;
        let channel = cmd::decode_memory_channel(&block)?;
        debug!(channel, "rig is in memory mode");
        inner.state.current_memory_channel = Some(channel);
    }
    inner.state.set_current_vfo(desc, vfo)?;
    Ok(vfo)
}

fn memory_wire(channel: u32) -> Result<u8> {
    u8::try_from(channel)
        .map_err(|_| Error::InvalidParameter(format!("memory channel {channel}")))
}

#[async_trait]
impl Rig for Ft840 {
    fn session(&self) -> &RigSession {
        &self.session
    }

    /// Send the configured pacing value so status blocks arrive at a rate
    /// the host can keep up with.
    async fn open(&self) -> Result<()> {
        let mut inner = self.session.lock().await;
        let pacing = inner.state.pacing;
        debug!(pacing, "setting read pacing");
        send(&mut inner, "set_pacing", cmd::pacing(pacing)?).await
    }

    /// Reading `Vfo::Current` asks the rig which VFO is displayed rather
    /// than trusting the session.
    async fn get_frequency(&self, vfo: Vfo) -> Result<u64> {
        let desc = self.desc();
        desc.check_vfo(vfo)?;
        let mut inner = self.session.lock().await;
        let vfo = match vfo {
            Vfo::Current => query_vfo(&mut inner, desc).await?,
            v => v,
        };
        let (read, layout) = cmd::channel_source(vfo)?;
        let block = read_block(&mut inner, read).await?;
        cmd::decode_frequency(&block, layout)
    }

    /// Setting the frequency of a VFO other than the selected one selects
    /// it first. The selection stays if the frequency write then fails.
    async fn set_frequency(&self, vfo: Vfo, freq_hz: u64) -> Result<()> {
        let desc = self.desc();
        desc.check_vfo(vfo)?;
        let mut inner = self.session.lock().await;
        let target = inner.state.resolve(vfo);
        desc.check_rx_frequency(self.session.region(), target, freq_hz)?;
        let frame = cmd::set_frequency(freq_hz)?;

        if target != inner.state.current_vfo() {
            select_vfo(&mut inner, desc, target).await?;
        }
        send(&mut inner, "set_freq", frame).await
    }

    async fn get_mode(&self, vfo: Vfo) -> Result<(Mode, Option<Passband>)> {
        let desc = self.desc();
        desc.check_vfo(vfo)?;
        let mut inner = self.session.lock().await;
        let (read, layout) = cmd::channel_source(inner.state.resolve(vfo))?;
        let block = read_block(&mut inner, read).await?;
        let (mode, narrow) = cmd::decode_mode(&block, layout)?;
        let width = if narrow {
            desc.narrow_filter(mode)
        } else {
            desc.default_filter(mode)
        };
        Ok((mode, width))
    }

    /// The only selectable widths are the mode's normal filter and, for CW
    /// and AM, its narrow one.
    async fn set_mode(&self, vfo: Vfo, mode: Mode, passband: Option<Passband>) -> Result<()> {
        let desc = self.desc();
        desc.check_vfo(vfo)?;
        desc.check_mode(self.session.region(), mode)?;
        let narrow = match passband {
            None => false,
            Some(w) if Some(w) == desc.narrow_filter(mode) => true,
            Some(w) if Some(w) == desc.default_filter(mode) => false,
            Some(w) => {
                return Err(Error::InvalidParameter(format!(
                    "FT-840 has no {w} filter for {mode}"
                )));
            }
        };
        let frame = cmd::set_mode(mode, narrow)?;

        let mut inner = self.session.lock().await;
        let target = inner.state.resolve(vfo);
        if matches!(target, Vfo::A | Vfo::B) {
            select_vfo(&mut inner, desc, target).await?;
        }
        send(&mut inner, "set_mode", frame).await
    }

    async fn get_vfo(&self) -> Result<Vfo> {
        let mut inner = self.session.lock().await;
        query_vfo(&mut inner, self.desc()).await
    }

    /// Selecting `Vfo::Memory` recalls the last memory channel seen.
    async fn set_vfo(&self, vfo: Vfo) -> Result<()> {
        let mut inner = self.session.lock().await;
        select_vfo(&mut inner, self.desc(), vfo).await
    }

    /// Keying a VFO other than the selected one switches to it first.
    async fn set_ptt(&self, vfo: Vfo, on: bool) -> Result<()> {
        let desc = self.desc();
        desc.check_vfo(vfo)?;
        let which = if on {
            NativeCommand::PttOn
        } else {
            NativeCommand::PttOff
        };
        let mut inner = self.session.lock().await;
        let target = inner.state.resolve(vfo);
        if target != inner.state.current_vfo() {
            select_vfo(&mut inner, desc, target).await?;
        }
        send(&mut inner, "set_ptt", cmd::frame(which)?).await
    }

    async fn get_split(&self, _vfo: Vfo) -> Result<bool> {
        let mut inner = self.session.lock().await;
        let block = read_block(&mut inner, NativeCommand::ReadFlags).await?;
        Ok(StatusFlags::from_block(&block)?.split())
    }

    /// Split moves TX to the other VFO; it does not choose which.
    async fn set_split(&self, _vfo: Vfo, on: bool) -> Result<()> {
        let which = if on {
            NativeCommand::SplitOn
        } else {
            NativeCommand::SplitOff
        };
        let mut inner = self.session.lock().await;
        send(&mut inner, "set_split", cmd::frame(which)?).await
    }

    async fn get_rit(&self, vfo: Vfo) -> Result<i32> {
        let desc = self.desc();
        desc.check_vfo(vfo)?;
        let mut inner = self.session.lock().await;
        let (read, layout) = cmd::channel_source(inner.state.resolve(vfo))?;
        let block = read_block(&mut inner, read).await?;
        cmd::decode_clarifier(&block, layout)
    }

    /// An offset of 0 switches the clarifier off and leaves its stored
    /// offset alone. Anything else switches it on, then sets the offset.
    async fn set_rit(&self, vfo: Vfo, offset_hz: i32) -> Result<()> {
        let desc = self.desc();
        desc.check_vfo(vfo)?;
        desc.check_rit(offset_hz)?;
        let offset = if offset_hz == 0 {
            None
        } else {
            Some(cmd::clarifier_offset(offset_hz)?)
        };

        let mut inner = self.session.lock().await;
        let target = inner.state.resolve(vfo);
        if target != inner.state.current_vfo() {
            select_vfo(&mut inner, desc, target).await?;
        }
        match offset {
            None => send(&mut inner, "set_rit", cmd::clarifier_switch(false)?).await,
            Some(frame) => {
                send(&mut inner, "set_rit", cmd::clarifier_switch(true)?).await?;
                send(&mut inner, "set_rit", frame).await
            }
        }
    }

    /// Only the receive S-meter is readable; in transmit the rig reports
    /// whichever meter the front panel selects.
    async fn get_level(&self, _vfo: Vfo, level: Level) -> Result<LevelValue> {
        let desc = self.desc();
        desc.check_level(level, false)?;
        let table = desc
            .calibration(level)
            .ok_or_else(|| Error::Unsupported(format!("level {level}")))?;
        let mut inner = self.session.lock().await;
        let block = read_block(&mut inner, NativeCommand::ReadMeter).await?;
        let raw = cmd::decode_meter(&block)?;
        Ok(LevelValue::Int(table.interpolate(i32::from(raw)).round() as i32))
    }

    async fn set_func(&self, _vfo: Vfo, func: Func, on: bool) -> Result<()> {
        self.desc().check_func(func, true)?;
        let which = match (func, on) {
            (Func::Tuner, true) => NativeCommand::TunerOn,
            (Func::Tuner, false) => NativeCommand::TunerOff,
            (other, _) => return Err(Error::Unsupported(format!("function {other:?}"))),
        };
        let mut inner = self.session.lock().await;
        send(&mut inner, "set_func", cmd::frame(which)?).await
    }

    async fn get_mem(&self, _vfo: Vfo) -> Result<u32> {
        let mut inner = self.session.lock().await;
        let block = read_block(&mut inner, NativeCommand::ReadMemoryChannel).await?;
        let channel = cmd::decode_memory_channel(&block)?;
        inner.state.current_memory_channel = Some(channel);
        Ok(channel)
    }

    /// Recall `channel`, leaving the rig in memory mode.
    async fn set_mem(&self, _vfo: Vfo, channel: u32) -> Result<()> {
        let desc = self.desc();
        desc.check_memory_channel(channel)?;
        let frame = cmd::recall_memory(memory_wire(channel)?)?;
        let mut inner = self.session.lock().await;
        send(&mut inner, "set_mem", frame).await?;
        inner.state.current_memory_channel = Some(channel);
        inner.state.set_current_vfo(desc, Vfo::Memory)
    }

    async fn vfo_op(&self, _vfo: Vfo, op: VfoOp) -> Result<()> {
        self.desc().check_vfo_op(op)?;
        let frame = match op {
            VfoOp::Tune => cmd::frame(NativeCommand::TunerStart)?,
            other => return Err(Error::Unsupported(format!("VFO operation {other:?}"))),
        };
        let mut inner = self.session.lock().await;
        send(&mut inner, "vfo_op", frame).await
    }

    async fn set_pacing(&self, pacing: u8) -> Result<()> {
        let mut inner = self.session.lock().await;
        send(&mut inner, "set_pacing", cmd::pacing(pacing)?).await?;
        inner.state.pacing = pacing;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catlink_core::framer::from_bcd;
    use catlink_test_harness::{MockProbe, MockTransport};
    use std::time::Duration;

    use crate::ft840_commands::{OP_DATA_LEN, VFO_DATA_LEN};
    use crate::models;

    const SELECT_A: [u8; 5] = [0x00, 0x00, 0x00, 0x00, 0x05];
    const SELECT_B: [u8; 5] = [0x00, 0x00, 0x00, 0x01, 0x05];
    const READ_FLAGS: [u8; 5] = [0x00, 0x00, 0x00, 0x00, 0xfa];
    const READ_VFO_DATA: [u8; 5] = [0x00, 0x00, 0x00, 0x03, 0x10];
    const READ_OP_DATA: [u8; 5] = [0x00, 0x00, 0x00, 0x02, 0x10];
    const READ_MEM_CHNL: [u8; 5] = [0x00, 0x00, 0x00, 0x01, 0x10];
    const READ_METER: [u8; 5] = [0x00, 0x00, 0x00, 0x00, 0xf7];

    fn make_rig(mock: MockTransport) -> Ft840 {
        let config = SessionConfig::default()
            .with_write_delay(Duration::ZERO)
            .with_post_write_delay(Duration::ZERO)
            .with_timeout(Duration::from_millis(20));
        Ft840::new(Arc::new(models::ft_840()), Box::new(mock), config)
    }

    fn scripted() -> (MockTransport, MockProbe) {
        let mock = MockTransport::new();
        let probe = mock.probe();
        (mock, probe)
    }

    fn vfo_data() -> Vec<u8> {
        let mut block = vec![0u8; VFO_DATA_LEN];
        // A: 14.074 MHz USB, B: 7.030 MHz CW narrow, clarifier -250 Hz
        block[0x01..0x04].copy_from_slice(&[0x15, 0x79, 0xa8]);
        block[0x07] = 0x01;
        block[0x0a..0x0d].copy_from_slice(&[0x0a, 0xba, 0x18]);
        block[0x0e..0x10].copy_from_slice(&(-25i16).to_be_bytes());
        block[0x10] = 0x02;
        block[0x11] = 0x80;
        block
    }

    #[tokio::test]
    async fn get_frequency_vfo_a_and_b() {
        let (mut mock, probe) = scripted();
        mock.expect(&READ_VFO_DATA, &vfo_data());
        mock.expect(&READ_VFO_DATA, &vfo_data());
        let rig = make_rig(mock);

        assert_eq!(rig.get_frequency(Vfo::A).await.unwrap(), 14_074_000);
        assert_eq!(rig.get_frequency(Vfo::B).await.unwrap(), 7_030_000);
        assert_eq!(probe.write_count(), 2);
        assert_eq!(rig.session().state().await.status_snapshot.len(), VFO_DATA_LEN);
    }

    #[tokio::test]
    async fn get_frequency_current_asks_the_rig() {
        let (mut mock, _probe) = scripted();
        mock.expect(&READ_FLAGS, &[0xc0, 0x00, 0x00, 0x00, 0x00]);
        mock.expect(&READ_VFO_DATA, &vfo_data());
        let rig = make_rig(mock);

        assert_eq!(rig.get_frequency(Vfo::Current).await.unwrap(), 7_030_000);
        assert_eq!(rig.session().current_vfo().await, Vfo::B);
    }

    #[tokio::test]
    async fn memory_frequency_comes_from_operating_data() {
        let (mut mock, _probe) = scripted();
        let mut block = vec![0u8; OP_DATA_LEN];
        block[0x01..0x04].copy_from_slice(&[0x03, 0x6e, 0xe8]);
        mock.expect(&READ_OP_DATA, &block);
        let rig = make_rig(mock);

        assert_eq!(rig.get_frequency(Vfo::Memory).await.unwrap(), 2_250_000);
    }

    #[tokio::test]
    async fn set_frequency_on_current_vfo() {
        let (mut mock, probe) = scripted();
        mock.expect(&[0x00, 0x74, 0x40, 0x01, 0x0a], &[]);
        let rig = make_rig(mock);

        rig.set_frequency(Vfo::A, 14_074_000).await.unwrap();
        let sent = probe.last_sent().unwrap();
        assert_eq!(from_bcd(&sent[..4], 8).unwrap(), 1_407_400);
        assert_eq!(probe.write_count(), 1);
    }

    #[tokio::test]
    async fn set_frequency_other_vfo_switches_first() {
        let (mut mock, probe) = scripted();
        mock.expect(&SELECT_B, &[]);
        mock.expect(&[0x00, 0x30, 0x70, 0x00, 0x0a], &[]);
        let rig = make_rig(mock);

        rig.set_frequency(Vfo::B, 7_030_000).await.unwrap();
        assert_eq!(probe.sent()[0], SELECT_B.to_vec());
        assert_eq!(rig.session().current_vfo().await, Vfo::B);
    }

    #[tokio::test]
    async fn failed_frequency_write_keeps_new_vfo() {
        let (mut mock, probe) = scripted();
        mock.expect(&SELECT_B, &[]);
        // The frequency frame meets an expectation for something else.
        mock.expect(&READ_FLAGS, &[]);
        let rig = make_rig(mock);

        let result = rig.set_frequency(Vfo::B, 7_030_000).await;
        assert!(matches!(result, Err(Error::Protocol(_))));
        assert_eq!(rig.session().current_vfo().await, Vfo::B);
        assert_eq!(probe.write_count(), 2);
    }

    #[tokio::test]
    async fn out_of_range_frequency_is_rejected_before_io() {
        let (mock, probe) = scripted();
        let rig = make_rig(mock);

        let result = rig.set_frequency(Vfo::B, 50_125_000).await;
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
        assert_eq!(probe.write_count(), 0);
        assert_eq!(rig.session().current_vfo().await, Vfo::A);
    }

    #[tokio::test]
    async fn get_mode_reports_narrow_width() {
        let (mut mock, _probe) = scripted();
        mock.expect(&READ_VFO_DATA, &vfo_data());
        mock.expect(&READ_VFO_DATA, &vfo_data());
        let rig = make_rig(mock);

        assert_eq!(
            rig.get_mode(Vfo::B).await.unwrap(),
            (Mode::CW, Some(Passband::from_hz(500)))
        );
        assert_eq!(
            rig.get_mode(Vfo::A).await.unwrap(),
            (Mode::USB, Some(Passband::from_hz(2200)))
        );
    }

    #[tokio::test]
    async fn set_mode_narrow_am() {
        let (mut mock, probe) = scripted();
        mock.expect(&SELECT_A, &[]);
        mock.expect(&[0x00, 0x00, 0x00, 0x05, 0x0c], &[]);
        let rig = make_rig(mock);

        rig.set_mode(Vfo::A, Mode::AM, Some(Passband::from_hz(2200)))
            .await
            .unwrap();
        assert_eq!(probe.write_count(), 2);
    }

    #[tokio::test]
    async fn set_mode_rejects_unknown_width_without_io() {
        let (mock, probe) = scripted();
        let rig = make_rig(mock);

        let result = rig
            .set_mode(Vfo::A, Mode::USB, Some(Passband::from_hz(1800)))
            .await;
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
        let result = rig.set_mode(Vfo::A, Mode::RTTY, None).await;
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
        assert_eq!(probe.write_count(), 0);
    }

    #[tokio::test]
    async fn get_vfo_in_memory_reads_channel() {
        let (mut mock, _probe) = scripted();
        mock.expect(&READ_FLAGS, &[0x10, 0x00, 0x00, 0x00, 0x00]);
        mock.expect(&READ_MEM_CHNL, &[0x04]);
        let rig = make_rig(mock);

        assert_eq!(rig.get_vfo().await.unwrap(), Vfo::Memory);
        let state = rig.session().state().await;
        assert_eq!(state.current_memory_channel, Some(5));
        assert_eq!(state.current_vfo(), Vfo::Memory);
    }

    #[tokio::test]
    async fn set_vfo_memory_recalls_last_channel() {
        let (mut mock, probe) = scripted();
        mock.expect(&READ_MEM_CHNL, &[0x0b]);
        mock.expect(&[0x00, 0x00, 0x00, 0x0c, 0x02], &[]);
        let rig = make_rig(mock);

        assert_eq!(rig.get_mem(Vfo::Current).await.unwrap(), 12);
        rig.set_vfo(Vfo::Memory).await.unwrap();
        assert_eq!(probe.write_count(), 2);
        assert_eq!(rig.session().current_vfo().await, Vfo::Memory);
    }

    #[tokio::test]
    async fn set_vfo_rejects_sub() {
        let (mock, probe) = scripted();
        let rig = make_rig(mock);
        assert!(matches!(
            rig.set_vfo(Vfo::Sub).await,
            Err(Error::InvalidParameter(_))
        ));
        assert_eq!(probe.write_count(), 0);
    }

    #[tokio::test]
    async fn rit_limits() {
        let (mut mock, probe) = scripted();
        mock.expect(&[0x00, 0x00, 0x00, 0x01, 0x09], &[]);
        mock.expect(&[0x99, 0x09, 0xff, 0xff, 0x09], &[]);
        let rig = make_rig(mock);

        assert!(matches!(
            rig.set_rit(Vfo::A, 10_000).await,
            Err(Error::InvalidParameter(_))
        ));
        assert_eq!(probe.write_count(), 0);

        rig.set_rit(Vfo::A, -9990).await.unwrap();
        let frame = probe.last_sent().unwrap();
        let magnitude = from_bcd(&frame[..2], 3).unwrap() as i32 * 10;
        let offset = if frame[2] == 0xff { -magnitude } else { magnitude };
        assert_eq!(offset, -9990);
    }

    #[tokio::test]
    async fn rit_zero_switches_clarifier_off() {
        let (mut mock, probe) = scripted();
        mock.expect(&[0x00, 0x00, 0x00, 0x00, 0x09], &[]);
        let rig = make_rig(mock);

        rig.set_rit(Vfo::Current, 0).await.unwrap();
        assert_eq!(probe.write_count(), 1);
    }

    #[tokio::test]
    async fn get_rit_vfo_b() {
        let (mut mock, _probe) = scripted();
        mock.expect(&READ_VFO_DATA, &vfo_data());
        let rig = make_rig(mock);
        assert_eq!(rig.get_rit(Vfo::B).await.unwrap(), -250);
    }

    #[tokio::test]
    async fn split_and_ptt() {
        let (mut mock, probe) = scripted();
        mock.expect(&READ_FLAGS, &[0x81, 0x00, 0x00, 0x00, 0x00]);
        mock.expect(&[0x00, 0x00, 0x00, 0x00, 0x01], &[]);
        mock.expect(&[0x00, 0x00, 0x00, 0x01, 0x0f], &[]);
        let rig = make_rig(mock);

        assert!(rig.get_split(Vfo::Current).await.unwrap());
        rig.set_split(Vfo::Current, false).await.unwrap();
        rig.set_ptt(Vfo::Current, true).await.unwrap();
        assert_eq!(probe.remaining_expectations(), 0);
    }

    #[tokio::test]
    async fn ptt_on_other_vfo_switches_first() {
        let (mut mock, probe) = scripted();
        mock.expect(&SELECT_B, &[]);
        mock.expect(&[0x00, 0x00, 0x00, 0x01, 0x0f], &[]);
        let rig = make_rig(mock);

        rig.set_ptt(Vfo::B, true).await.unwrap();
        assert_eq!(
            probe.sent(),
            vec![SELECT_B.to_vec(), vec![0x00, 0x00, 0x00, 0x01, 0x0f]]
        );
        assert_eq!(rig.session().current_vfo().await, Vfo::B);
    }

    #[tokio::test]
    async fn ptt_on_undeclared_vfo_does_no_io() {
        let (mock, probe) = scripted();
        let rig = make_rig(mock);

        let result = rig.set_ptt(Vfo::Main, true).await;
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
        assert_eq!(probe.write_count(), 0);
    }

    #[tokio::test]
    async fn s_meter_is_calibrated() {
        let (mut mock, _probe) = scripted();
        mock.expect(&READ_METER, &[72, 0, 0, 0, 0]);
        mock.expect(&READ_METER, &[200, 0, 0, 0, 0]);
        let rig = make_rig(mock);

        let s9 = rig.get_level(Vfo::Current, Level::Strength).await.unwrap();
        assert_eq!(s9, LevelValue::Int(0));
        let pinned = rig.get_level(Vfo::Current, Level::Strength).await.unwrap();
        assert_eq!(pinned, LevelValue::Int(60));
    }

    #[tokio::test]
    async fn unsupported_level_does_no_io() {
        let (mock, probe) = scripted();
        let rig = make_rig(mock);
        assert!(matches!(
            rig.get_level(Vfo::Current, Level::Swr).await,
            Err(Error::Unsupported(_))
        ));
        assert_eq!(probe.write_count(), 0);
    }

    #[tokio::test]
    async fn tuner_and_tune() {
        let (mut mock, probe) = scripted();
        mock.expect(&[0x00, 0x00, 0x00, 0x01, 0x81], &[]);
        mock.expect(&[0x00, 0x00, 0x00, 0x00, 0x82], &[]);
        let rig = make_rig(mock);

        rig.set_func(Vfo::Current, Func::Tuner, true).await.unwrap();
        rig.vfo_op(Vfo::Current, VfoOp::Tune).await.unwrap();
        assert!(matches!(
            rig.vfo_op(Vfo::Current, VfoOp::Exchange).await,
            Err(Error::Unsupported(_))
        ));
        assert_eq!(probe.write_count(), 2);
    }

    #[tokio::test]
    async fn status_read_times_out_after_one_attempt() {
        let (mut mock, probe) = scripted();
        mock.expect_silence(&READ_FLAGS);
        let rig = make_rig(mock);

        assert!(matches!(rig.get_split(Vfo::Current).await, Err(Error::Timeout)));
        assert_eq!(probe.write_count(), 1);
    }

    #[tokio::test]
    async fn open_sends_pacing() {
        let (mut mock, _probe) = scripted();
        mock.expect(&[0x00, 0x00, 0x00, 0x00, 0x0e], &[]);
        mock.expect(&[0x00, 0x00, 0x00, 0x03, 0x0e], &[]);
        let rig = make_rig(mock);

        rig.open().await.unwrap();
        rig.set_pacing(3).await.unwrap();
        assert_eq!(rig.session().state().await.pacing, 3);
    }

    #[tokio::test]
    async fn clock_is_unsupported() {
        let (mock, _probe) = scripted();
        let rig = make_rig(mock);
        assert!(matches!(rig.get_clock().await, Err(Error::Unsupported(_))));
    }
}
