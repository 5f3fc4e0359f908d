//! FT-840 fixed-frame command table and status block decoding.
//!
//! The FT-840 speaks the classic Yaesu CAT protocol: every command is five
//! bytes, `[P4, P3, P2, P1, opcode]`, and nothing is acknowledged. Reads
//! are commands that make the rig answer with a fixed-length status block.
//!
//! The table below is the complete native command set. Complete entries are
//! sent verbatim; incomplete ones get parameters or a BCD payload written
//! into a copy via [`FixedFrame::YAESU_5`].
//!
//! All functions here are pure. They build frames and decode blocks; the
//! rig in [`crate::ft840`] does the I/O.

use catlink_core::command::{CommandTemplate, FixedFrame};
use catlink_core::error::{Error, Result};
use catlink_core::framer::to_bcd;
use catlink_core::types::{Mode, Vfo};

/// One entry of the FT-840 native command table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeCommand {
    SplitOff,
    SplitOn,
    /// P1 = memory channel.
    RecallMemory,
    /// P1 = memory channel.
    MemoryOps,
    SelectVfoA,
    SelectVfoB,
    /// P1 = memory channel.
    MemoryToVfoA,
    /// P1 = clarifier operation, P2 = offset sign; BCD offset in bytes 0..2.
    Clarifier,
    /// 8-digit BCD frequency in 10 Hz units in bytes 0..4.
    SetFrequency,
    /// P1 = mode code.
    SetMode,
    /// P1 = pacing value.
    Pacing,
    PttOff,
    PttOn,
    ReadMemoryChannel,
    ReadOperatingData,
    ReadVfoData,
    /// P4 = memory channel.
    ReadMemoryData,
    TunerOff,
    TunerOn,
    TunerStart,
    ReadMeter,
    ReadFlags,
}

impl NativeCommand {
    pub const ALL: &'static [NativeCommand] = &[
        NativeCommand::SplitOff,
        NativeCommand::SplitOn,
        NativeCommand::RecallMemory,
        NativeCommand::MemoryOps,
        NativeCommand::SelectVfoA,
        NativeCommand::SelectVfoB,
        NativeCommand::MemoryToVfoA,
        NativeCommand::Clarifier,
        NativeCommand::SetFrequency,
        NativeCommand::SetMode,
        NativeCommand::Pacing,
        NativeCommand::PttOff,
        NativeCommand::PttOn,
        NativeCommand::ReadMemoryChannel,
        NativeCommand::ReadOperatingData,
        NativeCommand::ReadVfoData,
        NativeCommand::ReadMemoryData,
        NativeCommand::TunerOff,
        NativeCommand::TunerOn,
        NativeCommand::TunerStart,
        NativeCommand::ReadMeter,
        NativeCommand::ReadFlags,
    ];

    /// The static template for this command.
    pub const fn template(self) -> CommandTemplate {
        use CommandTemplate as T;
        match self {
            NativeCommand::SplitOff => T::complete(&[0x00, 0x00, 0x00, 0x00, 0x01]),
            NativeCommand::SplitOn => T::complete(&[0x00, 0x00, 0x00, 0x01, 0x01]),
            NativeCommand::RecallMemory => T::incomplete(&[0x00, 0x00, 0x00, 0x00, 0x02]),
            NativeCommand::MemoryOps => T::incomplete(&[0x00, 0x00, 0x00, 0x00, 0x03]),
            NativeCommand::SelectVfoA => T::complete(&[0x00, 0x00, 0x00, 0x00, 0x05]),
            NativeCommand::SelectVfoB => T::complete(&[0x00, 0x00, 0x00, 0x01, 0x05]),
            NativeCommand::MemoryToVfoA => T::incomplete(&[0x00, 0x00, 0x00, 0x00, 0x06]),
            NativeCommand::Clarifier => T::incomplete(&[0x00, 0x00, 0x00, 0x00, 0x09]),
            NativeCommand::SetFrequency => T::incomplete(&[0x00, 0x00, 0x00, 0x00, 0x0a]),
            NativeCommand::SetMode => T::incomplete(&[0x00, 0x00, 0x00, 0x00, 0x0c]),
            NativeCommand::Pacing => T::incomplete(&[0x00, 0x00, 0x00, 0x00, 0x0e]),
            NativeCommand::PttOff => T::complete(&[0x00, 0x00, 0x00, 0x00, 0x0f]),
            NativeCommand::PttOn => T::complete(&[0x00, 0x00, 0x00, 0x01, 0x0f]),
            NativeCommand::ReadMemoryChannel => T::complete(&[0x00, 0x00, 0x00, 0x01, 0x10]),
            NativeCommand::ReadOperatingData => T::complete(&[0x00, 0x00, 0x00, 0x02, 0x10]),
            NativeCommand::ReadVfoData => T::complete(&[0x00, 0x00, 0x00, 0x03, 0x10]),
            NativeCommand::ReadMemoryData => T::incomplete(&[0x00, 0x00, 0x00, 0x04, 0x10]),
            NativeCommand::TunerOff => T::complete(&[0x00, 0x00, 0x00, 0x00, 0x81]),
            NativeCommand::TunerOn => T::complete(&[0x00, 0x00, 0x00, 0x01, 0x81]),
            NativeCommand::TunerStart => T::complete(&[0x00, 0x00, 0x00, 0x00, 0x82]),
            NativeCommand::ReadMeter => T::complete(&[0x00, 0x00, 0x00, 0x00, 0xf7]),
            NativeCommand::ReadFlags => T::complete(&[0x00, 0x00, 0x00, 0x00, 0xfa]),
        }
    }

    /// Length of the status block the rig sends back, or 0 for commands
    /// that produce no reply.
    pub const fn reply_len(self) -> usize {
        match self {
            NativeCommand::ReadMemoryChannel => MEM_CHANNEL_LEN,
            NativeCommand::ReadOperatingData | NativeCommand::ReadMemoryData => OP_DATA_LEN,
            NativeCommand::ReadVfoData => VFO_DATA_LEN,
            NativeCommand::ReadMeter | NativeCommand::ReadFlags => STATUS_FLAGS_LEN,
            _ => 0,
        }
    }
}

// ---------------------------------------------------------------
// Status block layout
// ---------------------------------------------------------------

pub const MEM_CHANNEL_LEN: usize = 1;
pub const STATUS_FLAGS_LEN: usize = 5;
pub const VFO_DATA_LEN: usize = 18;
pub const OP_DATA_LEN: usize = 19;

/// Offsets of one channel record inside a status block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelLayout {
    pub freq: usize,
    pub clarifier: usize,
    pub mode: usize,
    pub flag: usize,
}

/// The displayed channel in the operating data block; VFO A in the VFO
/// data block uses the same offsets.
pub const DISPLAYED: ChannelLayout = ChannelLayout {
    freq: 0x01,
    clarifier: 0x05,
    mode: 0x07,
    flag: 0x08,
};

pub const VFO_B: ChannelLayout = ChannelLayout {
    freq: 0x0a,
    clarifier: 0x0e,
    mode: 0x10,
    flag: 0x11,
};

/// Which status read answers a question about `vfo`, and where the
/// channel record sits in it.
pub fn channel_source(vfo: Vfo) -> Result<(NativeCommand, ChannelLayout)> {
    match vfo {
        Vfo::A => Ok((NativeCommand::ReadVfoData, DISPLAYED)),
        Vfo::B => Ok((NativeCommand::ReadVfoData, VFO_B)),
        Vfo::Memory | Vfo::Main => Ok((NativeCommand::ReadOperatingData, DISPLAYED)),
        other => Err(Error::InvalidParameter(format!("FT-840 has no {other}"))),
    }
}

// status_0 bits
const SF_SPLIT: u8 = 0x01;
const SF_MR: u8 = 0x10;
const SF_MT: u8 = 0x20;
const SF_MEM_MASK: u8 = SF_MR | SF_MT;
const SF_VFO_MASK: u8 = 0xc0;
const SF_VFOA: u8 = 0x80;
const SF_VFOB: u8 = 0xc0;

// mode byte and flag byte
const MODE_MASK: u8 = 0x07;
const MODE_LSB: u8 = 0x00;
const MODE_USB: u8 = 0x01;
const MODE_CW: u8 = 0x02;
const MODE_AM: u8 = 0x03;
const MODE_FM: u8 = 0x04;
const FLAG_CW_N: u8 = 0x80;
const FLAG_AM_N: u8 = 0x40;

// set-mode parameter
const MODE_SET_LSB: u8 = 0x00;
const MODE_SET_USB: u8 = 0x01;
const MODE_SET_CW_W: u8 = 0x02;
const MODE_SET_CW_N: u8 = 0x03;
const MODE_SET_AM_W: u8 = 0x04;
const MODE_SET_AM_N: u8 = 0x05;
const MODE_SET_FM: u8 = 0x06;

// clarifier
const CLAR_RX_OFF: u8 = 0x00;
const CLAR_RX_ON: u8 = 0x01;
const CLAR_SET_FREQ: u8 = 0xff;
const CLAR_OFFSET_PLUS: u8 = 0x00;
const CLAR_OFFSET_MINUS: u8 = 0xff;

/// Largest clarifier offset the rig accepts, in hertz.
pub const MAX_CLARIFIER_HZ: i32 = 9990;

const BCD_DIAL_DIGITS: usize = 8;
const BCD_RIT_DIGITS: usize = 3;

// ---------------------------------------------------------------
// Frame builders
// ---------------------------------------------------------------

/// A complete command, sent as is.
pub fn frame(cmd: NativeCommand) -> Result<Vec<u8>> {
    FixedFrame::YAESU_5.frame(&cmd.template())
}

/// An incomplete command with parameters P1, P2, ...
pub fn frame_with(cmd: NativeCommand, params: &[u8]) -> Result<Vec<u8>> {
    FixedFrame::YAESU_5.build(&cmd.template(), params)
}

/// Set the displayed frequency. The rig tunes in 10 Hz steps.
///
/// ```
/// use catlink_yaesu::ft840_commands::set_frequency;
///
/// assert_eq!(
///     set_frequency(14_074_000).unwrap(),
///     vec![0x00, 0x74, 0x40, 0x01, 0x0a]
/// );
/// ```
pub fn set_frequency(freq_hz: u64) -> Result<Vec<u8>> {
    let bcd = to_bcd(freq_hz / 10, BCD_DIAL_DIGITS)?;
    FixedFrame::YAESU_5.build_bcd(&NativeCommand::SetFrequency.template(), &bcd, &[])
}

/// Turn the RX clarifier on or off without touching its offset.
pub fn clarifier_switch(on: bool) -> Result<Vec<u8>> {
    let op = if on { CLAR_RX_ON } else { CLAR_RX_OFF };
    frame_with(NativeCommand::Clarifier, &[op])
}

/// Set the clarifier offset. The magnitude goes in as 3 BCD digits of
/// 10 Hz; P2 carries the sign.
pub fn clarifier_offset(offset_hz: i32) -> Result<Vec<u8>> {
    if !(-MAX_CLARIFIER_HZ..=MAX_CLARIFIER_HZ).contains(&offset_hz) {
        return Err(Error::InvalidParameter(format!(
            "clarifier offset {offset_hz} Hz outside ±{MAX_CLARIFIER_HZ} Hz"
        )));
    }
    let sign = if offset_hz < 0 {
        CLAR_OFFSET_MINUS
    } else {
        CLAR_OFFSET_PLUS
    };
    let bcd = to_bcd(u64::from(offset_hz.unsigned_abs()) / 10, BCD_RIT_DIGITS)?;
    FixedFrame::YAESU_5.build_bcd(
        &NativeCommand::Clarifier.template(),
        &bcd,
        &[CLAR_SET_FREQ, sign],
    )
}

/// Mode parameter for `mode`, narrow filter or not.
///
/// Only CW and AM have a narrow variant.
pub fn mode_code(mode: Mode, narrow: bool) -> Result<u8> {
    let code = match (mode, narrow) {
        (Mode::LSB, false) => MODE_SET_LSB,
        (Mode::USB, false) => MODE_SET_USB,
        (Mode::CW, false) => MODE_SET_CW_W,
        (Mode::CW, true) => MODE_SET_CW_N,
        (Mode::AM, false) => MODE_SET_AM_W,
        (Mode::AM, true) => MODE_SET_AM_N,
        (Mode::FM, false) => MODE_SET_FM,
        (m, true) => {
            return Err(Error::InvalidParameter(format!(
                "FT-840 has no narrow filter for {m}"
            )));
        }
        (m, false) => return Err(Error::InvalidParameter(format!("FT-840 has no {m} mode"))),
    };
    Ok(code)
}

pub fn set_mode(mode: Mode, narrow: bool) -> Result<Vec<u8>> {
    frame_with(NativeCommand::SetMode, &[mode_code(mode, narrow)?])
}

/// Recall a memory channel.
pub fn recall_memory(channel: u8) -> Result<Vec<u8>> {
    frame_with(NativeCommand::RecallMemory, &[channel])
}

pub fn pacing(value: u8) -> Result<Vec<u8>> {
    frame_with(NativeCommand::Pacing, &[value])
}

// ---------------------------------------------------------------
// Block decoders
// ---------------------------------------------------------------

fn field<'a>(block: &'a [u8], offset: usize, len: usize) -> Result<&'a [u8]> {
    block.get(offset..offset + len).ok_or_else(|| {
        Error::Protocol(format!(
            "status block of {} bytes has no field at {offset:#04x}",
            block.len()
        ))
    })
}

/// Frequency in hertz: a 3-byte big-endian count of 10 Hz.
pub fn decode_frequency(block: &[u8], layout: ChannelLayout) -> Result<u64> {
    let p = field(block, layout.freq, 3)?;
    let raw = u64::from(p[0]) << 16 | u64::from(p[1]) << 8 | u64::from(p[2]);
    Ok(raw * 10)
}

/// Clarifier offset in hertz: a 16-bit two's complement count of 10 Hz.
pub fn decode_clarifier(block: &[u8], layout: ChannelLayout) -> Result<i32> {
    let p = field(block, layout.clarifier, 2)?;
    let raw = i16::from_be_bytes([p[0], p[1]]);
    Ok(i32::from(raw) * 10)
}

/// Mode and whether the narrow filter is selected.
pub fn decode_mode(block: &[u8], layout: ChannelLayout) -> Result<(Mode, bool)> {
    let code = field(block, layout.mode, 1)?[0] & MODE_MASK;
    let flag = field(block, layout.flag, 1)?[0];
    match code {
        MODE_LSB => Ok((Mode::LSB, false)),
        MODE_USB => Ok((Mode::USB, false)),
        MODE_CW => Ok((Mode::CW, flag & FLAG_CW_N != 0)),
        MODE_AM => Ok((Mode::AM, flag & FLAG_AM_N != 0)),
        MODE_FM => Ok((Mode::FM, false)),
        other => Err(Error::Protocol(format!("unknown FT-840 mode code {other:#04x}"))),
    }
}

/// Decoded first byte of the status flags block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusFlags(pub u8);

impl StatusFlags {
    pub fn from_block(block: &[u8]) -> Result<Self> {
        Ok(StatusFlags(field(block, 0, 1)?[0]))
    }

    pub fn split(self) -> bool {
        self.0 & SF_SPLIT != 0
    }

    /// The VFO shown on the display. Memory recall and memory tune both
    /// count as [`Vfo::Memory`].
    pub fn active_vfo(self) -> Result<Vfo> {
        match self.0 & SF_VFO_MASK {
            SF_VFOA => return Ok(Vfo::A),
            SF_VFOB => return Ok(Vfo::B),
            _ => {}
        }
        if self.0 & SF_MEM_MASK != 0 {
            Ok(Vfo::Memory)
        } else {
            Err(Error::Protocol(format!(
                "status flags {:#04x} name no VFO or memory mode",
                self.0
            )))
        }
    }
}

/// The memory channel block holds the channel as a 0-based index.
pub fn decode_memory_channel(block: &[u8]) -> Result<u32> {
    Ok(u32::from(field(block, 0, 1)?[0]) + 1)
}

/// Raw meter reading, 0 to 255.
pub fn decode_meter(block: &[u8]) -> Result<u8> {
    Ok(field(block, 0, 1)?[0])
}
