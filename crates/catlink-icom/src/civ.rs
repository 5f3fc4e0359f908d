//! CI-V frame encoder/decoder.
//!
//! Icom rigs share a half-duplex bus on which every byte a device sends is
//! echoed back to every listener, including the sender. A controller
//! therefore reads its own command before the rig's answer; requests built
//! here ask the engine to skip that echo.
//!
//! # Frame format
//!
//! ```text
//! 0xFE 0xFE <to> <from> <cmd> [<sub>] [<data>...] 0xFD
//! ```
//!
//! Set commands are answered with an ACK (`0xFB`) or NAK (`0xFA`) frame;
//! reads are answered with the command byte, sub-command and data.

use bytes::{BufMut, BytesMut};

use catlink_core::engine::{Reply, TransactionRequest};
use catlink_core::error::{Error, Result};
use catlink_core::framer::{from_bcd, from_bcd_be, to_bcd, to_bcd_be};

/// Preamble byte repeated twice at the start of every CI-V frame.
pub const PREAMBLE: u8 = 0xFE;

pub const TERMINATOR: u8 = 0xFD;

/// Standard PC controller address.
pub const CONTROLLER_ADDR: u8 = 0xE0;

pub const ACK: u8 = 0xFB;

pub const NAK: u8 = 0xFA;

/// Written over a frame when two devices talk at once.
pub const COLLISION: u8 = 0xFC;

/// Longest frame any supported command produces.
const MAX_FRAME: usize = 64;

/// A decoded CI-V frame. `payload` holds everything after the command
/// byte, sub-command included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CivFrame {
    pub to: u8,
    pub from: u8,
    pub cmd: u8,
    pub payload: Vec<u8>,
}

impl CivFrame {
    pub fn is_ack(&self) -> bool {
        self.cmd == ACK && self.payload.is_empty()
    }

    pub fn is_nak(&self) -> bool {
        self.cmd == NAK && self.payload.is_empty()
    }
}

/// Encode a frame ready for the wire.
///
/// ```
/// use catlink_icom::civ::{encode_frame, CONTROLLER_ADDR};
///
/// let bytes = encode_frame(0x6a, CONTROLLER_ADDR, 0x03, None, &[]);
/// assert_eq!(bytes, vec![0xFE, 0xFE, 0x6A, 0xE0, 0x03, 0xFD]);
/// ```
pub fn encode_frame(to: u8, from: u8, cmd: u8, sub: Option<u8>, data: &[u8]) -> Vec<u8> {
    let mut buf = BytesMut::with_capacity(6 + usize::from(sub.is_some()) + data.len());
    buf.put_u8(PREAMBLE);
    buf.put_u8(PREAMBLE);
    buf.put_u8(to);
    buf.put_u8(from);
    buf.put_u8(cmd);
    if let Some(sub) = sub {
        buf.put_u8(sub);
    }
    buf.put_slice(data);
    buf.put_u8(TERMINATOR);
    buf.to_vec()
}

/// Decode one complete frame. Noise before the preamble is skipped.
pub fn decode_frame(buf: &[u8]) -> Result<CivFrame> {
    let start = buf
        .windows(2)
        .position(|w| w == [PREAMBLE, PREAMBLE])
        .ok_or_else(|| Error::Protocol("CI-V reply has no preamble".into()))?;
    let rest = &buf[start + 2..];
    // A longer run of 0xFE is still one preamble.
    let rest = &rest[rest.iter().take_while(|&&b| b == PREAMBLE).count()..];
    let Some((&TERMINATOR, body)) = rest.split_last() else {
        return Err(Error::Protocol("CI-V reply is not terminated".into()));
    };
    if body.contains(&COLLISION) {
        return Err(Error::Protocol("CI-V bus collision".into()));
    }
    match body {
        [to, from, cmd, payload @ ..] => Ok(CivFrame {
            to: *to,
            from: *from,
            cmd: *cmd,
            payload: payload.to_vec(),
        }),
        _ => Err(Error::Protocol(format!(
            "CI-V frame too short: {} body bytes",
            body.len()
        ))),
    }
}

/// The two ends of a CI-V conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Civ {
    pub rig: u8,
    pub controller: u8,
}

impl Civ {
    pub fn new(rig: u8) -> Self {
        Civ {
            rig,
            controller: CONTROLLER_ADDR,
        }
    }

    pub fn frame(&self, cmd: u8, sub: Option<u8>, data: &[u8]) -> Vec<u8> {
        encode_frame(self.rig, self.controller, cmd, sub, data)
    }

    /// A request whose answer is the next frame after the echo.
    pub fn request(
        &self,
        operation: &'static str,
        cmd: u8,
        sub: Option<u8>,
        data: &[u8],
    ) -> TransactionRequest {
        TransactionRequest::query(
            operation,
            self.frame(cmd, sub, data),
            Reply::Terminated {
                terminator: TERMINATOR,
                max_len: MAX_FRAME,
            },
        )
        .skip_echo()
    }

    /// Decode a frame and check it came from the rig to us.
    pub fn decode(&self, reply: &[u8]) -> Result<CivFrame> {
        let frame = decode_frame(reply)?;
        if frame.from != self.rig || frame.to != self.controller {
            return Err(Error::Protocol(format!(
                "CI-V frame from {:02X} to {:02X}, expected {:02X} to {:02X}",
                frame.from, frame.to, self.rig, self.controller
            )));
        }
        Ok(frame)
    }

    /// Accept an ACK; a NAK means the rig refused the command.
    pub fn expect_ack(&self, reply: &[u8]) -> Result<()> {
        let frame = self.decode(reply)?;
        if frame.is_ack() {
            Ok(())
        } else if frame.is_nak() {
            Err(Error::Protocol("rig answered NAK".into()))
        } else {
            Err(Error::Protocol(format!(
                "expected ACK, got command {:02X}",
                frame.cmd
            )))
        }
    }

    /// Data of a reply to `cmd`/`sub`, with both stripped.
    pub fn expect_data(&self, reply: &[u8], cmd: u8, sub: &[u8]) -> Result<Vec<u8>> {
        let frame = self.decode(reply)?;
        if frame.is_nak() {
            return Err(Error::Protocol(format!("rig answered NAK to {cmd:02X}")));
        }
        if frame.cmd != cmd || !frame.payload.starts_with(sub) {
            return Err(Error::Protocol(format!(
                "reply to {cmd:02X} {sub:02X?} carries {:02X} {:02X?}",
                frame.cmd, frame.payload
            )));
        }
        Ok(frame.payload[sub.len()..].to_vec())
    }
}

// ---------------------------------------------------------------
// Field encodings
// ---------------------------------------------------------------

/// Frequency as 5-byte BCD, least significant byte first.
///
/// ```
/// use catlink_icom::civ::freq_to_bcd;
///
/// assert_eq!(freq_to_bcd(14_250_000).unwrap(), vec![0x00, 0x00, 0x25, 0x14, 0x00]);
/// ```
pub fn freq_to_bcd(freq_hz: u64) -> Result<Vec<u8>> {
    to_bcd(freq_hz, 10)
}

pub fn bcd_to_freq(bcd: &[u8]) -> Result<u64> {
    if bcd.len() != 5 {
        return Err(Error::Protocol(format!(
            "frequency needs 5 BCD bytes, got {}",
            bcd.len()
        )));
    }
    from_bcd(bcd, 10)
}

/// A 0-255 level or meter value as 2-byte BCD, `0x01 0x28` for 128.
pub fn level_to_bcd(value: u16) -> Result<Vec<u8>> {
    to_bcd_be(u64::from(value), 4)
}

pub fn bcd_to_level(bcd: &[u8]) -> Result<u16> {
    if bcd.len() != 2 {
        return Err(Error::Protocol(format!(
            "level needs 2 BCD bytes, got {}",
            bcd.len()
        )));
    }
    Ok(from_bcd_be(bcd, 4)? as u16)
}

/// A two-digit BCD byte.
pub fn byte_to_bcd(value: u8) -> Result<u8> {
    Ok(to_bcd_be(u64::from(value), 2)?[0])
}

pub fn bcd_to_byte(bcd: u8) -> Result<u8> {
    Ok(from_bcd_be(&[bcd], 2)? as u8)
}
