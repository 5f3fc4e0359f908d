//! Newcat command builders and reply parsers for the FT-DX101D.
//!
//! Builders return ready-to-run [`TransactionRequest`]s; parsers take the
//! body of a reply after [`crate::protocol::parse`] has stripped the mnemonic.
//! Nothing here performs I/O.
//!
//! Frequencies are 9 zero-padded decimal digits in hertz. Modes are single
//! hex-digit codes. Attenuator and preamp settings travel as selector
//! indices into the model's dB lists.

use catlink_core::command::{Field, parse_decimal};
use catlink_core::engine::TransactionRequest;
use catlink_core::error::{Error, Result};
use catlink_core::types::{Mode, Vfo};

use crate::protocol::{command, query};

// ---------------------------------------------------------------
// Mode codes
// ---------------------------------------------------------------

const MODE_LSB: &str = "1";
const MODE_USB: &str = "2";
const MODE_CW: &str = "3";
const MODE_FM: &str = "4";
const MODE_AM: &str = "5";
/// RTTY on the lower sideband (FSK).
const MODE_RTTY_LSB: &str = "6";
const MODE_CWR: &str = "7";
const MODE_DATA_LSB: &str = "8";
const MODE_RTTY_USB: &str = "9";
const MODE_DATA_FM: &str = "A";
// "B" is FM-N; it reads back as FM and is never sent.
const MODE_DATA_USB: &str = "C";
/// AM-N, used for data over AM.
const MODE_AM_N: &str = "D";

fn mode_code(mode: Mode) -> &'static str {
    match mode {
        Mode::LSB => MODE_LSB,
        Mode::USB => MODE_USB,
        Mode::CW => MODE_CW,
        Mode::CWR => MODE_CWR,
        Mode::AM => MODE_AM,
        Mode::FM => MODE_FM,
        Mode::RTTY => MODE_RTTY_LSB,
        Mode::RTTYR => MODE_RTTY_USB,
        Mode::DataUSB => MODE_DATA_USB,
        Mode::DataLSB => MODE_DATA_LSB,
        Mode::DataFM => MODE_DATA_FM,
        Mode::DataAM => MODE_AM_N,
    }
}

// ---------------------------------------------------------------
// Mnemonics per VFO
// ---------------------------------------------------------------

/// `FA` for VFO A (main), `FB` for VFO B (sub).
pub fn frequency_mnemonic(vfo: Vfo) -> Result<&'static str> {
    match vfo {
        Vfo::A | Vfo::Main => Ok("FA"),
        Vfo::B | Vfo::Sub => Ok("FB"),
        other => Err(Error::InvalidParameter(format!(
            "no frequency command for {other}"
        ))),
    }
}

/// `MD0` for the main receiver, `MD1` for the sub.
pub fn mode_mnemonic(vfo: Vfo) -> Result<&'static str> {
    match vfo {
        Vfo::A | Vfo::Main => Ok("MD0"),
        Vfo::B | Vfo::Sub => Ok("MD1"),
        other => Err(Error::InvalidParameter(format!("no mode command for {other}"))),
    }
}

// ---------------------------------------------------------------
// Builders
// ---------------------------------------------------------------

pub fn read_frequency(vfo: Vfo) -> Result<TransactionRequest> {
    Ok(query("get_freq", frequency_mnemonic(vfo)?).for_vfo(vfo))
}

/// `FA014074000;`. Frequencies above 999,999,999 Hz do not fit.
pub fn set_frequency(vfo: Vfo, freq_hz: u64) -> Result<TransactionRequest> {
    let req = command("set_freq", frequency_mnemonic(vfo)?, &[Field::num(freq_hz, 9)])?;
    Ok(req.for_vfo(vfo))
}

pub fn read_mode(vfo: Vfo) -> Result<TransactionRequest> {
    Ok(query("get_mode", mode_mnemonic(vfo)?).for_vfo(vfo))
}

pub fn set_mode(vfo: Vfo, mode: Mode) -> Result<TransactionRequest> {
    let req = command("set_mode", mode_mnemonic(vfo)?, &[Field::Text(mode_code(mode))])?;
    Ok(req.for_vfo(vfo))
}

/// `VS;`: which VFO is selected.
pub fn read_vfo() -> TransactionRequest {
    query("get_vfo", "VS")
}

pub fn set_vfo(vfo: Vfo) -> Result<TransactionRequest> {
    let digit = match vfo {
        Vfo::A | Vfo::Main => "0",
        Vfo::B | Vfo::Sub => "1",
        other => return Err(Error::InvalidParameter(format!("cannot select {other}"))),
    };
    command("set_vfo", "VS", &[Field::Text(digit)])
}

pub fn read_ptt() -> TransactionRequest {
    query("get_ptt", "TX")
}

/// `TX1;` keys the transmitter, `TX0;` returns to receive.
pub fn set_ptt(on: bool) -> Result<TransactionRequest> {
    command("set_ptt", "TX", &[Field::Text(if on { "1" } else { "0" })])
}

pub fn read_split() -> TransactionRequest {
    query("get_split", "FT")
}

/// `FT3;` transmits on the sub VFO (split), `FT2;` on the main.
pub fn set_split(on: bool) -> Result<TransactionRequest> {
    command("set_split", "FT", &[Field::Text(if on { "3" } else { "2" })])
}

pub fn read_attenuator() -> TransactionRequest {
    query("get_level", "RA0")
}

/// `RA0{index};` with the selector index, 0 for off.
pub fn set_attenuator(index: u8) -> Result<TransactionRequest> {
    command("set_level", "RA0", &[Field::num(u64::from(index), 1)])
}

pub fn read_preamp() -> TransactionRequest {
    query("get_level", "PA0")
}

/// `PA0{index};`: 0 is IPO, 1 and 2 the two preamps.
pub fn set_preamp(index: u8) -> Result<TransactionRequest> {
    command("set_level", "PA0", &[Field::num(u64::from(index), 1)])
}

/// `SM0;`: main receiver S-meter, 0 to 255.
pub fn read_meter() -> TransactionRequest {
    query("get_level", "SM0")
}

pub fn read_auto_info() -> TransactionRequest {
    query("get_ai", "AI")
}

/// `AI{value};`. 0 stops unsolicited status messages.
pub fn set_auto_info(value: u8) -> Result<TransactionRequest> {
    command("set_ai", "AI", &[Field::num(u64::from(value), 1)])
}

// ---------------------------------------------------------------
// Parsers
// ---------------------------------------------------------------

/// Body of an `FA`/`FB` reply: exactly 9 digits.
pub fn parse_frequency(data: &str) -> Result<u64> {
    if data.len() != 9 {
        return Err(Error::Protocol(format!(
            "expected 9 digits for frequency, got {} characters: {data:?}",
            data.len()
        )));
    }
    parse_decimal(data)
}

/// Mode code of an `MD0`/`MD1` reply.
pub fn parse_mode(data: &str) -> Result<Mode> {
    match data {
        "1" => Ok(Mode::LSB),
        "2" => Ok(Mode::USB),
        "3" => Ok(Mode::CW),
        "4" | "B" => Ok(Mode::FM),
        "5" => Ok(Mode::AM),
        "6" => Ok(Mode::RTTY),
        "7" => Ok(Mode::CWR),
        "8" => Ok(Mode::DataLSB),
        "9" => Ok(Mode::RTTYR),
        "A" => Ok(Mode::DataFM),
        "C" => Ok(Mode::DataUSB),
        "D" => Ok(Mode::DataAM),
        _ => Err(Error::Protocol(format!("unknown Yaesu mode code: {data:?}"))),
    }
}

pub fn parse_vfo(data: &str) -> Result<Vfo> {
    match data {
        "0" => Ok(Vfo::A),
        "1" => Ok(Vfo::B),
        _ => Err(Error::Protocol(format!("unexpected VS state: {data:?}"))),
    }
}

/// `0` is receive; `1` (mic) and `2` (data) are transmit.
pub fn parse_ptt(data: &str) -> Result<bool> {
    match data {
        "0" => Ok(false),
        "1" | "2" => Ok(true),
        _ => Err(Error::Protocol(format!("unexpected TX state: {data:?}"))),
    }
}

/// `FT` reports the transmitting VFO: 0 main, 1 sub.
pub fn parse_split(data: &str) -> Result<bool> {
    match data {
        "0" => Ok(false),
        "1" => Ok(true),
        _ => Err(Error::Protocol(format!("unexpected split state: {data:?}"))),
    }
}

/// A one- or two-digit selector index.
pub fn parse_index(data: &str) -> Result<u8> {
    if data.is_empty() || data.len() > 2 {
        return Err(Error::Protocol(format!(
            "expected 1-2 digit index, got {data:?}"
        )));
    }
    let value = parse_decimal(data)?;
    u8::try_from(value).map_err(|_| Error::Protocol(format!("index {value} out of range")))
}

/// Three-digit raw meter value, 0 to 255.
pub fn parse_meter(data: &str) -> Result<u8> {
    if data.len() != 3 {
        return Err(Error::Protocol(format!(
            "expected 3 digits for meter, got {} characters: {data:?}",
            data.len()
        )));
    }
    let value = parse_decimal(data)?;
    u8::try_from(value).map_err(|_| Error::Protocol(format!("meter value {value} exceeds 255")))
}
