//! TM-D710 command builders and reply parsers.
//!
//! The rig has two independent bands, A (0) and B (1). `BC` selects which
//! band has the controls and which transmits; `FO` reads or writes one
//! band's frequency directly, without changing the control band.

use catlink_core::command::{Field, parse_decimal};
use catlink_core::engine::TransactionRequest;
use catlink_core::error::{Error, Result};
use catlink_core::types::Vfo;

use crate::protocol;

/// Digits in an `FO` frequency field.
const FREQ_DIGITS: usize = 10;

/// Band number for a VFO.
pub fn band(vfo: Vfo) -> Result<u8> {
    match vfo {
        Vfo::A => Ok(0),
        Vfo::B => Ok(1),
        other => Err(Error::InvalidParameter(format!("no band for {other}"))),
    }
}

pub fn band_vfo(band: u8) -> Result<Vfo> {
    match band {
        0 => Ok(Vfo::A),
        1 => Ok(Vfo::B),
        other => Err(Error::Protocol(format!("unknown band {other}"))),
    }
}

pub fn read_band_control() -> TransactionRequest {
    protocol::query("get_vfo", "BC")
}

/// Give `vfo` both the controls and PTT.
pub fn set_band_control(vfo: Vfo) -> Result<TransactionRequest> {
    let b = u64::from(band(vfo)?);
    protocol::command("set_vfo", "BC", &[Field::num(b, 1), Field::num(b, 1)])
}

pub fn read_frequency(vfo: Vfo) -> Result<TransactionRequest> {
    let b = u64::from(band(vfo)?);
    Ok(protocol::command("get_freq", "FO", &[Field::num(b, 1)])?.for_vfo(vfo))
}

pub fn set_frequency(vfo: Vfo, freq_hz: u64) -> Result<TransactionRequest> {
    let b = u64::from(band(vfo)?);
    Ok(protocol::command(
        "set_freq",
        "FO",
        &[Field::num(b, 1), Field::num(freq_hz, FREQ_DIGITS)],
    )?
    .for_vfo(vfo))
}

/// Control band and PTT band of a `BC` reply.
pub fn parse_band_control(reply: &[u8]) -> Result<(Vfo, Vfo)> {
    match protocol::fields("BC", reply)?.as_slice() {
        [control, ptt] => Ok((band_field(control)?, band_field(ptt)?)),
        other => Err(Error::Protocol(format!("BC reply has {} fields", other.len()))),
    }
}

/// Band and frequency of an `FO` reply. Fields after the frequency
/// (step, shift, tone settings) are ignored.
pub fn parse_frequency(reply: &[u8]) -> Result<(Vfo, u64)> {
    match protocol::fields("FO", reply)?.as_slice() {
        [band, freq, ..] => Ok((band_field(band)?, parse_decimal(freq)?)),
        _ => Err(Error::Protocol("FO reply without frequency".into())),
    }
}

fn band_field(field: &str) -> Result<Vfo> {
    let n = parse_decimal(field)?;
    band_vfo(u8::try_from(n).map_err(|_| Error::Protocol(format!("band {field:?}")))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_numbers() {
        assert_eq!(band(Vfo::A).unwrap(), 0);
        assert_eq!(band(Vfo::B).unwrap(), 1);
        assert!(matches!(band(Vfo::Main), Err(Error::InvalidParameter(_))));
        assert!(matches!(band_vfo(2), Err(Error::Protocol(_))));
    }

    #[test]
    fn frequency_frames() {
        assert_eq!(read_frequency(Vfo::B).unwrap().frame, b"FO 1\r");
        let req = set_frequency(Vfo::A, 145_500_000).unwrap();
        assert_eq!(req.frame, b"FO 0 0145500000\r");
        assert_eq!(req.vfo, Some(Vfo::A));
    }

    #[test]
    fn band_control_frames() {
        assert_eq!(read_band_control().frame, b"BC\r");
        assert_eq!(set_band_control(Vfo::B).unwrap().frame, b"BC 1 1\r");
    }

    #[test]
    fn parse_fo_with_trailing_fields() {
        let (vfo, freq) = parse_frequency(b"FO 1 0433500000 0 0 0 0 0 0 08 08 000\r").unwrap();
        assert_eq!(vfo, Vfo::B);
        assert_eq!(freq, 433_500_000);
        assert_eq!(parse_frequency(b"FO 0 14074000\r").unwrap().1, 14_074_000);
    }

    #[test]
    fn parse_fo_errors() {
        assert!(parse_frequency(b"FO 0\r").is_err());
        assert!(parse_frequency(b"FO 0 abc\r").is_err());
        assert!(parse_frequency(b"FO 3 0145000000\r").is_err());
    }

    #[test]
    fn parse_bc() {
        assert_eq!(parse_band_control(b"BC 1 0\r").unwrap(), (Vfo::B, Vfo::A));
        assert!(parse_band_control(b"BC 1\r").is_err());
    }
}
