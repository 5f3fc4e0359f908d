//! Fixed-width field encoding shared by every protocol family.
//!
//! Binary families carry numbers as packed BCD, two decimal digits per
//! byte. Yaesu's fixed frames and Icom's CI-V put the least-significant
//! byte first; several Icom sub-commands (clock, levels) and Kenwood-derived
//! firmware use the big-endian layout. ASCII families carry zero-padded
//! decimal strings instead.
//!
//! Encoding rejects values that need more digits than the field provides
//! instead of silently dropping the high digits, and decoding rejects
//! nibbles `A`-`F`. Both checks turn a desynchronised link into a typed
//! error at the point of failure.

use crate::error::{Error, Result};

/// Largest digit count whose full decimal range fits in a `u64`.
const MAX_DIGITS: usize = 19;

fn check_fits(value: u64, digits: usize) -> Result<()> {
    if digits == 0 {
        return Err(Error::InvalidParameter(
            "BCD field must hold at least one digit".into(),
        ));
    }
    if digits <= MAX_DIGITS && value >= 10u64.pow(digits as u32) {
        return Err(Error::InvalidParameter(format!(
            "{value} does not fit in {digits} BCD digits"
        )));
    }
    Ok(())
}

fn nibble_at(byte: u8, high: bool) -> Result<u64> {
    let nibble = if high { byte >> 4 } else { byte & 0x0F };
    if nibble > 9 {
        return Err(Error::Protocol(format!(
            "invalid BCD digit 0x{nibble:X} in byte 0x{byte:02X}"
        )));
    }
    Ok(u64::from(nibble))
}

fn accumulate(value: u64, digit: u64) -> Result<u64> {
    value
        .checked_mul(10)
        .and_then(|v| v.checked_add(digit))
        .ok_or_else(|| Error::Protocol("BCD value overflows 64 bits".into()))
}

fn check_len(bytes: &[u8], digits: usize) -> Result<usize> {
    let need = digits.div_ceil(2);
    if bytes.len() < need {
        return Err(Error::Protocol(format!(
            "BCD field needs {need} bytes for {digits} digits, got {}",
            bytes.len()
        )));
    }
    Ok(need)
}

/// Pack `value` into `digits` BCD digits, least-significant byte first.
///
/// With an odd digit count the high nibble of the last byte is zero.
///
/// ```
/// use catlink_core::framer::to_bcd;
///
/// // 14.074 MHz in 10 Hz units, as a Yaesu fixed-frame rig expects it.
/// assert_eq!(to_bcd(1_407_400, 8).unwrap(), vec![0x00, 0x74, 0x40, 0x01]);
/// ```
pub fn to_bcd(value: u64, digits: usize) -> Result<Vec<u8>> {
    check_fits(value, digits)?;
    let mut out = vec![0u8; digits.div_ceil(2)];
    let mut rest = value;
    for i in 0..digits {
        let digit = (rest % 10) as u8;
        rest /= 10;
        out[i / 2] |= if i % 2 == 0 { digit } else { digit << 4 };
    }
    Ok(out)
}

/// Pack `value` into `digits` BCD digits, most-significant byte first.
///
/// With an odd digit count the high nibble of the first byte is zero.
pub fn to_bcd_be(value: u64, digits: usize) -> Result<Vec<u8>> {
    check_fits(value, digits)?;
    let len = digits.div_ceil(2);
    let mut out = vec![0u8; len];
    let mut rest = value;
    for i in 0..digits {
        let digit = (rest % 10) as u8;
        rest /= 10;
        out[len - 1 - i / 2] |= if i % 2 == 0 { digit } else { digit << 4 };
    }
    Ok(out)
}

/// Decode `digits` little-endian BCD digits from the start of `bytes`.
///
/// Extra trailing bytes are ignored.
pub fn from_bcd(bytes: &[u8], digits: usize) -> Result<u64> {
    check_len(bytes, digits)?;
    let mut value = 0u64;
    for i in (0..digits).rev() {
        let digit = nibble_at(bytes[i / 2], i % 2 == 1)?;
        value = accumulate(value, digit)?;
    }
    Ok(value)
}

/// Decode `digits` big-endian BCD digits from the start of `bytes`.
pub fn from_bcd_be(bytes: &[u8], digits: usize) -> Result<u64> {
    let len = check_len(bytes, digits)?;
    let mut value = 0u64;
    for i in (0..digits).rev() {
        let digit = nibble_at(bytes[len - 1 - i / 2], i % 2 == 1)?;
        value = accumulate(value, digit)?;
    }
    Ok(value)
}

/// Render `value` as a zero-padded decimal string exactly `width` wide.
///
/// ```
/// use catlink_core::framer::format_frequency;
///
/// assert_eq!(format_frequency(14_074_000, 9).unwrap(), "014074000");
/// assert!(format_frequency(1_000_000_000, 9).is_err());
/// ```
pub fn format_frequency(value: u64, width: usize) -> Result<String> {
    let s = format!("{value:0width$}");
    if s.len() > width {
        return Err(Error::InvalidParameter(format!(
            "{value} does not fit in {width} decimal digits"
        )));
    }
    Ok(s)
}

/// Space-separated lowercase hex dump, used in trace logs.
pub fn to_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Format a frequency in hertz as a human-readable MHz string.
///
/// ```
/// use catlink_core::framer::format_freq_mhz;
///
/// assert_eq!(format_freq_mhz(14_074_000), "14.074000 MHz");
/// ```
pub fn format_freq_mhz(freq_hz: u64) -> String {
    let mhz = freq_hz as f64 / 1_000_000.0;
    format!("{mhz:.6} MHz")
}
