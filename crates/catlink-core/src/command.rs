//! Command tables and frame builders.
//!
//! Two framing families are covered here:
//!
//! - [`FixedFrame`]: constant-length binary frames built from static
//!   [`CommandTemplate`]s, as used by the older Yaesu CAT rigs. A template
//!   is either *complete* (sent verbatim) or *incomplete* (parameter bytes
//!   are overwritten at fixed offsets before sending).
//! - [`TerminatedFrame`]: ASCII mnemonics followed by decimal or text
//!   fields and a terminator byte, as used by Kenwood-style and newer Yaesu
//!   rigs and by the RFT receivers.
//!
//! CI-V framing lives in the Icom backend; it is addressed rather than
//! template-driven.
//!
//! Templates are `'static` data and are never mutated: every builder copies
//! the template bytes into a fresh buffer first.

use crate::error::{Error, Result};

// ---------------------------------------------------------------
// Fixed frames
// ---------------------------------------------------------------

/// One entry of a fixed-frame command table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandTemplate {
    pub is_complete: bool,
    pub bytes: &'static [u8],
}

impl CommandTemplate {
    /// A template sent exactly as written.
    pub const fn complete(bytes: &'static [u8]) -> Self {
        CommandTemplate {
            is_complete: true,
            bytes,
        }
    }

    /// A template whose parameter bytes are filled in per call.
    pub const fn incomplete(bytes: &'static [u8]) -> Self {
        CommandTemplate {
            is_complete: false,
            bytes,
        }
    }
}

/// Layout of a fixed-length binary frame.
///
/// `param_offsets[0]` is where P1 goes, `param_offsets[1]` P2, and so on.
/// Yaesu's 5-byte frames store the parameters in reverse, `[P4, P3, P2, P1,
/// opcode]`, so [`FixedFrame::YAESU_5`] maps P1 to offset 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedFrame {
    pub len: usize,
    pub param_offsets: &'static [usize],
}

impl FixedFrame {
    /// The classic Yaesu CAT frame: four parameter bytes then the opcode.
    pub const YAESU_5: FixedFrame = FixedFrame {
        len: 5,
        param_offsets: &[3, 2, 1, 0],
    };

    /// Return a complete template's bytes unchanged.
    pub fn frame(&self, template: &CommandTemplate) -> Result<Vec<u8>> {
        if !template.is_complete {
            return Err(Error::InvalidOperation(
                "incomplete template needs parameters".into(),
            ));
        }
        self.check_len(template)?;
        Ok(template.bytes.to_vec())
    }

    /// Copy an incomplete template and write `params` at P1, P2, ...
    ///
    /// ```
    /// use catlink_core::command::{CommandTemplate, FixedFrame};
    ///
    /// const MODE: CommandTemplate = CommandTemplate::incomplete(&[0, 0, 0, 0, 0x0c]);
    /// let frame = FixedFrame::YAESU_5.build(&MODE, &[0x01]).unwrap();
    /// assert_eq!(frame, vec![0, 0, 0, 0x01, 0x0c]);
    /// ```
    pub fn build(&self, template: &CommandTemplate, params: &[u8]) -> Result<Vec<u8>> {
        self.build_bcd(template, &[], params)
    }

    /// Copy an incomplete template, write a BCD payload starting at byte 0,
    /// then write `params` at P1, P2, ...
    pub fn build_bcd(
        &self,
        template: &CommandTemplate,
        bcd: &[u8],
        params: &[u8],
    ) -> Result<Vec<u8>> {
        if template.is_complete {
            return Err(Error::InvalidOperation(
                "cannot substitute parameters into a complete template".into(),
            ));
        }
        self.check_len(template)?;
        if params.len() > self.param_offsets.len() {
            return Err(Error::InvalidParameter(format!(
                "{} parameters given, frame has {} slots",
                params.len(),
                self.param_offsets.len()
            )));
        }
        // The opcode byte is never part of the payload.
        if bcd.len() >= self.len {
            return Err(Error::InvalidParameter(format!(
                "{}-byte BCD payload does not fit a {}-byte frame",
                bcd.len(),
                self.len
            )));
        }

        let mut frame = template.bytes.to_vec();
        frame[..bcd.len()].copy_from_slice(bcd);
        for (&offset, &value) in self.param_offsets.iter().zip(params) {
            frame[offset] = value;
        }
        Ok(frame)
    }

    fn check_len(&self, template: &CommandTemplate) -> Result<()> {
        if template.bytes.len() != self.len {
            return Err(Error::InvalidOperation(format!(
                "template is {} bytes, frame is {}",
                template.bytes.len(),
                self.len
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------
// Terminated ASCII frames
// ---------------------------------------------------------------

/// A field rendered after the mnemonic of an ASCII command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field<'a> {
    /// Zero-padded decimal exactly `width` digits wide.
    Num { value: u64, width: usize },
    /// Literal text.
    Text(&'a str),
}

impl Field<'_> {
    pub fn num(value: u64, width: usize) -> Self {
        Field::Num { value, width }
    }
}

/// Layout of an ASCII command family: a terminator byte and an optional
/// separator placed before each field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminatedFrame {
    pub terminator: u8,
    pub separator: Option<u8>,
}

impl TerminatedFrame {
    /// `;`-terminated, no separator (Yaesu "newcat", Kenwood HF).
    pub const SEMICOLON: TerminatedFrame = TerminatedFrame {
        terminator: b';',
        separator: None,
    };

    /// CR-terminated, no separator.
    pub const CR: TerminatedFrame = TerminatedFrame {
        terminator: b'\r',
        separator: None,
    };

    /// CR-terminated, fields separated by spaces (Kenwood VHF/UHF mobiles).
    pub const CR_SPACED: TerminatedFrame = TerminatedFrame {
        terminator: b'\r',
        separator: Some(b' '),
    };

    /// Render `mnemonic`, each field (preceded by the separator, if any),
    /// and the terminator.
    ///
    /// ```
    /// use catlink_core::command::{Field, TerminatedFrame};
    ///
    /// let cmd = TerminatedFrame::SEMICOLON
    ///     .build("FA", &[Field::num(14_074_000, 9)])
    ///     .unwrap();
    /// assert_eq!(cmd, b"FA014074000;");
    ///
    /// let cmd = TerminatedFrame::CR_SPACED
    ///     .build("BC", &[Field::num(1, 1), Field::num(1, 1)])
    ///     .unwrap();
    /// assert_eq!(cmd, b"BC 1 1\r");
    /// ```
    pub fn build(&self, mnemonic: &str, fields: &[Field<'_>]) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(mnemonic.len() + 16);
        out.extend_from_slice(mnemonic.as_bytes());
        for field in fields {
            if let Some(sep) = self.separator {
                out.push(sep);
            }
            match *field {
                Field::Num { value, width } => {
                    out.extend_from_slice(crate::framer::format_frequency(value, width)?.as_bytes())
                }
                Field::Text(text) => {
                    if text.as_bytes().contains(&self.terminator) {
                        return Err(Error::InvalidParameter(format!(
                            "field {text:?} contains the terminator"
                        )));
                    }
                    out.extend_from_slice(text.as_bytes());
                }
            }
        }
        out.push(self.terminator);
        Ok(out)
    }

    /// A bare query: the mnemonic and the terminator.
    pub fn query(&self, mnemonic: &str) -> Vec<u8> {
        let mut out = Vec::with_capacity(mnemonic.len() + 1);
        out.extend_from_slice(mnemonic.as_bytes());
        out.push(self.terminator);
        out
    }

    /// Check that `reply` echoes `mnemonic` and ends with the terminator,
    /// and return the body between them (leading separator removed).
    pub fn parse<'r>(&self, mnemonic: &str, reply: &'r [u8]) -> Result<&'r str> {
        let text = std::str::from_utf8(reply)
            .map_err(|_| Error::Protocol("reply is not ASCII".into()))?;
        let Some(text) = text.strip_suffix(self.terminator as char) else {
            return Err(Error::Protocol(format!(
                "reply {text:?} is missing terminator {:?}",
                self.terminator as char
            )));
        };
        let Some(body) = text.strip_prefix(mnemonic) else {
            return Err(Error::Protocol(format!(
                "expected {mnemonic} reply, got {text:?}"
            )));
        };
        Ok(match self.separator {
            Some(sep) => body.strip_prefix(sep as char).unwrap_or(body),
            None => body,
        })
    }

    /// [`parse`](Self::parse) and split the body on the separator.
    ///
    /// Without a separator the whole body is a single field.
    pub fn fields<'r>(&self, mnemonic: &str, reply: &'r [u8]) -> Result<Vec<&'r str>> {
        let body = self.parse(mnemonic, reply)?;
        Ok(match self.separator {
            Some(sep) => body.split(sep as char).collect(),
            None => vec![body],
        })
    }
}

/// Parse a decimal field, mapping failure to a protocol error.
pub fn parse_decimal(field: &str) -> Result<u64> {
    field
        .trim()
        .parse()
        .map_err(|_| Error::Protocol(format!("expected decimal field, got {field:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const VFO_A: CommandTemplate = CommandTemplate::complete(&[0x00, 0x00, 0x00, 0x00, 0x05]);
    const SET_FREQ: CommandTemplate = CommandTemplate::incomplete(&[0x00, 0x00, 0x00, 0x00, 0x0a]);
    const CLAR: CommandTemplate = CommandTemplate::incomplete(&[0x00, 0x00, 0x00, 0x00, 0x09]);

    // ---------------------------------------------------------------
    // Fixed frames
    // ---------------------------------------------------------------

    #[test]
    fn complete_template_sent_verbatim() {
        let frame = FixedFrame::YAESU_5.frame(&VFO_A).unwrap();
        assert_eq!(frame, VFO_A.bytes);
    }

    #[test]
    fn complete_template_rejects_parameters() {
        let err = FixedFrame::YAESU_5.build(&VFO_A, &[0x01]).unwrap_err();
        assert!(matches!(err, Error::InvalidOperation(_)));
        let err = FixedFrame::YAESU_5.build_bcd(&VFO_A, &[0x01], &[]).unwrap_err();
        assert!(matches!(err, Error::InvalidOperation(_)));
    }

    #[test]
    fn incomplete_template_needs_build() {
        let err = FixedFrame::YAESU_5.frame(&SET_FREQ).unwrap_err();
        assert!(matches!(err, Error::InvalidOperation(_)));
    }

    #[test]
    fn params_land_in_reverse_order() {
        let frame = FixedFrame::YAESU_5
            .build(&CLAR, &[0x11, 0x22, 0x33, 0x44])
            .unwrap();
        assert_eq!(frame, vec![0x44, 0x33, 0x22, 0x11, 0x09]);
    }

    #[test]
    fn too_many_params() {
        let err = FixedFrame::YAESU_5
            .build(&CLAR, &[1, 2, 3, 4, 5])
            .unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
    }

    #[test]
    fn bcd_payload_then_params() {
        let frame = FixedFrame::YAESU_5
            .build_bcd(&CLAR, &[0x99, 0x09], &[0xff, 0xff])
            .unwrap();
        assert_eq!(frame, vec![0x99, 0x09, 0xff, 0xff, 0x09]);
    }

    #[test]
    fn bcd_payload_cannot_cover_opcode() {
        let err = FixedFrame::YAESU_5
            .build_bcd(&SET_FREQ, &[0; 5], &[])
            .unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
    }

    #[test]
    fn build_leaves_template_untouched() {
        let _ = FixedFrame::YAESU_5.build(&CLAR, &[0x01]).unwrap();
        assert_eq!(CLAR.bytes, &[0x00, 0x00, 0x00, 0x00, 0x09]);
    }

    #[test]
    fn wrong_length_template() {
        const SHORT: CommandTemplate = CommandTemplate::incomplete(&[0x00, 0x0a]);
        assert!(FixedFrame::YAESU_5.build(&SHORT, &[]).is_err());
    }

    // ---------------------------------------------------------------
    // Terminated frames
    // ---------------------------------------------------------------

    #[test]
    fn build_without_fields() {
        assert_eq!(TerminatedFrame::SEMICOLON.build("TX", &[]).unwrap(), b"TX;");
        assert_eq!(TerminatedFrame::CR.query("BC"), b"BC\r");
    }

    #[test]
    fn build_text_field() {
        let cmd = TerminatedFrame::CR
            .build("FRQ", &[Field::Text("14074.000000")])
            .unwrap();
        assert_eq!(cmd, b"FRQ14074.000000\r");
    }

    #[test]
    fn build_rejects_overwide_number() {
        let err = TerminatedFrame::SEMICOLON
            .build("FA", &[Field::num(1_000_000_000, 9)])
            .unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
    }

    #[test]
    fn build_rejects_terminator_in_text() {
        assert!(TerminatedFrame::SEMICOLON
            .build("XX", &[Field::Text("a;b")])
            .is_err());
    }

    #[test]
    fn parse_returns_body() {
        let body = TerminatedFrame::SEMICOLON
            .parse("FA", b"FA014074000;")
            .unwrap();
        assert_eq!(body, "014074000");
        assert_eq!(parse_decimal(body).unwrap(), 14_074_000);
    }

    #[test]
    fn parse_spaced_fields() {
        let fields = TerminatedFrame::CR_SPACED
            .fields("FO", b"FO 1 435000000\r")
            .unwrap();
        assert_eq!(fields, vec!["1", "435000000"]);
    }

    #[test]
    fn parse_rejects_wrong_mnemonic() {
        let err = TerminatedFrame::SEMICOLON
            .parse("FA", b"FB014074000;")
            .unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }

    #[test]
    fn parse_rejects_missing_terminator() {
        let err = TerminatedFrame::SEMICOLON
            .parse("FA", b"FA014074000")
            .unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }

    #[test]
    fn parse_decimal_rejects_garbage() {
        assert!(matches!(parse_decimal("12a"), Err(Error::Protocol(_))));
    }
}
