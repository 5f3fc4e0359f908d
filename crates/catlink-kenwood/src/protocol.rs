//! Kenwood VHF/UHF mobile framing.
//!
//! The TM-D710 family takes carriage-return terminated ASCII commands: a
//! two-letter mnemonic, then parameters each preceded by a space. Unlike
//! the HF rigs, every command is answered, set commands included: the rig
//! repeats the mnemonic with the resulting state.
//!
//! ```text
//! host: BC\r                rig: BC 0 0\r
//! host: FO 1 0145500000\r   rig: FO 1 0145500000\r
//! host: XX\r                rig: ?\r
//! ```
//!
//! `?` means the command is unknown; `N` means it is not available in the
//! rig's current state.

use catlink_core::command::{Field, TerminatedFrame};
use catlink_core::engine::{Reply, TransactionRequest};
use catlink_core::error::{Error, Result};

pub const TERMINATOR: u8 = b'\r';

const FRAME: TerminatedFrame = TerminatedFrame::CR_SPACED;

const MAX_REPLY: usize = 128;

fn reply() -> Reply {
    Reply::Terminated {
        terminator: TERMINATOR,
        max_len: MAX_REPLY,
    }
}

/// A bare query: the mnemonic alone.
pub fn query(operation: &'static str, mnemonic: &str) -> TransactionRequest {
    TransactionRequest::query(operation, FRAME.query(mnemonic), reply())
}

/// A command with parameters. Set commands are answered like queries.
pub fn command(
    operation: &'static str,
    mnemonic: &str,
    fields: &[Field<'_>],
) -> Result<TransactionRequest> {
    Ok(TransactionRequest::query(
        operation,
        FRAME.build(mnemonic, fields)?,
        reply(),
    ))
}

/// Fields of a reply to `mnemonic`.
///
/// ```
/// use catlink_kenwood::protocol::fields;
///
/// assert_eq!(fields("BC", b"BC 1 0\r").unwrap(), vec!["1", "0"]);
/// assert!(fields("BC", b"N\r").is_err());
/// ```
pub fn fields<'r>(mnemonic: &str, reply: &'r [u8]) -> Result<Vec<&'r str>> {
    match reply {
        b"?\r" => Err(Error::Protocol(format!("rig does not know {mnemonic}"))),
        b"N\r" => Err(Error::Protocol(format!(
            "{mnemonic} not available in the rig's current state"
        ))),
        _ => FRAME.fields(mnemonic, reply),
    }
}
