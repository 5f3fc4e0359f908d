//! Yaesu "newcat" framing.
//!
//! Newer Yaesu rigs take semicolon-terminated ASCII commands: a mnemonic
//! such as `FA` or `MD0`, decimal or code parameters, then `;`. A query is
//! the bare mnemonic and is answered by the mnemonic followed by the value.
//! Set commands are not acknowledged. A command the rig cannot execute is
//! answered with `?;`.
//!
//! ```text
//! host: FA;            rig: FA014074000;
//! host: FA007030000;   (no reply)
//! host: XX;            rig: ?;
//! ```

use catlink_core::command::{Field, TerminatedFrame};
use catlink_core::engine::{Reply, TransactionRequest};
use catlink_core::error::{Error, Result};

/// Command/response terminator byte.
pub const TERMINATOR: u8 = b';';

/// The rig's answer to a command it rejects.
pub const REJECTED: &[u8] = b"?;";

const FRAME: TerminatedFrame = TerminatedFrame::SEMICOLON;

/// Longest reply any supported newcat query produces.
const MAX_REPLY: usize = 64;

/// A newcat query: the bare mnemonic, answered by one `;`-terminated reply.
pub fn query(operation: &'static str, mnemonic: &str) -> TransactionRequest {
    TransactionRequest::query(
        operation,
        FRAME.query(mnemonic),
        Reply::Terminated {
            terminator: TERMINATOR,
            max_len: MAX_REPLY,
        },
    )
}

/// A newcat set command. The rig does not answer.
pub fn command(operation: &'static str, mnemonic: &str, fields: &[Field<'_>]) -> Result<TransactionRequest> {
    Ok(TransactionRequest::write(operation, FRAME.build(mnemonic, fields)?))
}

/// Body of a reply to `mnemonic`, after checking for `?;`.
///
/// ```
/// use catlink_yaesu::protocol::parse;
///
/// assert_eq!(parse("FA", b"FA014074000;").unwrap(), "014074000");
/// assert!(parse("FA", b"?;").is_err());
/// ```
pub fn parse<'r>(mnemonic: &str, reply: &'r [u8]) -> Result<&'r str> {
    if reply == REJECTED {
        return Err(Error::Protocol(format!("rig rejected {mnemonic} (?;)")));
    }
    FRAME.parse(mnemonic, reply)
}
