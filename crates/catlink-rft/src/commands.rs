//! EKD-500 commands.

use catlink_core::command::{Field, TerminatedFrame};
use catlink_core::engine::{Reply, TransactionRequest};
use catlink_core::error::Result;

const FRAME: TerminatedFrame = TerminatedFrame::CR;

const MAX_REPLY: usize = 64;

/// `FRQ<kHz>` with six decimal places. The receiver usually stays silent.
pub fn set_frequency(freq_hz: u64) -> Result<TransactionRequest> {
    let khz = format!("{}.{:03}000", freq_hz / 1000, freq_hz % 1000);
    let frame = FRAME.build("FRQ", &[Field::Text(&khz)])?;
    Ok(TransactionRequest::query(
        "set_freq",
        frame,
        Reply::Optional {
            terminator: b'\r',
            max_len: MAX_REPLY,
        },
    ))
}
