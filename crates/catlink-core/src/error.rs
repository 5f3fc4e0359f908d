//! Error types for catlink.
//!
//! All fallible operations return [`Result<T>`]. The variants map onto the
//! coarse [`ErrorKind`] taxonomy the transaction engine reasons about: only
//! [`ErrorKind::Timeout`] is ever retried, everything else is surfaced to
//! the caller on first occurrence.

use std::fmt;

/// The error type for all catlink operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The caller passed a value outside what the model declares
    /// (frequency range, RIT limit, unknown attenuator step, unsupported VFO).
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// No response arrived before the deadline.
    ///
    /// Usually the rig is off, the baud rate is wrong, or the bus address
    /// does not match.
    #[error("timeout waiting for response")]
    Timeout,

    /// A transport-level failure (serial port, TCP socket).
    #[error("transport error: {0}")]
    Transport(String),

    /// The link dropped underneath an open session.
    #[error("connection lost")]
    ConnectionLost,

    /// No connection to the rig has been established.
    #[error("not connected")]
    NotConnected,

    /// A reply arrived but could not be decoded: wrong length, missing
    /// terminator, invalid BCD digit, NAK.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The operation is not implemented for this model or VFO.
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// The operation is not valid for the object it was applied to, such as
    /// substituting parameters into a complete command template.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// An underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidParameter,
    Timeout,
    IoError,
    ProtocolError,
    Unsupported,
    InvalidOperation,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::InvalidParameter => "invalid parameter",
            ErrorKind::Timeout => "timeout",
            ErrorKind::IoError => "I/O error",
            ErrorKind::ProtocolError => "protocol error",
            ErrorKind::Unsupported => "unsupported",
            ErrorKind::InvalidOperation => "invalid operation",
        };
        write!(f, "{s}")
    }
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidParameter(_) => ErrorKind::InvalidParameter,
            Error::Timeout => ErrorKind::Timeout,
            Error::Transport(_) | Error::ConnectionLost | Error::NotConnected | Error::Io(_) => {
                ErrorKind::IoError
            }
            Error::Protocol(_) => ErrorKind::ProtocolError,
            Error::Unsupported(_) => ErrorKind::Unsupported,
            Error::InvalidOperation(_) => ErrorKind::InvalidOperation,
        }
    }

    /// Whether the transaction engine may re-send the command after this error.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Timeout
    }
}

/// A convenience `Result` alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;
