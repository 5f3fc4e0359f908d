//! Transport implementations for catlink.
//!
//! Concrete implementations of the [`Transport`](catlink_core::Transport)
//! trait from `catlink-core`:
//!
//! - [`SerialTransport`]: RS-232 and USB virtual COM ports
//! - [`TcpTransport`]: the same byte stream over a TCP socket
//!
//! # Example
//!
//! ```no_run
//! use catlink_transport::SerialTransport;
//! use catlink_core::transport::Transport;
//! use std::time::Duration;
//!
//! # async fn example() -> catlink_core::Result<()> {
//! // FT-840 "read flags" at 4800 baud.
//! let mut transport = SerialTransport::open("/dev/ttyUSB0", 4800).await?;
//! transport.send(&[0x00, 0x00, 0x00, 0x00, 0xFA]).await?;
//!
//! let mut buf = [0u8; 16];
//! let n = transport.receive(&mut buf, Duration::from_secs(2)).await?;
//! # Ok(())
//! # }
//! ```

pub mod serial;
pub mod tcp;

pub use serial::{SerialConfig, SerialTransport};
pub use tcp::TcpTransport;
