//! Yaesu backends for catlink.
//!
//! Yaesu rigs come in two protocol families, and this crate drives both:
//!
//! - **Fixed five-byte frames** ([`ft840_commands`], [`ft840`]) -- older
//!   rigs such as the FT-840 take four parameter bytes followed by an
//!   opcode, never acknowledge, and report state through fixed-size status
//!   blocks.
//! - **Newcat** ([`protocol`], [`commands`], [`newcat`]) -- current rigs
//!   such as the FT-DX101D take semicolon-terminated ASCII commands.
//!
//! [`models`] holds the capability descriptors for each supported rig.
//!
//! # Example
//!
//! ```
//! use catlink_yaesu::commands::{parse_frequency, read_frequency};
//! use catlink_yaesu::protocol::parse;
//! use catlink_core::types::Vfo;
//!
//! let request = read_frequency(Vfo::A).unwrap();
//! assert_eq!(request.frame, b"FA;");
//!
//! let body = parse("FA", b"FA014250000;").unwrap();
//! assert_eq!(parse_frequency(body).unwrap(), 14_250_000);
//! ```

pub mod commands;
pub mod ft840;
pub mod ft840_commands;
pub mod models;
pub mod newcat;
pub mod protocol;

pub use ft840::Ft840;
pub use newcat::NewcatRig;
