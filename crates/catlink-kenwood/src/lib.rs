//! Kenwood backend for catlink.
//!
//! Covers the VHF/UHF mobiles that speak carriage-return framed commands
//! with space-separated parameters:
//!
//! - **Framing** ([`protocol`]) -- request builders and reply field
//!   splitting, including the `?` and `N` rejections.
//! - **Commands** ([`commands`]) -- `BC` band control and `FO` frequency.
//! - **Models** ([`models`]) -- the TM-D710 descriptor.
//! - **TmD710** ([`rig`]) -- the [`Rig`](catlink_core::rig::Rig)
//!   implementation.
//!
//! # Example
//!
//! ```
//! use catlink_kenwood::commands::{parse_frequency, read_frequency};
//! use catlink_core::types::Vfo;
//!
//! assert_eq!(read_frequency(Vfo::A).unwrap().frame, b"FO 0\r");
//! let (band, hz) = parse_frequency(b"FO 0 0145500000\r").unwrap();
//! assert_eq!((band, hz), (Vfo::A, 145_500_000));
//! ```

pub mod commands;
pub mod models;
pub mod protocol;
pub mod rig;

pub use rig::TmD710;
