//! RFT backend for catlink.
//!
//! The EKD-500 receiver takes carriage-return terminated ASCII commands and
//! usually answers nothing. A write succeeds once it is sent; a reply, when
//! one arrives before the timeout, is read off the line and logged.
//!
//! ```
//! use catlink_rft::commands::set_frequency;
//!
//! assert_eq!(set_frequency(14_074_000).unwrap().frame, b"FRQ14074.000000\r");
//! ```

pub mod commands;
pub mod models;
pub mod rig;

pub use rig::Ekd500;
