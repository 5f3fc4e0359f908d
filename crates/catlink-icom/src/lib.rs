//! Icom CI-V backend for catlink.
//!
//! CI-V is a binary protocol on a shared, echoing bus. This crate provides:
//!
//! - **Frame codec** ([`civ`]) -- encode and decode frames, BCD fields,
//!   ACK/NAK and collision handling.
//! - **Command builders** ([`commands`]) -- one transaction request per
//!   rig operation, plus parsers for the data replies.
//! - **Model definitions** ([`models`]) -- capability descriptors for the
//!   IC-7800 and IC-275.
//! - **IcomRig** ([`rig`]) -- the [`Rig`](catlink_core::rig::Rig)
//!   implementation.
//!
//! # Example
//!
//! ```
//! use catlink_icom::civ::{Civ, decode_frame};
//! use catlink_icom::commands::read_frequency;
//!
//! let civ = Civ::new(0x6a);
//! let request = read_frequency(&civ);
//! assert_eq!(request.frame, vec![0xFE, 0xFE, 0x6A, 0xE0, 0x03, 0xFD]);
//!
//! let ack = decode_frame(&[0xFE, 0xFE, 0xE0, 0x6A, 0xFB, 0xFD]).unwrap();
//! assert!(ack.is_ack());
//! ```

pub mod civ;
pub mod commands;
pub mod models;
pub mod rig;

pub use rig::IcomRig;
