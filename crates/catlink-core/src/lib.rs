//! catlink-core: the protocol transaction engine behind catlink.
//!
//! This crate holds everything that is independent of a particular vendor
//! protocol: field encoding, command tables, the paced transport session,
//! the transaction engine with its retry policy, capability descriptors,
//! and the [`Rig`] trait the backends implement.
//!
//! # Key types
//!
//! - [`Rig`] -- the unified control trait
//! - [`RigSession`] -- lock-serialized session state and transport
//! - [`TransactionEngine`] -- build, send, await, decode, retry
//! - [`CapabilityDescriptor`] -- per-model metadata and validation
//! - [`Transport`] -- byte-level communication channel
//! - [`Error`] / [`Result`] -- error handling

pub mod calibration;
pub mod caps;
pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod framer;
pub mod rig;
pub mod session;
pub mod transport;
pub mod types;

pub use calibration::{CalibrationPoint, CalibrationTable};
pub use caps::{
    AttenuatorMap, CapabilityDescriptor, DescriptorBuilder, FreqRange, Handshake, Parity,
    PortType, TransportDefaults,
};
pub use command::{CommandTemplate, Field, FixedFrame, TerminatedFrame};
pub use config::SessionConfig;
pub use engine::{Reply, TransactionEngine, TransactionRequest, TransactionState};
pub use error::{Error, ErrorKind, Result};
pub use framer::{format_freq_mhz, to_hex};
pub use rig::Rig;
pub use session::{RigSession, SessionInner, SessionState};
pub use transport::{Pacing, Transport, TransportSession};
pub use types::*;
