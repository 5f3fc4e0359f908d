//! catlink-test-harness: scripted transports for catlink tests.
//!
//! [`MockTransport`] stands in for a serial port or socket so protocol
//! backends and the transaction engine can be tested byte for byte without
//! a radio attached. [`MockProbe`] inspects the traffic afterwards.

pub mod mock_transport;

pub use mock_transport::{MockProbe, MockTransport};
