//! RigBuilder -- fluent construction of a connected [`Rig`].
//!
//! The builder looks the model up in the [`registry`](crate::registry()),
//! opens the transport the caller asked for, wraps it in the model's
//! backend and runs the backend's open sequence.
//!
//! ```no_run
//! use catlink::RigBuilder;
//! use catlink::types::{ModelId, Vfo};
//!
//! # async fn example() -> catlink::Result<()> {
//! let rig = RigBuilder::new(ModelId::from_raw(3056))
//!     .serial_port("/dev/ttyUSB0")
//!     .baud_rate(19_200)
//!     .build()
//!     .await?;
//! let hz = rig.get_frequency(Vfo::Current).await?;
//! # Ok(())
//! # }
//! ```

use tracing::info;

use catlink_core::config::SessionConfig;
use catlink_core::error::{Error, Result};
use catlink_core::rig::Rig;
use catlink_core::transport::Transport;
use catlink_core::types::ModelId;
use catlink_transport::{SerialConfig, SerialTransport, TcpTransport};

use crate::registry::{self, RegistryEntry};

#[derive(Debug, Clone)]
pub struct RigBuilder {
    model: ModelId,
    serial_port: Option<String>,
    baud_rate: Option<u32>,
    tcp_address: Option<String>,
    config: SessionConfig,
}

impl RigBuilder {
    pub fn new(model: ModelId) -> Self {
        RigBuilder {
            model,
            serial_port: None,
            baud_rate: None,
            tcp_address: None,
            config: SessionConfig::default(),
        }
    }

    /// Start from a model name such as `"IC-7800"` or `"ft840"`.
    pub fn by_name(name: &str) -> Result<Self> {
        let entry = registry::find_by_name(name)
            .ok_or_else(|| Error::InvalidParameter(format!("unknown rig model {name:?}")))?;
        Ok(Self::new(entry.descriptor.model_id))
    }

    /// Serial port path, e.g. `/dev/ttyUSB0` or `COM3`.
    pub fn serial_port(mut self, port: &str) -> Self {
        self.serial_port = Some(port.to_string());
        self
    }

    /// Override the model's highest supported baud rate.
    pub fn baud_rate(mut self, baud: u32) -> Self {
        self.baud_rate = Some(baud);
        self
    }

    /// Reach the rig through a serial-to-network bridge at `host:port`.
    pub fn tcp_address(mut self, addr: &str) -> Self {
        self.tcp_address = Some(addr.to_string());
        self
    }

    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    fn entry(&self) -> Result<&'static RegistryEntry> {
        registry::registry()
            .get(self.model)
            .ok_or_else(|| Error::InvalidParameter(format!("unknown model id {}", self.model)))
    }

    /// Build around a caller-supplied transport, e.g. a `MockTransport`.
    pub async fn build_with_transport(self, transport: Box<dyn Transport>) -> Result<Box<dyn Rig>> {
        let entry = self.entry()?;
        let rig = entry.create(transport, self.config)?;
        rig.open().await?;
        info!(model = %entry.descriptor.model_name, "rig open");
        Ok(rig)
    }

    /// Open the serial port or TCP connection and build the rig.
    ///
    /// Exactly one of [`serial_port`](Self::serial_port) and
    /// [`tcp_address`](Self::tcp_address) must be set.
    pub async fn build(self) -> Result<Box<dyn Rig>> {
        let entry = self.entry()?;
        let transport: Box<dyn Transport> = match (&self.serial_port, &self.tcp_address) {
            (Some(port), None) => {
                let serial = SerialConfig::from_defaults(&entry.descriptor.transport, self.baud_rate);
                Box::new(SerialTransport::open_with_config(port, serial).await?)
            }
            (None, Some(addr)) => Box::new(TcpTransport::connect(addr).await?),
            (None, None) => {
                return Err(Error::InvalidParameter(
                    "a serial port or TCP address is required".into(),
                ));
            }
            (Some(_), Some(_)) => {
                return Err(Error::InvalidParameter(
                    "choose either a serial port or a TCP address".into(),
                ));
            }
        };
        self.build_with_transport(transport).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catlink_core::types::Vfo;
    use catlink_test_harness::MockTransport;
    use std::time::Duration;

    #[tokio::test]
    async fn builds_registered_model() {
        let rig = RigBuilder::by_name("ic-275")
            .unwrap()
            .build_with_transport(Box::new(MockTransport::new()))
            .await
            .unwrap();
        assert_eq!(rig.descriptor().model_name, "IC-275");
        assert!(rig.session().is_connected().await);
    }

    #[tokio::test]
    async fn address_override_reaches_backend() {
        let mut mock = MockTransport::new();
        let probe = mock.probe();
        let request = [0xFE, 0xFE, 0x42, 0xE0, 0x03, 0xFD];
        let mut reply = request.to_vec();
        reply.extend([0xFE, 0xFE, 0xE0, 0x42, 0x03, 0x00, 0x00, 0x25, 0x14, 0x00, 0xFD]);
        mock.expect(&request, &reply);

        let rig = RigBuilder::new(ModelId::from_raw(3056))
            .config(
                SessionConfig::default()
                    .with_address(0x42)
                    .with_timeout(Duration::from_millis(20)),
            )
            .build_with_transport(Box::new(mock))
            .await
            .unwrap();
        assert_eq!(rig.get_frequency(Vfo::Current).await.unwrap(), 14_250_000);
        assert_eq!(probe.remaining_expectations(), 0);
    }

    #[tokio::test]
    async fn open_sequence_runs() {
        let mut mock = MockTransport::new();
        let probe = mock.probe();
        mock.expect(b"AI;", b"AI1;");
        mock.expect(b"AI0;", b"");
        RigBuilder::by_name("FT-DX101D")
            .unwrap()
            .build_with_transport(Box::new(mock))
            .await
            .unwrap();
        assert_eq!(probe.sent(), vec![b"AI;".to_vec(), b"AI0;".to_vec()]);
    }

    #[tokio::test]
    async fn unknown_model() {
        assert!(matches!(
            RigBuilder::by_name("TS-2000"),
            Err(Error::InvalidParameter(_))
        ));
        let result = RigBuilder::new(ModelId::from_raw(9999))
            .build_with_transport(Box::new(MockTransport::new()))
            .await;
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
    }

    #[tokio::test]
    async fn build_needs_exactly_one_transport() {
        let result = RigBuilder::new(ModelId::from_raw(24001)).build().await;
        assert!(matches!(result, Err(Error::InvalidParameter(_))));

        let result = RigBuilder::new(ModelId::from_raw(24001))
            .serial_port("/dev/ttyUSB0")
            .tcp_address("127.0.0.1:4532")
            .build()
            .await;
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
    }
}
