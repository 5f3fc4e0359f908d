//! Serial port transport.
//!
//! [`SerialTransport`] implements [`Transport`] over RS-232 ports and USB
//! virtual COM ports. Line settings usually come straight from a model's
//! [`TransportDefaults`] via [`SerialConfig::from_defaults`]: the FT-840
//! wants 4800 baud 8N2, the IC-7800 19200 8N1, the FT-DX101D RTS/CTS.
//!
//! # Example
//!
//! ```no_run
//! use catlink_transport::{SerialConfig, SerialTransport};
//! use catlink_core::caps::TransportDefaults;
//! use catlink_core::transport::Transport;
//! use std::time::Duration;
//!
//! # async fn example() -> catlink_core::Result<()> {
//! let config = SerialConfig::from_defaults(&TransportDefaults::default(), Some(19200));
//! let mut transport = SerialTransport::open_with_config("/dev/ttyUSB0", config).await?;
//!
//! // CI-V "read frequency" to an IC-7800 at 0x6A.
//! transport.send(&[0xFE, 0xFE, 0x6A, 0xE0, 0x03, 0xFD]).await?;
//! let mut buf = [0u8; 64];
//! let n = transport.receive(&mut buf, Duration::from_secs(1)).await?;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use catlink_core::caps::{Handshake, Parity, TransportDefaults};
use catlink_core::error::{Error, Result};
use catlink_core::framer::to_hex;
use catlink_core::transport::Transport;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_serial::{ClearBuffer, SerialPort, SerialPortBuilderExt, SerialStream};

/// Serial line settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialConfig {
    pub baud_rate: u32,
    /// 5 to 8.
    pub data_bits: u8,
    /// 1 or 2.
    pub stop_bits: u8,
    pub parity: Parity,
    pub handshake: Handshake,
}

impl Default for SerialConfig {
    fn default() -> Self {
        SerialConfig {
            baud_rate: 9600,
            data_bits: 8,
            stop_bits: 1,
            parity: Parity::None,
            handshake: Handshake::None,
        }
    }
}

impl SerialConfig {
    /// Line settings from a model's defaults.
    ///
    /// `baud` overrides the rate; without it the model's highest supported
    /// rate is used. A rate outside the model's range is accepted with a
    /// warning, since many rigs can be reconfigured from the front panel.
    pub fn from_defaults(defaults: &TransportDefaults, baud: Option<u32>) -> Self {
        let baud_rate = baud.unwrap_or(defaults.baud_max);
        if baud_rate < defaults.baud_min || baud_rate > defaults.baud_max {
            tracing::warn!(
                baud_rate,
                min = defaults.baud_min,
                max = defaults.baud_max,
                "baud rate outside the model's supported range"
            );
        }
        SerialConfig {
            baud_rate,
            data_bits: defaults.data_bits,
            stop_bits: defaults.stop_bits,
            parity: defaults.parity,
            handshake: defaults.handshake,
        }
    }

    fn data_bits(&self) -> Result<tokio_serial::DataBits> {
        match self.data_bits {
            5 => Ok(tokio_serial::DataBits::Five),
            6 => Ok(tokio_serial::DataBits::Six),
            7 => Ok(tokio_serial::DataBits::Seven),
            8 => Ok(tokio_serial::DataBits::Eight),
            n => Err(Error::InvalidParameter(format!("{n} data bits"))),
        }
    }

    fn stop_bits(&self) -> Result<tokio_serial::StopBits> {
        match self.stop_bits {
            1 => Ok(tokio_serial::StopBits::One),
            2 => Ok(tokio_serial::StopBits::Two),
            n => Err(Error::InvalidParameter(format!("{n} stop bits"))),
        }
    }

    fn parity(&self) -> tokio_serial::Parity {
        match self.parity {
            Parity::None => tokio_serial::Parity::None,
            Parity::Odd => tokio_serial::Parity::Odd,
            Parity::Even => tokio_serial::Parity::Even,
        }
    }

    fn flow_control(&self) -> tokio_serial::FlowControl {
        match self.handshake {
            Handshake::None => tokio_serial::FlowControl::None,
            Handshake::Software => tokio_serial::FlowControl::Software,
            Handshake::Hardware => tokio_serial::FlowControl::Hardware,
        }
    }
}

fn map_io_error(e: std::io::Error) -> Error {
    match e.kind() {
        std::io::ErrorKind::BrokenPipe | std::io::ErrorKind::NotConnected => Error::ConnectionLost,
        _ => Error::Io(e),
    }
}

/// Transport over a serial port.
pub struct SerialTransport {
    port: Option<SerialStream>,
    port_name: String,
}

impl SerialTransport {
    /// Open `port` at `baud_rate`, 8N1, no flow control.
    pub async fn open(port: &str, baud_rate: u32) -> Result<Self> {
        let config = SerialConfig {
            baud_rate,
            ..Default::default()
        };
        Self::open_with_config(port, config).await
    }

    /// Open `port` with explicit line settings.
    ///
    /// DTR and RTS are de-asserted after opening unless hardware handshake
    /// is in use, so rigs that wire them to PTT or the CW key stay in
    /// receive.
    pub async fn open_with_config(port: &str, config: SerialConfig) -> Result<Self> {
        tracing::debug!(
            port = %port,
            baud_rate = config.baud_rate,
            data_bits = config.data_bits,
            stop_bits = config.stop_bits,
            parity = ?config.parity,
            handshake = ?config.handshake,
            "opening serial port"
        );

        let mut stream = tokio_serial::new(port, config.baud_rate)
            .data_bits(config.data_bits()?)
            .stop_bits(config.stop_bits()?)
            .parity(config.parity())
            .flow_control(config.flow_control())
            .open_native_async()
            .map_err(|e| {
                tracing::error!(port = %port, error = %e, "failed to open serial port");
                Error::Transport(format!("failed to open serial port {port}: {e}"))
            })?;

        if let Err(e) = stream.write_data_terminal_ready(false) {
            tracing::warn!(port = %port, error = %e, "failed to de-assert DTR");
        }
        if config.handshake != Handshake::Hardware {
            if let Err(e) = stream.write_request_to_send(false) {
                tracing::warn!(port = %port, error = %e, "failed to de-assert RTS");
            }
        }

        tracing::info!(port = %port, baud_rate = config.baud_rate, "serial port opened");

        Ok(SerialTransport {
            port: Some(stream),
            port_name: port.to_string(),
        })
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

#[async_trait]
impl Transport for SerialTransport {
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        let port = self.port.as_mut().ok_or(Error::NotConnected)?;
        tracing::trace!(port = %self.port_name, bytes = %to_hex(data), "serial write");

        port.write_all(data).await.map_err(|e| {
            tracing::error!(port = %self.port_name, error = %e, "serial write failed");
            map_io_error(e)
        })?;
        port.flush().await.map_err(map_io_error)
    }

    async fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize> {
        let port = self.port.as_mut().ok_or(Error::NotConnected)?;

        match tokio::time::timeout(timeout, port.read(buf)).await {
            Ok(Ok(0)) => Err(Error::ConnectionLost),
            Ok(Ok(n)) => {
                tracing::trace!(port = %self.port_name, bytes = %to_hex(&buf[..n]), "serial read");
                Ok(n)
            }
            Ok(Err(e)) => {
                tracing::error!(port = %self.port_name, error = %e, "serial read failed");
                Err(map_io_error(e))
            }
            Err(_) => Err(Error::Timeout),
        }
    }

    async fn clear_input(&mut self) -> Result<()> {
        let port = self.port.as_mut().ok_or(Error::NotConnected)?;
        port.clear(ClearBuffer::Input)
            .map_err(|e| Error::Transport(format!("{}: clearing input: {e}", self.port_name)))
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(mut port) = self.port.take() {
            if let Err(e) = port.flush().await {
                tracing::warn!(port = %self.port_name, error = %e, "flush before close failed");
            }
            tracing::info!(port = %self.port_name, "serial port closed");
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.port.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_is_8n1() {
        let config = SerialConfig::default();
        assert_eq!(config.baud_rate, 9600);
        assert_eq!(config.data_bits, 8);
        assert_eq!(config.stop_bits, 1);
        assert_eq!(config.parity, Parity::None);
        assert_eq!(config.handshake, Handshake::None);
    }

    #[test]
    fn config_from_model_defaults() {
        let defaults = TransportDefaults {
            baud_min: 4800,
            baud_max: 4800,
            stop_bits: 2,
            ..TransportDefaults::default()
        };
        let config = SerialConfig::from_defaults(&defaults, None);
        assert_eq!(config.baud_rate, 4800);
        assert_eq!(config.stop_bits, 2);
        assert!(matches!(config.stop_bits(), Ok(tokio_serial::StopBits::Two)));
    }

    #[test]
    fn baud_override_wins() {
        let defaults = TransportDefaults {
            baud_min: 300,
            baud_max: 19200,
            ..TransportDefaults::default()
        };
        assert_eq!(SerialConfig::from_defaults(&defaults, Some(9600)).baud_rate, 9600);
        assert_eq!(SerialConfig::from_defaults(&defaults, None).baud_rate, 19200);
    }

    #[test]
    fn rejects_impossible_framing() {
        let config = SerialConfig {
            data_bits: 9,
            stop_bits: 3,
            ..SerialConfig::default()
        };
        assert!(config.data_bits().is_err());
        assert!(config.stop_bits().is_err());
    }

    #[test]
    fn handshake_maps_to_flow_control() {
        let config = SerialConfig {
            handshake: Handshake::Hardware,
            ..SerialConfig::default()
        };
        assert_eq!(config.flow_control(), tokio_serial::FlowControl::Hardware);
    }

    #[tokio::test]
    async fn open_nonexistent_port_fails() {
        let result = SerialTransport::open("/dev/catlink-no-such-port", 9600).await;
        assert!(matches!(result, Err(Error::Transport(_))));
    }
}
