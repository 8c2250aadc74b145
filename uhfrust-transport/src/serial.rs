//! Serial port transport
//!
//! Reader modules present as USB virtual COM ports (115200 baud, 8N1 on
//! every module seen so far). All configuration is carried by an explicit
//! [`SerialConfig`] value handed to the transport; nothing is read from the
//! environment.

use std::time::Duration;

use async_trait::async_trait;
use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_serial::{ClearBuffer, SerialPort, SerialPortBuilderExt, SerialStream};
use tracing::{debug, trace, warn};

use crate::{error::*, Transport};

/// Default baud rate for these modules
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Serial port configuration.
///
/// Defaults match the modules in the field: 115200 baud, 8 data bits,
/// 1 stop bit, no parity, no flow control.
#[derive(Debug, Clone)]
pub struct SerialConfig {
    /// Port path, e.g. `/dev/ttyUSB0` or `COM3`
    pub path: String,
    /// Baud rate
    pub baud_rate: u32,
    /// Data bits per character
    pub data_bits: tokio_serial::DataBits,
    /// Stop bits per character
    pub stop_bits: tokio_serial::StopBits,
    /// Parity checking
    pub parity: tokio_serial::Parity,
    /// Flow control
    pub flow_control: tokio_serial::FlowControl,
}

impl SerialConfig {
    /// Configuration for a port at the default 8N1 settings
    pub fn new(path: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            path: path.into(),
            baud_rate,
            data_bits: tokio_serial::DataBits::Eight,
            stop_bits: tokio_serial::StopBits::One,
            parity: tokio_serial::Parity::None,
            flow_control: tokio_serial::FlowControl::None,
        }
    }
}

/// Serial transport for reader modules
pub struct SerialTransport {
    config: SerialConfig,
    stream: Option<SerialStream>,
}

impl SerialTransport {
    /// Create a transport for a port at the default 8N1 settings
    pub fn new(path: impl Into<String>, baud_rate: u32) -> Self {
        Self::from_config(SerialConfig::new(path, baud_rate))
    }

    /// Create a transport from an explicit configuration
    pub fn from_config(config: SerialConfig) -> Self {
        Self {
            config,
            stream: None,
        }
    }
}

#[async_trait]
impl Transport for SerialTransport {
    async fn connect(&mut self) -> Result<()> {
        if self.is_connected() {
            return Err(Error::AlreadyConnected);
        }

        debug!(
            "Opening {} @ {} baud...",
            self.config.path, self.config.baud_rate
        );

        let stream = tokio_serial::new(self.config.path.as_str(), self.config.baud_rate)
            .data_bits(self.config.data_bits)
            .stop_bits(self.config.stop_bits)
            .parity(self.config.parity)
            .flow_control(self.config.flow_control)
            .timeout(Duration::from_millis(50))
            .open_native_async()?;

        debug!("Opened {}", self.config.path);

        self.stream = Some(stream);
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        if self.stream.take().is_some() {
            debug!("Closed {}", self.config.path);
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    async fn send(&mut self, data: &[u8]) -> Result<()> {
        let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;

        trace!("Sending {} bytes: {:02X?}", data.len(), data);

        stream.write_all(data).await?;
        stream.flush().await?;

        Ok(())
    }

    async fn read_available(&mut self) -> Result<BytesMut> {
        let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;

        // The OS driver reports how much is queued, so this never waits
        let pending = stream.bytes_to_read()? as usize;

        let mut buf = BytesMut::with_capacity(pending);
        while buf.len() < pending {
            let n = stream.read_buf(&mut buf).await?;
            if n == 0 {
                break;
            }
        }

        if !buf.is_empty() {
            trace!("Received {} bytes: {:02X?}", buf.len(), &buf[..]);
        }

        Ok(buf)
    }

    async fn discard_input(&mut self) -> Result<()> {
        let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;
        stream.clear(ClearBuffer::Input)?;
        Ok(())
    }

    fn port_name(&self) -> String {
        self.config.path.clone()
    }
}

impl Drop for SerialTransport {
    fn drop(&mut self) {
        if self.is_connected() {
            warn!("Serial transport dropped while still open");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_serial_transport_create() {
        let transport = SerialTransport::new("/dev/ttyUSB0", DEFAULT_BAUD_RATE);
        assert!(!transport.is_connected());
        assert_eq!(transport.port_name(), "/dev/ttyUSB0");
    }

    #[tokio::test]
    async fn test_send_requires_connection() {
        let mut transport = SerialTransport::new("/dev/ttyUSB0", DEFAULT_BAUD_RATE);
        let result = transport.send(&[0xBB, 0x7E]).await;
        assert!(matches!(result, Err(Error::NotConnected)));
    }

    #[tokio::test]
    async fn test_read_requires_connection() {
        let mut transport = SerialTransport::new("/dev/ttyUSB0", DEFAULT_BAUD_RATE);
        assert!(matches!(
            transport.read_available().await,
            Err(Error::NotConnected)
        ));
        assert!(matches!(
            transport.discard_input().await,
            Err(Error::NotConnected)
        ));
    }

    // Opening a real port needs hardware attached:
    // #[tokio::test]
    // async fn test_serial_transport_open() {
    //     let mut transport = SerialTransport::new("/dev/ttyUSB0", 115200);
    //     transport.connect().await.unwrap();
    //     assert!(transport.is_connected());
    //     transport.disconnect().await.unwrap();
    // }
}
