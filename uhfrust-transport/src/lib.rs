//! Transport layer for UHF RFID reader modules
//!
//! The protocol core is transport-independent; this crate defines the byte
//! transport it runs over and provides the serial-port implementation the
//! readers actually use.

pub mod error;
pub mod serial;

pub use error::{Error, Result};
pub use serial::{SerialConfig, SerialTransport, DEFAULT_BAUD_RATE};

use async_trait::async_trait;
use bytes::BytesMut;

/// Byte transport to a reader module.
///
/// The protocol is strict request/response with a single outstanding
/// command; exclusive `&mut` ownership of the transport replaces any
/// locking. Reads are non-blocking ([`Transport::read_available`]) because
/// the polling loop owns its own timing: it accumulates whatever has
/// arrived and decides itself when a window or timeout has elapsed.
#[async_trait]
pub trait Transport: Send {
    /// Open the transport
    async fn connect(&mut self) -> Result<()>;

    /// Close the transport
    async fn disconnect(&mut self) -> Result<()>;

    /// Check if open
    fn is_connected(&self) -> bool;

    /// Write raw bytes and flush
    async fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Return whatever bytes have arrived since the last call.
    ///
    /// Never blocks waiting for data; an empty buffer means nothing new.
    async fn read_available(&mut self) -> Result<BytesMut>;

    /// Drop any pending unread input.
    ///
    /// Called before an exchange so stale reply bytes from an earlier
    /// command cannot be correlated with the new one.
    async fn discard_input(&mut self) -> Result<()>;

    /// Describe the endpoint (port path) for log output
    fn port_name(&self) -> String;
}
