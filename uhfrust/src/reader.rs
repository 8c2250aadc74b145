//! High-level reader handle

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use uhfrust_core::{command, frame, inventory, scanner, ChecksumPolicy, Frame, Response};
use uhfrust_transport::{SerialTransport, Transport};

use crate::error::{Error, Result};

/// Default wait for a single command's reply
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(800);

/// Default pause between input-buffer polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(30);

/// Handle to one UHF reader module.
///
/// Owns the transport exclusively; the protocol is strict request/response
/// with a single outstanding command, so every operation takes `&mut self`
/// and no locking is involved.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use uhfrust::Reader;
///
/// #[tokio::main]
/// async fn main() -> uhfrust::Result<()> {
///     let mut reader = Reader::new("/dev/ttyUSB0", 115_200);
///     reader.connect().await?;
///
///     let tags = reader.inventory_round(Duration::from_millis(400)).await?;
///     for epc in &tags {
///         println!("EPC: {epc}");
///     }
///
///     reader.disconnect().await?;
///     Ok(())
/// }
/// ```
pub struct Reader {
    transport: Box<dyn Transport>,
    address: u8,
    policy: ChecksumPolicy,
    timeout: Duration,
    poll_interval: Duration,
}

impl Reader {
    /// Create a reader on a serial port with default settings
    /// (address 0x00, additive checksum).
    pub fn new(path: impl Into<String>, baud_rate: u32) -> Self {
        Self::from_transport(Box::new(SerialTransport::new(path, baud_rate)))
    }

    /// Create a reader over an arbitrary transport
    pub fn from_transport(transport: Box<dyn Transport>) -> Self {
        Self {
            transport,
            address: uhfrust_core::DEFAULT_ADDRESS,
            policy: ChecksumPolicy::Sum,
            timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Set the device address used on outbound frames
    pub fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    /// Set the checksum policy for this device
    pub fn with_policy(mut self, policy: ChecksumPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the reply timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Current device address
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Current checksum policy
    pub fn policy(&self) -> ChecksumPolicy {
        self.policy
    }

    /// Re-target the handle at another device address.
    ///
    /// Address and policy together describe one device configuration
    /// hypothesis; the probe walks these between attempts.
    pub fn set_address(&mut self, address: u8) {
        self.address = address;
    }

    /// Switch the checksum policy
    pub fn set_policy(&mut self, policy: ChecksumPolicy) {
        self.policy = policy;
    }

    /// Check if the transport is open
    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    /// Open the transport
    pub async fn connect(&mut self) -> Result<()> {
        info!("Connecting to {}...", self.transport.port_name());
        self.transport.connect().await?;
        Ok(())
    }

    /// Close the transport
    pub async fn disconnect(&mut self) -> Result<()> {
        self.transport.disconnect().await?;
        info!("Disconnected from {}", self.transport.port_name());
        Ok(())
    }

    /// Send one command and wait for its reply.
    ///
    /// Pending input is discarded first so a stale reply cannot be taken
    /// for this command's. The read buffer is then polled until the first
    /// candidate decodes or the timeout elapses. No retry is attempted;
    /// the caller decides whether a failure is worth a resend.
    ///
    /// # Errors
    ///
    /// [`Error::NoReply`] when nothing decodable arrives in time.
    pub async fn transact(&mut self, command_code: u8, payload: Bytes) -> Result<Response> {
        self.transport.discard_input().await?;

        let frame = Frame::with_payload(self.address, command_code, payload);
        let encoded = frame.encode(self.policy)?;

        debug!(
            command = command::name(command_code),
            address = self.address,
            policy = %self.policy,
            "Sending command"
        );
        self.transport.send(&encoded).await?;

        let deadline = Instant::now() + self.timeout;
        let mut raw = BytesMut::new();

        loop {
            tokio::time::sleep(self.poll_interval).await;

            let chunk = self.transport.read_available().await?;
            raw.extend_from_slice(&chunk);

            if let Some(response) = self.first_decodable(&raw) {
                return Ok(response);
            }

            if Instant::now() >= deadline {
                return Err(Error::NoReply {
                    command: command::name(command_code),
                    waited: self.timeout,
                });
            }
        }
    }

    fn first_decodable(&self, raw: &[u8]) -> Option<Response> {
        for candidate in scanner::scan(raw) {
            match frame::decode(candidate) {
                Ok(response) => {
                    if !frame::verify(candidate, self.policy) {
                        // Tolerated: replies from some firmware checksum
                        // differently than they expect on ingress
                        trace!(%response, policy = %self.policy, "Reply fails checksum, accepting");
                    }
                    return Some(response);
                }
                Err(e) => debug!("Dropping malformed candidate: {e}"),
            }
        }
        None
    }

    /// Run one bounded inventory round and return the deduplicated EPC set.
    ///
    /// Sends the inventory trigger once, then accumulates everything the
    /// module streams back until `window` elapses. Only then is the buffer
    /// cut into frames and interpreted; a round never yields partial
    /// results mid-window, and there is no early exit on the first tag.
    pub async fn inventory_round(&mut self, window: Duration) -> Result<BTreeSet<String>> {
        self.transport.discard_input().await?;

        let encoded = Frame::new(self.address, command::INVENTORY).encode(self.policy)?;
        self.transport.send(&encoded).await?;

        let deadline = Instant::now() + window;
        let mut raw = BytesMut::new();

        while Instant::now() < deadline {
            tokio::time::sleep(self.poll_interval).await;
            let chunk = self.transport.read_available().await?;
            raw.extend_from_slice(&chunk);
        }

        trace!(raw = %hex::encode_upper(&raw), "Round buffer");

        let mut epcs = BTreeSet::new();
        for candidate in scanner::scan(&raw) {
            let Ok(response) = frame::decode(candidate) else {
                continue;
            };
            if let Some(tag) = inventory::extract_tag(&response.payload) {
                trace!(epc = %tag.epc, layout = ?tag.layout, "Tag read");
                epcs.insert(tag.epc);
            }
        }

        debug!(
            window_ms = window.as_millis() as u64,
            raw_len = raw.len(),
            tags = epcs.len(),
            "Inventory round complete"
        );

        Ok(epcs)
    }

    /// Run inventory rounds until `stop` is raised.
    ///
    /// Cancellation is cooperative: the flag is consulted only between
    /// rounds, never mid-round, so an in-flight round always completes and
    /// reports before the loop winds down.
    pub async fn run_polling<F>(
        &mut self,
        window: Duration,
        idle: Duration,
        stop: &AtomicBool,
        mut on_round: F,
    ) -> Result<()>
    where
        F: FnMut(u64, &BTreeSet<String>),
    {
        let mut round: u64 = 0;

        while !stop.load(Ordering::Relaxed) {
            round += 1;
            let tags = self.inventory_round(window).await?;
            on_round(round, &tags);
            tokio::time::sleep(idle).await;
        }

        info!(rounds = round, "Polling stopped");
        Ok(())
    }
}

impl Drop for Reader {
    fn drop(&mut self) {
        if self.is_connected() {
            warn!("Reader dropped while transport still open");
        }
    }
}
