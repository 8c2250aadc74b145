//! Transmit power exchange
//!
//! Power rides the wire as hundredths of a dBm in a big-endian u16:
//! 26.00 dBm is `0x0A 0x28`. [`Reader::get_power`] and
//! [`Reader::set_power`] are the two primitives; [`PowerExchange`] wraps
//! them into the set-then-confirm flow (get, set, get again) and tracks
//! where in that flow it is. The composite adds orchestration only; there
//! is no extra protocol state beyond the two primitives.

use byteorder::{BigEndian, ByteOrder};
use bytes::Bytes;
use tracing::{debug, info};

use uhfrust_core::{command, constants::STATUS_OK};

use crate::error::{Error, Result};
use crate::reader::Reader;

/// Convert a dBm value to the wire's centi-dBm field.
fn centi_dbm(dbm: f64) -> Result<u16> {
    let centi = (dbm * 100.0).round();
    if !(0.0..=f64::from(u16::MAX)).contains(&centi) {
        return Err(Error::PowerOutOfRange { dbm });
    }
    Ok(centi as u16)
}

impl Reader {
    /// Query the current transmit power in dBm.
    ///
    /// # Errors
    ///
    /// [`Error::UnexpectedReply`] when the reply does not echo the
    /// power-query command with exactly two payload bytes.
    pub async fn get_power(&mut self) -> Result<f64> {
        let response = self.transact(command::GET_POWER, Bytes::new()).await?;

        if response.command != command::GET_POWER || response.payload.len() != 2 {
            return Err(Error::UnexpectedReply {
                expected: command::name(command::GET_POWER),
                command: command::name(response.command),
                payload_len: response.payload.len(),
            });
        }

        let dbm = f64::from(BigEndian::read_u16(&response.payload)) / 100.0;
        debug!(dbm, "Power query");
        Ok(dbm)
    }

    /// Set the transmit power in dBm.
    ///
    /// Success requires the reply to echo the set-power command with a
    /// leading status byte of `0x00`; anything else is reported, never
    /// silently dropped.
    ///
    /// # Errors
    ///
    /// - [`Error::PowerOutOfRange`] before anything is sent
    /// - [`Error::UnexpectedReply`] on wrong command echo or empty payload
    /// - [`Error::SetPowerRejected`] on a non-ok status byte
    pub async fn set_power(&mut self, dbm: f64) -> Result<()> {
        let mut payload = [0u8; 2];
        BigEndian::write_u16(&mut payload, centi_dbm(dbm)?);

        let response = self
            .transact(command::SET_POWER, Bytes::copy_from_slice(&payload))
            .await?;

        if response.command != command::SET_POWER || response.payload.is_empty() {
            return Err(Error::UnexpectedReply {
                expected: command::name(command::SET_POWER),
                command: command::name(response.command),
                payload_len: response.payload.len(),
            });
        }

        match response.payload[0] {
            STATUS_OK => {
                info!(dbm, "Power set");
                Ok(())
            }
            status => Err(Error::SetPowerRejected { status }),
        }
    }
}

/// Where a set-then-confirm flow currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeState {
    /// Nothing in flight
    Idle,
    /// Commands are on the wire
    Requesting,
    /// Flow finished and the read-back was obtained
    Confirmed,
    /// Some step failed; the error went to the caller
    Failed,
}

/// Outcome of a confirmed set-then-verify flow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerReport {
    /// Power before the set, dBm
    pub before: f64,
    /// Requested power, dBm
    pub requested: f64,
    /// Power read back after the set, dBm
    pub after: f64,
}

impl PowerReport {
    /// Whether the read-back matches the request (to the wire's 0.01 dBm
    /// resolution).
    pub fn applied(&self) -> bool {
        (self.after - self.requested).abs() < 0.005
    }
}

/// Set-then-confirm power flow over a borrowed reader.
pub struct PowerExchange<'a> {
    reader: &'a mut Reader,
    state: ExchangeState,
}

impl<'a> PowerExchange<'a> {
    pub fn new(reader: &'a mut Reader) -> Self {
        Self {
            reader,
            state: ExchangeState::Idle,
        }
    }

    /// Current flow state
    pub fn state(&self) -> ExchangeState {
        self.state
    }

    /// Get, set, get again; compare pre/post values.
    ///
    /// Leaves the exchange `Confirmed` on success and `Failed` on any step
    /// failing; the underlying error passes through either way.
    pub async fn set_and_verify(&mut self, dbm: f64) -> Result<PowerReport> {
        self.state = ExchangeState::Requesting;

        let outcome = self.run(dbm).await;
        self.state = match outcome {
            Ok(_) => ExchangeState::Confirmed,
            Err(_) => ExchangeState::Failed,
        };

        outcome
    }

    async fn run(&mut self, dbm: f64) -> Result<PowerReport> {
        let before = self.reader.get_power().await?;
        self.reader.set_power(dbm).await?;
        let after = self.reader.get_power().await?;

        let report = PowerReport {
            before,
            requested: dbm,
            after,
        };
        info!(
            before = report.before,
            requested = report.requested,
            after = report.after,
            applied = report.applied(),
            "Power exchange confirmed"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Largest value the centi-dBm u16 field can carry
    const MAX_DBM: f64 = u16::MAX as f64 / 100.0;

    #[test]
    fn test_centi_dbm_encoding() {
        assert_eq!(centi_dbm(26.0).unwrap(), 2600);
        assert_eq!(centi_dbm(0.0).unwrap(), 0);
        assert_eq!(centi_dbm(20.514).unwrap(), 2051); // rounds
    }

    #[test]
    fn test_centi_dbm_wire_bytes() {
        let mut payload = [0u8; 2];
        BigEndian::write_u16(&mut payload, centi_dbm(26.0).unwrap());
        assert_eq!(payload, [0x0A, 0x28]);
    }

    #[test]
    fn test_centi_dbm_out_of_range() {
        assert!(matches!(
            centi_dbm(-1.0),
            Err(Error::PowerOutOfRange { .. })
        ));
        assert!(matches!(
            centi_dbm(MAX_DBM + 1.0),
            Err(Error::PowerOutOfRange { .. })
        ));
    }

    #[test]
    fn test_report_applied_tolerance() {
        let report = PowerReport {
            before: 20.0,
            requested: 26.0,
            after: 26.0,
        };
        assert!(report.applied());

        let off = PowerReport { after: 25.5, ..report };
        assert!(!off.applied());
    }
}
