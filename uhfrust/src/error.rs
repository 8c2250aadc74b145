//! High-level error types

use std::time::Duration;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Core protocol error: {0}")]
    Core(#[from] uhfrust_core::Error),

    #[error("Transport error: {0}")]
    Transport(#[from] uhfrust_transport::Error),

    #[error("Reader not connected")]
    NotConnected,

    #[error("No reply to {command} within {waited:?}")]
    NoReply {
        command: &'static str,
        waited: Duration,
    },

    #[error("Unexpected reply: expected {expected}, got {command} with {payload_len} payload bytes")]
    UnexpectedReply {
        expected: &'static str,
        command: &'static str,
        payload_len: usize,
    },

    #[error("Set-power rejected by reader: status 0x{status:02X}")]
    SetPowerRejected {
        status: u8,
    },

    #[error("Power value out of range: {dbm} dBm (representable: 0.00..=655.35)")]
    PowerOutOfRange {
        dbm: f64,
    },
}

impl Error {
    /// Protocol-level failures a probe may step past while it keeps trying
    /// other address/policy hypotheses. Transport failures are not among
    /// them: a dead port will not get better on the next hypothesis.
    pub fn is_protocol_failure(&self) -> bool {
        matches!(
            self,
            Self::NoReply { .. } | Self::UnexpectedReply { .. } | Self::Core(_)
        )
    }
}
