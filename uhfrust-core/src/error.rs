//! Error types for uhfrust-core

/// Result type alias for protocol operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core protocol errors
///
/// Every failure is reported to the immediate caller; the core never
/// retries on its own.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Candidate is too short to be a frame
    #[error("Frame too short: expected at least {expected} bytes, got {actual} bytes")]
    FrameTooShort {
        expected: usize,
        actual: usize,
    },

    /// First or last byte is not the expected sentinel
    #[error("Bad sentinel at byte {index}: got 0x{byte:02X}")]
    BadSentinel {
        index: usize,
        byte: u8,
    },

    /// DATA does not fit the 16-bit LEN field
    #[error("Payload too large: {size} bytes (max: {max} bytes)")]
    PayloadTooLarge {
        size: usize,
        max: usize,
    },

    /// Check byte does not match the recomputed value
    #[error("Checksum mismatch: expected 0x{expected:02X}, received 0x{received:02X}")]
    ChecksumMismatch {
        expected: u8,
        received: u8,
    },
}
