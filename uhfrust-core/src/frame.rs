//! Frame structure and encoding/decoding
//!
//! # Frame Structure
//!
//! ```text
//! ┌───────┬───────┬───────┬────────┬────────┬──────────┬───────┬───────┐
//! │ START │ ADDR  │  CMD  │ LEN_HI │ LEN_LO │   DATA   │ CHECK │  END  │
//! │ 0xBB  │ 1 byte│ 1 byte│ 1 byte │ 1 byte │ LEN bytes│ 1 byte│ 0x7E  │
//! └───────┴───────┴───────┴────────┴────────┴──────────┴───────┴───────┘
//! ```
//!
//! LEN is big-endian. CHECK covers `ADDR | CMD | LEN_HI | LEN_LO | DATA`
//! under a caller-supplied [`ChecksumPolicy`].
//!
//! Decoding deliberately does NOT verify the check byte: a caller probing
//! an unknown device decodes the same candidate speculatively under several
//! address/policy hypotheses and calls [`verify`] separately for each.

use byteorder::{BigEndian, ByteOrder};
use bytes::{BufMut, Bytes, BytesMut};
use std::fmt;
use tracing::trace;

use crate::{
    checksum::ChecksumPolicy,
    command,
    constants::{
        DATA_OFFSET, FRAME_END, FRAME_OVERHEAD, FRAME_START, MAX_PAYLOAD_SIZE, MIN_FRAME_SIZE,
    },
    error::{Error, Result},
};

/// An outbound frame: address, command, payload.
///
/// Immutable once constructed; [`Frame::encode`] renders it to wire bytes.
///
/// # Examples
///
/// ```
/// use uhfrust_core::{ChecksumPolicy, Frame};
///
/// let frame = Frame::new(0x00, 0x22);
/// let encoded = frame.encode(ChecksumPolicy::Sum).unwrap();
/// assert_eq!(encoded.len(), 7); // no payload
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    /// Device address
    pub address: u8,

    /// Command code
    pub command: u8,

    /// Command-specific data
    pub payload: Bytes,
}

impl Frame {
    /// Create a frame with an empty payload
    pub fn new(address: u8, command: u8) -> Self {
        Self {
            address,
            command,
            payload: Bytes::new(),
        }
    }

    /// Create a frame with a payload
    ///
    /// # Examples
    ///
    /// ```
    /// use uhfrust_core::Frame;
    ///
    /// let frame = Frame::with_payload(0x00, 0xB6, vec![0x0A, 0x28]);
    /// assert_eq!(frame.payload.len(), 2);
    /// ```
    pub fn with_payload(address: u8, command: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            address,
            command,
            payload: payload.into(),
        }
    }

    /// Check byte for this frame under the given policy.
    pub fn checksum(&self, policy: ChecksumPolicy) -> u8 {
        let mut covered = Vec::with_capacity(4 + self.payload.len());
        covered.push(self.address);
        covered.push(self.command);
        covered.extend_from_slice(&(self.payload.len() as u16).to_be_bytes());
        covered.extend_from_slice(&self.payload);
        policy.compute(&covered)
    }

    /// Encode to wire bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PayloadTooLarge`] when the payload does not fit the
    /// 16-bit LEN field. Always succeeds otherwise.
    pub fn encode(&self, policy: ChecksumPolicy) -> Result<BytesMut> {
        if self.payload.len() > MAX_PAYLOAD_SIZE {
            return Err(Error::PayloadTooLarge {
                size: self.payload.len(),
                max: MAX_PAYLOAD_SIZE,
            });
        }

        let mut buf = BytesMut::with_capacity(FRAME_OVERHEAD + self.payload.len());
        buf.put_u8(FRAME_START);
        buf.put_u8(self.address);
        buf.put_u8(self.command);
        buf.put_u16(self.payload.len() as u16);
        buf.put_slice(&self.payload);

        // Covered region sits between the start sentinel and the check byte
        let check = policy.compute(&buf[1..]);
        buf.put_u8(check);
        buf.put_u8(FRAME_END);

        trace!(
            command = command::name(self.command),
            address = self.address,
            payload_len = self.payload.len(),
            policy = %policy,
            frame = %hex::encode_upper(&buf),
            "Encoded frame"
        );

        Ok(buf)
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("address", &format!("0x{:02X}", self.address))
            .field("command", &command::name(self.command))
            .field("payload_len", &self.payload.len())
            .finish()
    }
}

/// A decoded inbound frame.
///
/// Constructed only by a successful [`decode`]; `raw` keeps the original
/// candidate bytes so the checksum can still be checked afterwards.
#[derive(Clone, PartialEq, Eq)]
pub struct Response {
    /// Device address echoed by the reader
    pub address: u8,

    /// Command code the reply answers
    pub command: u8,

    /// DATA field (possibly truncated, see [`decode`])
    pub payload: Bytes,

    /// The candidate bytes this response was decoded from
    pub raw: Bytes,
}

impl Response {
    /// LEN as declared by the frame header.
    ///
    /// May exceed `payload.len()` for a truncated candidate.
    pub fn declared_len(&self) -> usize {
        BigEndian::read_u16(&self.raw[3..5]) as usize
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("address", &format!("0x{:02X}", self.address))
            .field("command", &command::name(self.command))
            .field("payload", &hex::encode_upper(&self.payload))
            .finish()
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Response[{}](addr=0x{:02X}, len={})",
            command::name(self.command),
            self.address,
            self.payload.len()
        )
    }
}

/// Decode a single candidate frame.
///
/// The candidate normally comes from [`crate::scanner::scan`], which only
/// guarantees the sentinels; everything else is checked here.
///
/// DATA is read as the LEN bytes following the header. When the candidate
/// holds fewer bytes than LEN declares, the payload is silently truncated
/// to what is present rather than rejected: modules cut replies short, and
/// downstream consumers length-check before trusting EPC/CRC fields.
///
/// The check byte is NOT verified here; see [`verify`].
///
/// # Errors
///
/// - [`Error::FrameTooShort`] below 7 bytes
/// - [`Error::BadSentinel`] when the first byte is not `0xBB` or the last
///   is not `0x7E`
pub fn decode(candidate: &[u8]) -> Result<Response> {
    if candidate.len() < MIN_FRAME_SIZE {
        return Err(Error::FrameTooShort {
            expected: MIN_FRAME_SIZE,
            actual: candidate.len(),
        });
    }

    if candidate[0] != FRAME_START {
        return Err(Error::BadSentinel {
            index: 0,
            byte: candidate[0],
        });
    }
    let last = candidate.len() - 1;
    if candidate[last] != FRAME_END {
        return Err(Error::BadSentinel {
            index: last,
            byte: candidate[last],
        });
    }

    let address = candidate[1];
    let command = candidate[2];
    let declared = BigEndian::read_u16(&candidate[3..5]) as usize;

    let data_end = (DATA_OFFSET + declared).min(candidate.len());
    let raw = Bytes::copy_from_slice(candidate);
    let payload = raw.slice(DATA_OFFSET..data_end);

    if payload.len() < declared {
        trace!(
            command = command::name(command),
            declared,
            available = payload.len(),
            "DATA truncated by short candidate"
        );
    }

    Ok(Response {
        address,
        command,
        payload,
        raw,
    })
}

/// Verify a candidate's check byte under the given policy.
///
/// Convenience wrapper around [`ensure_checksum`]; callers probing several
/// policies call this once per hypothesis on the same candidate.
pub fn verify(candidate: &[u8], policy: ChecksumPolicy) -> bool {
    ensure_checksum(candidate, policy).is_ok()
}

/// Verify a candidate's check byte, reporting what went wrong.
///
/// The check byte position is only well-defined when the candidate is
/// exactly `7 + LEN` bytes, so truncated or overlong candidates fail as
/// [`Error::FrameTooShort`] / [`Error::BadSentinel`] before the checksum
/// itself is compared.
///
/// # Errors
///
/// [`Error::ChecksumMismatch`] when the recomputed value differs from the
/// check byte on the wire.
pub fn ensure_checksum(candidate: &[u8], policy: ChecksumPolicy) -> Result<()> {
    if candidate.len() < MIN_FRAME_SIZE {
        return Err(Error::FrameTooShort {
            expected: MIN_FRAME_SIZE,
            actual: candidate.len(),
        });
    }

    let declared = BigEndian::read_u16(&candidate[3..5]) as usize;
    let expected_len = FRAME_OVERHEAD + declared;
    if candidate.len() != expected_len {
        return Err(Error::FrameTooShort {
            expected: expected_len,
            actual: candidate.len(),
        });
    }

    let check_at = DATA_OFFSET + declared;
    let expected = policy.compute(&candidate[1..check_at]);
    let received = candidate[check_at];

    if expected != received {
        return Err(Error::ChecksumMismatch { expected, received });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_encode_decode_roundtrip() {
        let original = Frame::with_payload(0x01, 0xB6, vec![0x0A, 0x28]);
        let encoded = original.encode(ChecksumPolicy::Sum).unwrap();
        let decoded = decode(&encoded).unwrap();

        assert_eq!(decoded.address, original.address);
        assert_eq!(decoded.command, original.command);
        assert_eq!(decoded.payload, original.payload);
        assert_eq!(decoded.raw.as_ref(), encoded.as_ref());
    }

    #[test]
    fn test_encode_empty_payload() {
        let frame = Frame::new(0x00, 0x22);
        let encoded = frame.encode(ChecksumPolicy::Sum).unwrap();

        assert_eq!(encoded.len(), MIN_FRAME_SIZE);
        assert_eq!(encoded[0], FRAME_START);
        assert_eq!(encoded[encoded.len() - 1], FRAME_END);
    }

    #[test]
    fn test_encode_payload_too_large() {
        let frame = Frame::with_payload(0x00, 0x22, vec![0u8; MAX_PAYLOAD_SIZE + 1]);
        let result = frame.encode(ChecksumPolicy::Sum);

        assert!(matches!(result, Err(Error::PayloadTooLarge { .. })));
    }

    #[test]
    fn test_checksum_policies_disagree_on_wire() {
        let frame = Frame::with_payload(0x01, 0xB7, vec![0x03, 0x05]);
        let sum = frame.encode(ChecksumPolicy::Sum).unwrap();
        let xor = frame.encode(ChecksumPolicy::Xor).unwrap();

        // Same frame body, different check byte
        assert_eq!(sum[..sum.len() - 2], xor[..xor.len() - 2]);
        assert_ne!(sum[sum.len() - 2], xor[xor.len() - 2]);
    }

    #[test]
    fn test_decode_too_short() {
        for len in 0..MIN_FRAME_SIZE {
            let buf = vec![0xBB; len];
            assert!(matches!(
                decode(&buf),
                Err(Error::FrameTooShort { .. })
            ));
        }
    }

    #[test]
    fn test_decode_bad_start_sentinel() {
        let mut encoded = Frame::new(0x00, 0x22).encode(ChecksumPolicy::Sum).unwrap();
        encoded[0] = 0xAA;

        match decode(&encoded) {
            Err(Error::BadSentinel { index: 0, byte: 0xAA }) => {}
            other => panic!("expected BadSentinel at 0, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_bad_end_sentinel() {
        let mut encoded = Frame::new(0x00, 0x22).encode(ChecksumPolicy::Sum).unwrap();
        let last = encoded.len() - 1;
        encoded[last] = 0x00;

        match decode(&encoded) {
            Err(Error::BadSentinel { index, byte: 0x00 }) if index == last => {}
            other => panic!("expected BadSentinel at end, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_truncated_data_is_tolerated() {
        // Header declares 8 DATA bytes but only 2 are present
        let candidate = [0xBB, 0x00, 0x22, 0x00, 0x08, 0x11, 0x22, 0x7E];
        let decoded = decode(&candidate).unwrap();

        assert_eq!(decoded.declared_len(), 8);
        assert_eq!(decoded.payload.as_ref(), &[0x11, 0x22, 0x7E]);
    }

    #[test]
    fn test_decode_does_not_check_checksum() {
        let mut encoded = Frame::with_payload(0x00, 0xB7, vec![0x0A, 0x28])
            .encode(ChecksumPolicy::Sum)
            .unwrap();
        let check_at = encoded.len() - 2;
        encoded[check_at] ^= 0xFF;

        assert!(decode(&encoded).is_ok());
        assert!(!verify(&encoded, ChecksumPolicy::Sum));
    }

    #[test]
    fn test_verify_both_policies() {
        let frame = Frame::with_payload(0x01, 0xB6, vec![0x0A, 0x28]);

        for policy in [ChecksumPolicy::Sum, ChecksumPolicy::Xor] {
            let encoded = frame.encode(policy).unwrap();
            assert!(verify(&encoded, policy), "self-consistency under {policy}");
        }
    }

    #[test]
    fn test_ensure_checksum_mismatch() {
        let mut encoded = Frame::new(0x00, 0x22).encode(ChecksumPolicy::Sum).unwrap();
        let check_at = encoded.len() - 2;
        encoded[check_at] = encoded[check_at].wrapping_add(1);

        assert!(matches!(
            ensure_checksum(&encoded, ChecksumPolicy::Sum),
            Err(Error::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_ensure_checksum_rejects_truncated() {
        // Declared LEN does not match the physical length
        let candidate = [0xBB, 0x00, 0x22, 0x00, 0x08, 0x11, 0x22, 0x7E];
        assert!(!verify(&candidate, ChecksumPolicy::Sum));
    }

    proptest! {
        #[test]
        fn prop_roundtrip(
            address: u8,
            cmd: u8,
            payload in proptest::collection::vec(any::<u8>(), 0..512),
            use_sum: bool,
        ) {
            let policy = if use_sum { ChecksumPolicy::Sum } else { ChecksumPolicy::Xor };
            let frame = Frame::with_payload(address, cmd, payload.clone());
            let encoded = frame.encode(policy).unwrap();
            let decoded = decode(&encoded).unwrap();

            prop_assert_eq!(decoded.address, address);
            prop_assert_eq!(decoded.command, cmd);
            prop_assert_eq!(decoded.payload.as_ref(), payload.as_slice());
            prop_assert!(verify(&encoded, policy));
        }

        #[test]
        fn prop_single_byte_flip_breaks_verify(
            address: u8,
            cmd: u8,
            payload in proptest::collection::vec(any::<u8>(), 0..64),
            flip_at in any::<usize>(),
            flip_bits in 1u8..=255,
        ) {
            let frame = Frame::with_payload(address, cmd, payload);
            let mut encoded = frame.encode(ChecksumPolicy::Sum).unwrap();

            // Flip anywhere the checksum covers, or the check byte itself;
            // the sentinels are outside checksum coverage by construction.
            let at = 1 + flip_at % (encoded.len() - 2);
            encoded[at] ^= flip_bits;

            prop_assert!(!verify(&encoded, ChecksumPolicy::Sum));
        }
    }
}
