//! Inventory reply interpretation
//!
//! An inventory reply's DATA field carries
//! `PC(2) | [ANT/RSSI(1)] | EPC(...) | CRC(2)`, where the single
//! antenna/RSSI byte is present on some firmware and absent on others, and
//! nothing in the frame says which. [`extract_tag`] resolves the ambiguity
//! by trying the with-antenna layout first and falling back to the
//! no-antenna layout when the first would leave an implausibly short EPC.
//! The chosen hypothesis is reported in [`TagRead::layout`] so callers can
//! audit the decision.

use std::fmt;

/// Which DATA layout [`extract_tag`] settled on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagLayout {
    /// `PC(2) | ANT(1) | EPC | CRC(2)`, preferred when plausible
    WithAntenna,
    /// `PC(2) | EPC | CRC(2)`, the fallback
    NoAntenna,
}

impl TagLayout {
    /// Bytes skipped between PC and EPC under this layout.
    fn skip(self) -> usize {
        match self {
            Self::WithAntenna => 1,
            Self::NoAntenna => 0,
        }
    }
}

/// One tag observation parsed out of an inventory reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRead {
    /// Protocol Control field
    pub pc: [u8; 2],

    /// Antenna/RSSI byte, present only under [`TagLayout::WithAntenna`]
    pub antenna: Option<u8>,

    /// EPC as uppercase hex
    pub epc: String,

    /// Trailing CRC bytes as received (not validated)
    pub crc: [u8; 2],

    /// The layout hypothesis that produced this read
    pub layout: TagLayout,
}

impl fmt::Display for TagRead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.epc)
    }
}

/// EPC under a layout hypothesis must be at least this many bytes.
const MIN_EPC_LEN: usize = 4;

/// Interpret an inventory reply payload as a tag read.
///
/// Requires at least 5 payload bytes (PC + minimal remainder). The bytes
/// after PC are tried first as `ANT(1) | EPC | CRC(2)`, then as
/// `EPC | CRC(2)`; the first hypothesis whose EPC would be at least 4 bytes
/// wins. Returns `None` when neither fits, which also covers non-inventory
/// payloads handed in by an indiscriminate caller.
///
/// # Examples
///
/// ```
/// use uhfrust_core::inventory::{extract_tag, TagLayout};
///
/// // PC | ANT | EPC(4) | CRC
/// let payload = [0x30, 0x00, 0x01, 0x12, 0x34, 0xAB, 0xCD, 0x55, 0xAA];
/// let tag = extract_tag(&payload).unwrap();
/// assert_eq!(tag.epc, "1234ABCD");
/// assert_eq!(tag.layout, TagLayout::WithAntenna);
/// ```
pub fn extract_tag(payload: &[u8]) -> Option<TagRead> {
    if payload.len() < 5 {
        return None;
    }

    let pc = [payload[0], payload[1]];
    let rest = &payload[2..];

    for layout in [TagLayout::WithAntenna, TagLayout::NoAntenna] {
        let skip = layout.skip();
        if rest.len() < skip + 3 {
            continue;
        }

        let epc = &rest[skip..rest.len() - 2];
        if epc.len() < MIN_EPC_LEN {
            continue;
        }

        let crc = [rest[rest.len() - 2], rest[rest.len() - 1]];
        let antenna = match layout {
            TagLayout::WithAntenna => Some(rest[0]),
            TagLayout::NoAntenna => None,
        };

        return Some(TagRead {
            pc,
            antenna,
            epc: hex::encode_upper(epc),
            crc,
            layout,
        });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_with_antenna_layout_preferred() {
        // PC(2) + ANT(1) + EPC(4) + CRC(2)
        let payload = [0x30, 0x00, 0xC8, 0x12, 0x34, 0xAB, 0xCD, 0x55, 0xAA];
        let tag = extract_tag(&payload).unwrap();

        assert_eq!(tag.layout, TagLayout::WithAntenna);
        assert_eq!(tag.pc, [0x30, 0x00]);
        assert_eq!(tag.antenna, Some(0xC8));
        assert_eq!(tag.epc, "1234ABCD");
        assert_eq!(tag.crc, [0x55, 0xAA]);
    }

    #[test]
    fn test_falls_back_to_no_antenna_layout() {
        // PC(2) + EPC(4) + CRC(2): antenna hypothesis would leave 3 EPC bytes
        let payload = [0x30, 0x00, 0x12, 0x34, 0xAB, 0xCD, 0x55, 0xAA];
        let tag = extract_tag(&payload).unwrap();

        assert_eq!(tag.layout, TagLayout::NoAntenna);
        assert_eq!(tag.antenna, None);
        assert_eq!(tag.epc, "1234ABCD");
    }

    #[test]
    fn test_epc_rendered_uppercase() {
        let payload = [0x30, 0x00, 0x01, 0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0x00];
        let tag = extract_tag(&payload).unwrap();
        assert_eq!(tag.epc, "DEADBEEF");
    }

    #[test]
    fn test_long_epc() {
        // Typical 96-bit EPC: PC(2) + ANT(1) + EPC(12) + CRC(2)
        let mut payload = vec![0x30, 0x00, 0x01];
        payload.extend_from_slice(&[0xE2; 12]);
        payload.extend_from_slice(&[0x55, 0xAA]);

        let tag = extract_tag(&payload).unwrap();
        assert_eq!(tag.layout, TagLayout::WithAntenna);
        assert_eq!(tag.epc.len(), 24);
        assert_eq!(tag.epc, "E2".repeat(12));
    }

    #[test]
    fn test_too_short_payload() {
        assert_eq!(extract_tag(&[]), None);
        assert_eq!(extract_tag(&[0x30, 0x00, 0x01, 0x02]), None);
    }

    #[test]
    fn test_neither_layout_plausible() {
        // 5..6 payload bytes cannot hold a 4-byte EPC under either layout
        assert_eq!(extract_tag(&[0x30, 0x00, 0x01, 0x02, 0x03]), None);
        assert_eq!(extract_tag(&[0x30, 0x00, 0x01, 0x02, 0x03, 0x04]), None);
    }

    #[test]
    fn test_seven_byte_remainder_prefers_antenna() {
        // rest = 7 bytes: antenna hypothesis leaves exactly 4 EPC bytes
        let payload = [0x30, 0x00, 0xAA, 0x01, 0x02, 0x03, 0x04, 0x55, 0x66];
        let tag = extract_tag(&payload).unwrap();
        assert_eq!(tag.layout, TagLayout::WithAntenna);
        assert_eq!(tag.epc, "01020304");
    }
}
