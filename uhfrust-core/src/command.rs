//! Known command codes
//!
//! Only the codes this library actually drives are listed; the vendor
//! command set is much larger and device replies may carry codes not named
//! here, so the codec keeps the CMD field as a raw `u8` rather than an
//! exhaustive enum.

/// Single-shot tag inventory
pub const INVENTORY: u8 = 0x22;

/// Set transmit power (payload: centi-dBm, big-endian u16)
pub const SET_POWER: u8 = 0xB6;

/// Query transmit power (empty payload)
pub const GET_POWER: u8 = 0xB7;

/// The fixed inventory trigger as it appears on the wire:
/// address 0x00, command 0x22, zero-length payload, additive checksum 0x22.
pub const INVENTORY_TRIGGER: [u8; 7] = [0xBB, 0x00, 0x22, 0x00, 0x00, 0x22, 0x7E];

/// Human-readable name for a command code, for log output.
pub fn name(code: u8) -> &'static str {
    match code {
        INVENTORY => "INVENTORY",
        SET_POWER => "SET_POWER",
        GET_POWER => "GET_POWER",
        _ => "UNKNOWN",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::ChecksumPolicy;
    use crate::frame::Frame;

    #[test]
    fn test_trigger_matches_encoder() {
        let frame = Frame::new(0x00, INVENTORY);
        let encoded = frame.encode(ChecksumPolicy::Sum).unwrap();
        assert_eq!(&encoded[..], &INVENTORY_TRIGGER[..]);
    }

    #[test]
    fn test_names() {
        assert_eq!(name(INVENTORY), "INVENTORY");
        assert_eq!(name(SET_POWER), "SET_POWER");
        assert_eq!(name(GET_POWER), "GET_POWER");
        assert_eq!(name(0x99), "UNKNOWN");
    }
}
