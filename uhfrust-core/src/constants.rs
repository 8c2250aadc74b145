//! Protocol constants

/// Frame start sentinel
pub const FRAME_START: u8 = 0xBB;

/// Frame end sentinel
pub const FRAME_END: u8 = 0x7E;

/// Smallest structurally valid frame: START + ADDR + CMD + LEN(2) + CHECK + END
pub const MIN_FRAME_SIZE: usize = 7;

/// Fixed bytes around the DATA field
pub const FRAME_OVERHEAD: usize = 7;

/// DATA length must fit the 16-bit LEN field
pub const MAX_PAYLOAD_SIZE: usize = u16::MAX as usize;

/// Offset of the first DATA byte within a frame
pub const DATA_OFFSET: usize = 5;

/// Broadcast / default device address
pub const DEFAULT_ADDRESS: u8 = 0x00;

/// First payload byte of a successful set-power reply
pub const STATUS_OK: u8 = 0x00;
