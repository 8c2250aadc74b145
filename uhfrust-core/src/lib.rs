//! # uhfrust-core
//!
//! Core protocol implementation for UHF RFID reader modules speaking the
//! `0xBB ... 0x7E` serial framing.
//!
//! This crate provides the transport-independent protocol primitives:
//! - Frame structure and encoding/decoding
//! - The two checksum policies (additive sum, XOR)
//! - Candidate extraction from noisy/partial read buffers
//! - Inventory reply interpretation (EPC extraction)
//! - Known command codes

pub mod checksum;
pub mod command;
pub mod constants;
pub mod error;
pub mod frame;
pub mod inventory;
pub mod scanner;

pub use checksum::ChecksumPolicy;
pub use error::{Error, Result};
pub use frame::{Frame, Response};
pub use inventory::{TagLayout, TagRead};

pub use constants::{DEFAULT_ADDRESS, FRAME_END, FRAME_START, MAX_PAYLOAD_SIZE, MIN_FRAME_SIZE};
