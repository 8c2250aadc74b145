//! # uhfrust
//!
//! Driver for UHF RFID reader modules speaking the `0xBB ... 0x7E` serial
//! framing protocol.
//!
//! ## Features
//!
//! - Frame codec with both checksum policies the modules use in the field
//! - Tolerant re-synchronization over noisy/partial serial reads
//! - Bounded inventory rounds with EPC deduplication
//! - Get/set transmit power with read-back confirmation
//! - Address/policy probing for undocumented modules
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//! use uhfrust::Reader;
//!
//! #[tokio::main]
//! async fn main() -> uhfrust::Result<()> {
//!     let mut reader = Reader::new("/dev/ttyUSB0", 115_200);
//!     reader.connect().await?;
//!
//!     let tags = reader.inventory_round(Duration::from_millis(400)).await?;
//!     println!("{} tag(s): {:?}", tags.len(), tags);
//!
//!     reader.disconnect().await?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod power;
pub mod probe;
pub mod reader;

// Re-exports
pub use error::{Error, Result};
pub use power::{ExchangeState, PowerExchange, PowerReport};
pub use probe::{probe_config, ProbeResult};
pub use reader::Reader;

// Re-export protocol types
pub use uhfrust_core::{ChecksumPolicy, Frame, Response, TagLayout, TagRead};
pub use uhfrust_transport::{SerialConfig, SerialTransport, Transport};
