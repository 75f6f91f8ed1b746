//! Common utilities shared across the crate.
//!
//! The bits module carries the bit-level reader/writer used by the H.261
//! payload header layout and by the split-byte merging logic:
//!
//! ```rust
//! use rtpio::utils::{BitReader, BitWriter};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut writer = BitWriter::new();
//! writer.write_bits(0b101, 3);
//! writer.write_bits(0b10011, 5);
//! let bytes = writer.finish();
//!
//! let mut reader = BitReader::new(&bytes);
//! assert_eq!(reader.read_bits(3)?, 0b101);
//! # Ok(())
//! # }
//! ```

/// Bit manipulation and bitstream reading/writing utilities
pub mod bits;

pub use bits::*;
