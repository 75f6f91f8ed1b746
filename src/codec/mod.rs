//! Codec-specific payload handling.
//!
//! Most codecs ride the generic packetization path untouched; the modules
//! here exist only for codecs whose RTP payload format needs a custom
//! header.

/// H.261 payload format: header layout, fragmenter, depacketizer
pub mod h261;

pub use h261::{H261Depacketizer, H261Header, H261Packetizer};
