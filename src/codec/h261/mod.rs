//! # H.261 RTP Payload Format
//!
//! H.261 predates self-framing payload formats, so every packet carries a
//! 4-byte payload header (RFC 4587) in front of the video bitstream:
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |SBIT |EBIT |I|V| GOBN  |   MBAP  |  QUANT  |  HMVD   |  VMVD   |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! SBIT/EBIT count the invalid bits at the start/end of the payload,
//! letting a frame be split at arbitrary bit positions; the depacketizer
//! merges such split bytes back together when reassembling.

mod packetizer;
mod types;

#[cfg(test)]
mod tests;

pub use packetizer::{H261Depacketizer, H261Packetizer};
pub use types::{H261Header, H261_HEADER_SIZE};
