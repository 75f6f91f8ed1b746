//! # Real-time Transport Protocol (RTP) Implementation
//!
//! This module carries the RTP data path:
//!
//! - RTP packet parsing and creation with an exact 12-byte header layout
//! - Wraparound-safe sequence and timestamp tracking
//! - Loss accounting and source-change detection
//! - The per-stream [`RtpSession`] tying send and receive flows together
//!
//! ## Example: Creating and Parsing RTP Packets
//!
//! ```rust
//! use rtpio::format::rtp::RtpPacket;
//! use bytes::Bytes;
//!
//! let packet = RtpPacket::new(
//!     96,            // payload type
//!     1000,          // sequence number
//!     90000,         // timestamp
//!     0x12345678,    // SSRC
//!     true,          // marker bit
//!     Bytes::from(vec![1, 2, 3, 4]),
//! );
//!
//! let wire = packet.marshal();
//! let parsed = RtpPacket::parse(&wire).unwrap();
//! assert_eq!(parsed.sequence_number, 1000);
//! ```

use crate::av::CodecId;
use crate::error::ParseError;
use bytes::{BufMut, Bytes, BytesMut};

pub mod packetizer;
pub mod session;
pub mod stats;
pub mod sync;
pub mod tracker;


pub use packetizer::Packetizer;
pub use session::{MediaChunk, Received, RtpSession};
pub use stats::{StatsSink, StreamStats};
pub use sync::{SyncReference, SyncStore};
pub use tracker::{SequenceTracker, TimestampTracker};

/// Size of the fixed RTP header in bytes.
pub const RTP_HEADER_SIZE: usize = 12;

/// The protocol version every packet carries.
pub const RTP_VERSION: u8 = 2;

/// An RTP packet: the fixed 12-byte header plus an opaque payload.
///
/// Contributing sources (CSRC) are not supported; packets carrying them
/// parse fine (the list is skipped) but the engine never emits one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtpPacket {
    /// Protocol version (always 2)
    pub version: u8,
    /// Padding flag
    pub padding: bool,
    /// Header extension flag
    pub extension: bool,
    /// CSRC count as carried on the wire
    pub csrc_count: u8,
    /// Marker bit; set on the last packet of a frame
    pub marker: bool,
    /// Payload type identifier (7 bits)
    pub payload_type: u8,
    /// Packet sequence number (wraps at 2^16)
    pub sequence_number: u16,
    /// Media timestamp (wraps at 2^32)
    pub timestamp: u32,
    /// Synchronization source identifier
    pub ssrc: u32,
    /// Packet payload data
    pub payload: Bytes,
}

impl RtpPacket {
    /// Creates a packet with the given header fields and payload.
    pub fn new(
        payload_type: u8,
        sequence_number: u16,
        timestamp: u32,
        ssrc: u32,
        marker: bool,
        payload: Bytes,
    ) -> Self {
        Self {
            version: RTP_VERSION,
            padding: false,
            extension: false,
            csrc_count: 0,
            marker,
            payload_type,
            sequence_number,
            timestamp,
            ssrc,
            payload,
        }
    }

    /// Parses an RTP packet from raw bytes.
    ///
    /// # Errors
    ///
    /// - [`ParseError::Malformed`] if fewer than 12 bytes are available or
    ///   an advertised CSRC list / header extension / padding overruns the
    ///   buffer
    /// - [`ParseError::UnsupportedVersion`] if the version field is not 2
    pub fn parse(data: &[u8]) -> Result<Self, ParseError> {
        if data.len() < RTP_HEADER_SIZE {
            return Err(ParseError::Malformed("truncated RTP header"));
        }

        let first_byte = data[0];
        let second_byte = data[1];

        let version = (first_byte >> 6) & 0x03;
        if version != RTP_VERSION {
            return Err(ParseError::UnsupportedVersion(version));
        }

        let padding = (first_byte & 0x20) != 0;
        let extension = (first_byte & 0x10) != 0;
        let csrc_count = first_byte & 0x0f;

        let marker = (second_byte & 0x80) != 0;
        let payload_type = second_byte & 0x7f;

        let sequence_number = u16::from_be_bytes([data[2], data[3]]);
        let timestamp = u32::from_be_bytes([data[4], data[5], data[6], data[7]]);
        let ssrc = u32::from_be_bytes([data[8], data[9], data[10], data[11]]);

        // CSRCs are unsupported; skip past the list to find the payload.
        let mut offset = RTP_HEADER_SIZE + csrc_count as usize * 4;
        if offset > data.len() {
            return Err(ParseError::Malformed("CSRC list overruns packet"));
        }

        if extension {
            if offset + 4 > data.len() {
                return Err(ParseError::Malformed("truncated header extension"));
            }
            let ext_words =
                u16::from_be_bytes([data[offset + 2], data[offset + 3]]) as usize;
            offset += 4 + ext_words * 4;
            if offset > data.len() {
                return Err(ParseError::Malformed("header extension overruns packet"));
            }
        }

        let payload_end = if padding {
            let pad_len = data[data.len() - 1] as usize;
            if pad_len == 0 || offset + pad_len > data.len() {
                return Err(ParseError::Malformed("invalid padding length"));
            }
            data.len() - pad_len
        } else {
            data.len()
        };

        Ok(Self {
            version,
            padding,
            extension,
            csrc_count,
            marker,
            payload_type,
            sequence_number,
            timestamp,
            ssrc,
            payload: Bytes::copy_from_slice(&data[offset..payload_end]),
        })
    }

    /// Serializes the packet to its on-wire form.
    ///
    /// The emitted header always has CSRC count 0, no extension, and no
    /// padding; inputs are pre-validated by the packetizer, so this never
    /// fails.
    pub fn marshal(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(RTP_HEADER_SIZE + self.payload.len());
        buf.put_u8(RTP_VERSION << 6);
        buf.put_u8(((self.marker as u8) << 7) | (self.payload_type & 0x7f));
        buf.put_u16(self.sequence_number);
        buf.put_u32(self.timestamp);
        buf.put_u32(self.ssrc);
        buf.extend_from_slice(&self.payload);
        buf.freeze()
    }
}

/// Returns the preferred RTP payload id for a codec.
///
/// Static assignments follow RFC 3551; codecs without a static type use
/// this crate's dynamic-range defaults, which an external negotiation step
/// normally overrides.
pub fn payload_id_for_codec(codec: CodecId) -> u8 {
    match codec {
        CodecId::Pcmu => 0,
        CodecId::Gsm => 3,
        CodecId::Pcma => 8,
        CodecId::G722 => 9,
        CodecId::Mp3 => 14,
        CodecId::Jpeg => 26,
        CodecId::H261 => 31,
        CodecId::H263 => 34,
        CodecId::H264 => 96,
        CodecId::H265 => 97,
        CodecId::Aac => 98,
        CodecId::Opus => 99,
    }
}

/// Resolves a payload id back to a codec, `None` for unknown ids.
pub fn codec_for_payload_id(id: u8) -> Option<CodecId> {
    match id {
        0 => Some(CodecId::Pcmu),
        3 => Some(CodecId::Gsm),
        8 => Some(CodecId::Pcma),
        9 => Some(CodecId::G722),
        14 => Some(CodecId::Mp3),
        26 => Some(CodecId::Jpeg),
        31 => Some(CodecId::H261),
        34 => Some(CodecId::H263),
        96 => Some(CodecId::H264),
        97 => Some(CodecId::H265),
        98 => Some(CodecId::Aac),
        99 => Some(CodecId::Opus),
        _ => None,
    }
}

/// RTP clock rate for a codec, in Hz.
///
/// Note G.722's rate is 8000 on the wire for historical compatibility even
/// though the codec samples at 16 kHz.
pub fn clock_rate(codec: CodecId) -> u32 {
    match codec {
        CodecId::Pcmu | CodecId::Gsm | CodecId::Pcma | CodecId::G722 => 8000,
        CodecId::Aac | CodecId::Opus => 48000,
        CodecId::Mp3
        | CodecId::Jpeg
        | CodecId::H261
        | CodecId::H263
        | CodecId::H264
        | CodecId::H265 => 90000,
    }
}

/// Whether the packetizer supports sending this codec.
///
/// Callers must check support before opening a send stream; `Gsm` and
/// `Jpeg` are receive-only.
pub fn is_payload_supported(codec: CodecId) -> bool {
    !matches!(codec, CodecId::Gsm | CodecId::Jpeg)
}
