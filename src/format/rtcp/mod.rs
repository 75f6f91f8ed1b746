//! # RTP Control Protocol (RTCP) Implementation
//!
//! The control path next to the RTP data path: sender/receiver reports,
//! source descriptions, session goodbyes, and application-defined
//! feedback — packet types 200 through 204.
//!
//! A sender report maps absolute (NTP) time to a media timestamp and
//! reports send-side packet/octet counts; the session layer folds it into
//! the synchronization store and the loss statistics. A single damaged
//! control packet parses to [`ParseError::Malformed`] and is dropped —
//! never stream-fatal.
//!
//! ## Example
//!
//! ```rust
//! use rtpio::format::rtcp::{ntp_now, RtcpPacket};
//!
//! let report = RtcpPacket::SenderReport {
//!     ssrc: 0x12345678,
//!     ntp_timestamp: ntp_now(),
//!     rtp_timestamp: 90_000,
//!     packet_count: 10,
//!     octet_count: 3000,
//!     reports: vec![],
//! };
//!
//! let wire = report.marshal();
//! let parsed = RtcpPacket::parse(&wire).unwrap();
//! assert!(matches!(parsed, RtcpPacket::SenderReport { .. }));
//! ```

use crate::error::ParseError;
use bytes::{BufMut, Bytes, BytesMut};
use std::time::{SystemTime, UNIX_EPOCH};

#[cfg(test)]
mod tests;

/// Sender report packet type.
pub const RTCP_SENDER_REPORT: u8 = 200;
/// Receiver report packet type.
pub const RTCP_RECEIVER_REPORT: u8 = 201;
/// Source description packet type.
pub const RTCP_SOURCE_DESCRIPTION: u8 = 202;
/// Goodbye packet type.
pub const RTCP_BYE: u8 = 203;
/// Application-defined packet type.
pub const RTCP_APP: u8 = 204;

/// Seconds between the NTP epoch (1900) and the Unix epoch (1970).
const NTP_UNIX_OFFSET_SECS: u64 = 2_208_988_800;

/// Source description item types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SdesItemType {
    /// Chunk terminator
    End,
    /// Canonical endpoint name
    Cname,
    /// Human-readable name
    Name,
    /// Email address
    Email,
    /// Phone number
    Phone,
    /// Geographic location
    Loc,
    /// Tool name and version
    Tool,
    /// Transient note
    Note,
    /// Private extension
    Priv,
    /// Anything outside the defined range
    Unknown(u8),
}

impl From<u8> for SdesItemType {
    fn from(value: u8) -> Self {
        match value {
            0 => SdesItemType::End,
            1 => SdesItemType::Cname,
            2 => SdesItemType::Name,
            3 => SdesItemType::Email,
            4 => SdesItemType::Phone,
            5 => SdesItemType::Loc,
            6 => SdesItemType::Tool,
            7 => SdesItemType::Note,
            8 => SdesItemType::Priv,
            other => SdesItemType::Unknown(other),
        }
    }
}

impl From<SdesItemType> for u8 {
    fn from(value: SdesItemType) -> Self {
        match value {
            SdesItemType::End => 0,
            SdesItemType::Cname => 1,
            SdesItemType::Name => 2,
            SdesItemType::Email => 3,
            SdesItemType::Phone => 4,
            SdesItemType::Loc => 5,
            SdesItemType::Tool => 6,
            SdesItemType::Note => 7,
            SdesItemType::Priv => 8,
            SdesItemType::Unknown(other) => other,
        }
    }
}

/// One {type, text} entry of a source description chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdesItem {
    /// Item type
    pub item_type: SdesItemType,
    /// Item text (UTF-8, lossily decoded on parse)
    pub text: String,
}

/// One source description chunk: a source and its items, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdesChunk {
    /// Source the items describe
    pub ssrc: u32,
    /// Items in wire order
    pub items: Vec<SdesItem>,
}

/// Reception statistics block carried in sender/receiver reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceptionReport {
    /// SSRC of the source this report is about
    pub ssrc: u32,
    /// Fraction of packets lost since the previous report, 8-bit fixed
    /// point
    pub fraction_lost: u8,
    /// Cumulative packets lost (24 bits on the wire)
    pub packets_lost: u32,
    /// Extended highest sequence number received
    pub highest_seq: u32,
    /// Interarrival jitter estimate
    pub jitter: u32,
    /// Middle 32 bits of the last sender report's NTP timestamp
    pub last_sr: u32,
    /// Delay since that sender report, in 1/65536 seconds
    pub delay_last_sr: u32,
}

/// An RTCP packet, one variant per packet type 200–204.
#[derive(Debug, Clone, PartialEq)]
pub enum RtcpPacket {
    /// Sender report: transmission stats plus reception blocks
    SenderReport {
        /// Reporting source
        ssrc: u32,
        /// Absolute time as 64-bit NTP fixed point
        ntp_timestamp: u64,
        /// Media timestamp corresponding to the NTP timestamp
        rtp_timestamp: u32,
        /// Packets sent so far
        packet_count: u32,
        /// Payload octets sent so far
        octet_count: u32,
        /// Reception blocks for sources this sender receives from
        reports: Vec<ReceptionReport>,
    },

    /// Receiver report: reception blocks only
    ReceiverReport {
        /// Reporting source
        ssrc: u32,
        /// Reception blocks
        reports: Vec<ReceptionReport>,
    },

    /// Source description
    SourceDescription {
        /// Chunks in wire order
        chunks: Vec<SdesChunk>,
    },

    /// Goodbye
    Goodbye {
        /// Sources leaving the session
        sources: Vec<u32>,
        /// Optional reason text
        reason: Option<String>,
    },

    /// Application-defined feedback; the payload is opaque to the engine
    ApplicationDefined {
        /// Originating source
        ssrc: u32,
        /// 5-bit subtype from the count field
        subtype: u8,
        /// Four-character name
        name: [u8; 4],
        /// Application-specific data (multiple of 4 bytes)
        data: Bytes,
    },
}

impl RtcpPacket {
    /// Parses one RTCP packet from raw bytes.
    ///
    /// # Errors
    ///
    /// [`ParseError::Malformed`] for truncated packets, a length field
    /// inconsistent with the payload, or an unknown packet type;
    /// [`ParseError::UnsupportedVersion`] for a version other than 2.
    pub fn parse(data: &[u8]) -> Result<Self, ParseError> {
        if data.len() < 4 {
            return Err(ParseError::Malformed("truncated RTCP header"));
        }

        let first_byte = data[0];
        let packet_type = data[1];

        let version = (first_byte >> 6) & 0x03;
        if version != 2 {
            return Err(ParseError::UnsupportedVersion(version));
        }

        let padding = (first_byte & 0x20) != 0;
        let count = first_byte & 0x1f;

        let length_words = u16::from_be_bytes([data[2], data[3]]) as usize;
        let packet_len = (length_words + 1) * 4;
        if data.len() < packet_len {
            return Err(ParseError::Malformed("RTCP length field overruns packet"));
        }
        let data = &data[..packet_len];

        let payload_end = if padding {
            let pad = data[packet_len - 1] as usize;
            if pad == 0 || pad > packet_len - 4 {
                return Err(ParseError::Malformed("invalid RTCP padding length"));
            }
            packet_len - pad
        } else {
            packet_len
        };

        let mut offset = 4;

        match packet_type {
            RTCP_SENDER_REPORT => {
                if payload_end < offset + 24 {
                    return Err(ParseError::Malformed("truncated sender report"));
                }

                let ssrc = read_u32(data, &mut offset);
                let ntp_msw = read_u32(data, &mut offset);
                let ntp_lsw = read_u32(data, &mut offset);
                let ntp_timestamp = ((ntp_msw as u64) << 32) | (ntp_lsw as u64);
                let rtp_timestamp = read_u32(data, &mut offset);
                let packet_count = read_u32(data, &mut offset);
                let octet_count = read_u32(data, &mut offset);

                let reports = parse_report_blocks(data, &mut offset, payload_end, count)?;

                Ok(RtcpPacket::SenderReport {
                    ssrc,
                    ntp_timestamp,
                    rtp_timestamp,
                    packet_count,
                    octet_count,
                    reports,
                })
            }
            RTCP_RECEIVER_REPORT => {
                if payload_end < offset + 4 {
                    return Err(ParseError::Malformed("truncated receiver report"));
                }

                let ssrc = read_u32(data, &mut offset);
                let reports = parse_report_blocks(data, &mut offset, payload_end, count)?;

                Ok(RtcpPacket::ReceiverReport { ssrc, reports })
            }
            RTCP_SOURCE_DESCRIPTION => {
                let mut chunks = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    if payload_end < offset + 4 {
                        return Err(ParseError::Malformed("truncated SDES chunk"));
                    }
                    let ssrc = read_u32(data, &mut offset);

                    let mut items = Vec::new();
                    loop {
                        if offset >= payload_end {
                            return Err(ParseError::Malformed("unterminated SDES chunk"));
                        }
                        let item_type = data[offset];
                        offset += 1;
                        if item_type == 0 {
                            // chunk ends; padding realigns to a word boundary
                            while offset % 4 != 0 {
                                if offset >= payload_end {
                                    break;
                                }
                                offset += 1;
                            }
                            break;
                        }

                        if offset >= payload_end {
                            return Err(ParseError::Malformed("truncated SDES item"));
                        }
                        let len = data[offset] as usize;
                        offset += 1;
                        if offset + len > payload_end {
                            return Err(ParseError::Malformed("SDES item overruns packet"));
                        }
                        let text =
                            String::from_utf8_lossy(&data[offset..offset + len]).into_owned();
                        offset += len;

                        items.push(SdesItem {
                            item_type: SdesItemType::from(item_type),
                            text,
                        });
                    }

                    chunks.push(SdesChunk { ssrc, items });
                }

                Ok(RtcpPacket::SourceDescription { chunks })
            }
            RTCP_BYE => {
                let mut sources = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    if payload_end < offset + 4 {
                        return Err(ParseError::Malformed("truncated BYE source list"));
                    }
                    sources.push(read_u32(data, &mut offset));
                }

                let reason = if offset < payload_end {
                    let len = data[offset] as usize;
                    offset += 1;
                    if offset + len > payload_end {
                        return Err(ParseError::Malformed("BYE reason overruns packet"));
                    }
                    Some(String::from_utf8_lossy(&data[offset..offset + len]).into_owned())
                } else {
                    None
                };

                Ok(RtcpPacket::Goodbye { sources, reason })
            }
            RTCP_APP => {
                if payload_end < offset + 8 {
                    return Err(ParseError::Malformed("truncated APP packet"));
                }
                let ssrc = read_u32(data, &mut offset);
                let name = [
                    data[offset],
                    data[offset + 1],
                    data[offset + 2],
                    data[offset + 3],
                ];
                offset += 4;

                Ok(RtcpPacket::ApplicationDefined {
                    ssrc,
                    subtype: count,
                    name,
                    data: Bytes::copy_from_slice(&data[offset..payload_end]),
                })
            }
            _ => Err(ParseError::Malformed("unknown RTCP packet type")),
        }
    }

    /// Serializes the packet; the length field always matches the output.
    pub fn marshal(&self) -> Bytes {
        match self {
            RtcpPacket::SenderReport {
                ssrc,
                ntp_timestamp,
                rtp_timestamp,
                packet_count,
                octet_count,
                reports,
            } => {
                let words = 6 + 6 * reports.len();
                let mut buf = prefix(reports.len() as u8, RTCP_SENDER_REPORT, words);
                buf.put_u32(*ssrc);
                buf.put_u64(*ntp_timestamp);
                buf.put_u32(*rtp_timestamp);
                buf.put_u32(*packet_count);
                buf.put_u32(*octet_count);
                for report in reports {
                    marshal_report_block(&mut buf, report);
                }
                buf.freeze()
            }
            RtcpPacket::ReceiverReport { ssrc, reports } => {
                let words = 1 + 6 * reports.len();
                let mut buf = prefix(reports.len() as u8, RTCP_RECEIVER_REPORT, words);
                buf.put_u32(*ssrc);
                for report in reports {
                    marshal_report_block(&mut buf, report);
                }
                buf.freeze()
            }
            RtcpPacket::SourceDescription { chunks } => {
                let mut body = BytesMut::new();
                for chunk in chunks {
                    body.put_u32(chunk.ssrc);
                    for item in &chunk.items {
                        body.put_u8(u8::from(item.item_type));
                        body.put_u8(item.text.len() as u8);
                        body.put_slice(item.text.as_bytes());
                    }
                    body.put_u8(0);
                    while body.len() % 4 != 0 {
                        body.put_u8(0);
                    }
                }

                let mut buf = prefix(chunks.len() as u8, RTCP_SOURCE_DESCRIPTION, body.len() / 4);
                buf.extend_from_slice(&body);
                buf.freeze()
            }
            RtcpPacket::Goodbye { sources, reason } => {
                let mut body = BytesMut::new();
                for source in sources {
                    body.put_u32(*source);
                }
                if let Some(reason) = reason {
                    body.put_u8(reason.len() as u8);
                    body.put_slice(reason.as_bytes());
                    while body.len() % 4 != 0 {
                        body.put_u8(0);
                    }
                }

                let mut buf = prefix(sources.len() as u8, RTCP_BYE, body.len() / 4);
                buf.extend_from_slice(&body);
                buf.freeze()
            }
            RtcpPacket::ApplicationDefined {
                ssrc,
                subtype,
                name,
                data,
            } => {
                let padded = (data.len() + 3) / 4 * 4;
                let mut buf = prefix(*subtype, RTCP_APP, 2 + padded / 4);
                buf.put_u32(*ssrc);
                buf.put_slice(name);
                buf.put_slice(data);
                for _ in data.len()..padded {
                    buf.put_u8(0);
                }
                buf.freeze()
            }
        }
    }

    /// The wire packet type code of this variant.
    pub fn packet_type(&self) -> u8 {
        match self {
            RtcpPacket::SenderReport { .. } => RTCP_SENDER_REPORT,
            RtcpPacket::ReceiverReport { .. } => RTCP_RECEIVER_REPORT,
            RtcpPacket::SourceDescription { .. } => RTCP_SOURCE_DESCRIPTION,
            RtcpPacket::Goodbye { .. } => RTCP_BYE,
            RtcpPacket::ApplicationDefined { .. } => RTCP_APP,
        }
    }
}

/// Returns true when the datagram looks like RTCP rather than RTP.
///
/// RTCP packet types occupy 200–204, a range the 7-bit RTP payload type
/// field cannot reach, so the second octet alone distinguishes the flows
/// on a shared port.
pub fn is_rtcp(data: &[u8]) -> bool {
    data.len() >= 2 && (RTCP_SENDER_REPORT..=RTCP_APP).contains(&data[1])
}

fn read_u32(data: &[u8], offset: &mut usize) -> u32 {
    let value = u32::from_be_bytes([
        data[*offset],
        data[*offset + 1],
        data[*offset + 2],
        data[*offset + 3],
    ]);
    *offset += 4;
    value
}

fn prefix(count: u8, packet_type: u8, body_words: usize) -> BytesMut {
    let mut buf = BytesMut::with_capacity(4 + body_words * 4);
    buf.put_u8(0x80 | (count & 0x1f));
    buf.put_u8(packet_type);
    buf.put_u16(body_words as u16);
    buf
}

fn parse_report_blocks(
    data: &[u8],
    offset: &mut usize,
    payload_end: usize,
    count: u8,
) -> Result<Vec<ReceptionReport>, ParseError> {
    let mut reports = Vec::with_capacity(count as usize);
    for _ in 0..count {
        if payload_end < *offset + 24 {
            return Err(ParseError::Malformed("truncated reception report block"));
        }

        let ssrc = read_u32(data, offset);
        let word = read_u32(data, offset);
        reports.push(ReceptionReport {
            ssrc,
            fraction_lost: (word >> 24) as u8,
            packets_lost: word & 0x00ff_ffff,
            highest_seq: read_u32(data, offset),
            jitter: read_u32(data, offset),
            last_sr: read_u32(data, offset),
            delay_last_sr: read_u32(data, offset),
        });
    }
    Ok(reports)
}

fn marshal_report_block(buf: &mut BytesMut, report: &ReceptionReport) {
    buf.put_u32(report.ssrc);
    buf.put_u32(((report.fraction_lost as u32) << 24) | (report.packets_lost & 0x00ff_ffff));
    buf.put_u32(report.highest_seq);
    buf.put_u32(report.jitter);
    buf.put_u32(report.last_sr);
    buf.put_u32(report.delay_last_sr);
}

/// Current time as a 64-bit NTP fixed-point timestamp.
pub fn ntp_now() -> u64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();

    let ntp_seconds = now.as_secs() + NTP_UNIX_OFFSET_SECS;
    let ntp_fraction = ((now.subsec_nanos() as u64) << 32) / 1_000_000_000;

    (ntp_seconds << 32) | ntp_fraction
}

/// Converts an NTP fixed-point timestamp to microseconds since the NTP
/// epoch.
pub fn ntp_to_micros(ntp: u64) -> u64 {
    let seconds = ntp >> 32;
    let fraction = ntp & 0xffff_ffff;
    seconds * 1_000_000 + (fraction * 1_000_000 >> 32)
}
