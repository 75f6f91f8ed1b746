//! Send-side packetization: encoded frames in, on-wire packets out.

use super::{clock_rate, is_payload_supported, payload_id_for_codec, RtpPacket};
use crate::av::{CodecId, Frame};
use crate::codec::h261::H261Packetizer;
use crate::error::PacketizeError;
use bytes::Bytes;

/// Splits outgoing frames into RTP packets for one stream.
///
/// Self-framing codecs take the generic path: the frame payload is chunked
/// at the configured cap and each chunk wrapped in one RTP header, marker
/// bit on the final chunk. H.261 goes through its dedicated fragmenter,
/// which prepends the payload header to every fragment.
///
/// The sequence number advances per packet, not per frame. Sent packet and
/// octet counters accumulate here and feed sender reports.
#[derive(Debug)]
pub struct Packetizer {
    codec: CodecId,
    payload_id: u8,
    ssrc: u32,
    clock_rate: u32,
    max_payload: usize,
    sequence: u16,
    sent_packets: u64,
    sent_octets: u64,
    h261: Option<H261Packetizer>,
}

impl Packetizer {
    /// Creates a packetizer for a codec; this is the admission point.
    ///
    /// # Errors
    ///
    /// [`PacketizeError::UnsupportedCodec`] when the codec has no send
    /// path. After construction, packetization never fails.
    pub fn new(
        codec: CodecId,
        payload_id: u8,
        ssrc: u32,
        clock_rate: u32,
        max_payload_size: usize,
    ) -> Result<Self, PacketizeError> {
        if !is_payload_supported(codec) {
            return Err(PacketizeError::UnsupportedCodec(codec));
        }

        let h261 = match codec {
            CodecId::H261 => Some(H261Packetizer::new(max_payload_size)),
            _ => None,
        };

        Ok(Self {
            codec,
            payload_id,
            ssrc,
            clock_rate,
            max_payload: max_payload_size,
            sequence: rand::random(),
            sent_packets: 0,
            sent_octets: 0,
            h261,
        })
    }

    /// Creates a packetizer with the codec's table defaults for payload id
    /// and clock rate.
    pub fn for_codec(
        codec: CodecId,
        ssrc: u32,
        max_payload_size: usize,
    ) -> Result<Self, PacketizeError> {
        Self::new(
            codec,
            payload_id_for_codec(codec),
            ssrc,
            clock_rate(codec),
            max_payload_size,
        )
    }

    /// Packetizes one frame into on-wire packets.
    ///
    /// Returns one marshaled packet per fragment; the last carries the
    /// marker bit. An empty frame produces no packets.
    pub fn packetize(&mut self, frame: &Frame) -> Vec<Bytes> {
        let timestamp = self.rtp_timestamp(frame.pts);

        let payloads: Vec<Bytes> = match &self.h261 {
            Some(fragmenter) => fragmenter.fragment(frame),
            None => frame
                .data
                .chunks(self.max_payload)
                .map(Bytes::copy_from_slice)
                .collect(),
        };

        let last = payloads.len().saturating_sub(1);
        payloads
            .into_iter()
            .enumerate()
            .map(|(i, payload)| {
                let packet = RtpPacket::new(
                    self.payload_id,
                    self.sequence,
                    timestamp,
                    self.ssrc,
                    i == last,
                    payload,
                );
                self.sequence = self.sequence.wrapping_add(1);
                self.sent_packets += 1;
                self.sent_octets += packet.payload.len() as u64;
                packet.marshal()
            })
            .collect()
    }

    /// Converts a millisecond pts to RTP timestamp units.
    pub fn rtp_timestamp(&self, pts: i64) -> u32 {
        (pts.wrapping_mul(self.clock_rate as i64) / 1000) as u32
    }

    /// The codec this packetizer was opened for.
    pub fn codec(&self) -> CodecId {
        self.codec
    }

    /// The payload id stamped on outgoing packets.
    pub fn payload_id(&self) -> u8 {
        self.payload_id
    }

    /// Overrides the payload id; meaningful only before the first frame.
    pub fn set_payload_id(&mut self, id: u8) {
        self.payload_id = id & 0x7f;
    }

    /// The local synchronization source identifier.
    pub fn ssrc(&self) -> u32 {
        self.ssrc
    }

    /// (sent packets, sent payload octets) since creation.
    pub fn sent_counters(&self) -> (u64, u64) {
        (self.sent_packets, self.sent_octets)
    }

    /// Whether any packet has been sent yet.
    pub fn has_sent(&self) -> bool {
        self.sent_packets > 0
    }
}
