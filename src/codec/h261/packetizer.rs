use super::types::{H261Header, H261_HEADER_SIZE};
use crate::av::Frame;
use crate::error::ParseError;
use bytes::{BufMut, Bytes, BytesMut};

/// Fragments H.261 frames into payloads no larger than the configured cap.
///
/// Fragments are cut at byte boundaries (SBIT/EBIT stay zero); each one
/// gets a fresh payload header. Only the fragment completing the frame is
/// meant to carry the RTP marker bit — the caller maps the last element to
/// a marked packet.
#[derive(Debug, Clone)]
pub struct H261Packetizer {
    max_payload: usize,
}

impl H261Packetizer {
    /// Creates a packetizer with the given per-packet video byte cap.
    pub fn new(max_payload: usize) -> Self {
        debug_assert!(max_payload > 0);
        Self { max_payload }
    }

    /// Splits a frame into ready-to-send payloads, header included.
    ///
    /// A frame of `n` bytes yields `ceil(n / max_payload)` fragments; an
    /// empty frame yields none.
    pub fn fragment(&self, frame: &Frame) -> Vec<Bytes> {
        let header = H261Header {
            intra: frame.is_boundary,
            motion_vectors: !frame.is_boundary,
            ..Default::default()
        };
        let raw_header = header.marshal();

        frame
            .data
            .chunks(self.max_payload)
            .map(|chunk| {
                let mut payload = BytesMut::with_capacity(H261_HEADER_SIZE + chunk.len());
                payload.put_slice(&raw_header);
                payload.put_slice(chunk);
                payload.freeze()
            })
            .collect()
    }
}

/// Reassembles fragmented H.261 payloads back into frame bytes.
///
/// Keeps the partial byte a fragment may end on (nonzero EBIT) and merges
/// it with the continuation bits at the start of the next fragment
/// (matching SBIT). State spans packets of one frame; the marker flushes
/// it.
#[derive(Debug, Default)]
pub struct H261Depacketizer {
    pending_byte: u8,
    pending_bits: u8,
}

impl H261Depacketizer {
    /// Creates a depacketizer with no pending state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Strips the payload header from one fragment and returns the video
    /// bytes, merging any byte split across the fragment boundary.
    ///
    /// `marker` is the RTP marker bit of the carrying packet; it flushes
    /// the held-back partial byte at the end of a frame.
    pub fn depacketize(&mut self, payload: &[u8], marker: bool) -> Result<Bytes, ParseError> {
        let header = H261Header::parse(payload)?;
        let mut body = &payload[H261_HEADER_SIZE..];
        let mut out = BytesMut::with_capacity(body.len() + 1);

        if self.pending_bits > 0 {
            if header.sbit == self.pending_bits && !body.is_empty() {
                // sbit is 1..=7 here, so the shift cannot overflow
                let low_mask = (1u8 << (8 - header.sbit)) - 1;
                out.put_u8(self.pending_byte | (body[0] & low_mask));
                body = &body[1..];
            } else {
                // continuation bits got lost with a dropped packet
                log::warn!(
                    "H.261 split-byte mismatch (pending {} bits, sbit {}), discarding partial byte",
                    self.pending_bits,
                    header.sbit
                );
            }
            self.pending_bits = 0;
            self.pending_byte = 0;
        }

        if header.ebit > 0 && !marker {
            if let Some((&last, rest)) = body.split_last() {
                // hold the partial byte until its continuation arrives
                let high_mask = !((1u8 << header.ebit) - 1);
                self.pending_byte = last & high_mask;
                self.pending_bits = 8 - header.ebit;
                body = rest;
            }
        }

        out.put_slice(body);

        if marker {
            self.pending_bits = 0;
            self.pending_byte = 0;
        }

        Ok(out.freeze())
    }

    /// Drops any held-back partial byte.
    pub fn reset(&mut self) {
        self.pending_byte = 0;
        self.pending_bits = 0;
    }
}
