//! The per-stream session: one instance per logical media stream, owning
//! the send and receive state and the cross-flow shared store.

use super::packetizer::Packetizer;
use super::stats::{StatsSink, StreamStats};
use super::sync::SyncStore;
use super::tracker::{SequenceTracker, TimestampTracker};
use super::{clock_rate, payload_id_for_codec, RtpPacket};
use crate::av::{CodecId, Frame};
use crate::codec::h261::H261Depacketizer;
use crate::config::SessionConfig;
use crate::error::{PacketizeError, ParseError};
use crate::format::rtcp::{self, RtcpPacket, SdesItemType};
use crate::format::PacketSink;
use bytes::Bytes;

/// One payload chunk recovered from a received RTP packet.
#[derive(Debug, Clone)]
pub struct MediaChunk {
    /// Codec payload with any payload-specific header stripped
    pub payload: Bytes,
    /// Logical presentation timestamp in RTP clock units (wraparound
    /// expanded)
    pub pts: u64,
    /// True on the last fragment of a frame
    pub marker: bool,
    /// True exactly once when a confirmed source change reset the stream
    pub source_changed: bool,
    /// Packets newly detected as lost before this one
    pub lost: u64,
}

/// Outcome of feeding one received datagram to the session.
#[derive(Debug)]
pub enum Received {
    /// An RTP data packet carrying media payload
    Media(MediaChunk),
    /// An RTCP control packet, already folded into the session state
    Control(RtcpPacket),
}

/// A stream session: the engine's aggregate for one media stream.
///
/// The send flow calls [`packetize`](Self::packetize) and
/// [`build_sender_report`](Self::build_sender_report); the receive flow
/// calls [`receive`](Self::receive). The two flows may run on different
/// threads as long as each side stays single-threaded; everything they
/// both touch sits behind the [`SyncStore`] lock.
pub struct RtpSession {
    codec: CodecId,
    payload_id: u8,
    clock_rate: u32,
    packetizer: Packetizer,
    seq_tracker: SequenceTracker,
    ts_tracker: TimestampTracker,
    sync: SyncStore,
    depacketizer: Option<H261Depacketizer>,
    stats_sink: Option<Box<dyn StatsSink>>,
    last_sent_pts: i64,
    sender_reports_sent: u64,
    last_remote_packets: Option<u32>,
    received_at_last_report: u64,
}

impl RtpSession {
    /// Opens a session for a codec; this is where codec admission happens.
    ///
    /// # Errors
    ///
    /// [`PacketizeError::UnsupportedCodec`] when the codec cannot be
    /// packetized. Receive-only codecs never get a session.
    pub fn new(codec: CodecId, config: SessionConfig) -> Result<Self, PacketizeError> {
        let payload_id = config.payload_id.unwrap_or_else(|| payload_id_for_codec(codec));
        let rate = config.clock_rate.unwrap_or_else(|| clock_rate(codec));
        let ssrc = config.ssrc.unwrap_or_else(rand::random);

        let packetizer =
            Packetizer::new(codec, payload_id, ssrc, rate, config.max_payload_size)?;

        let depacketizer = match codec {
            CodecId::H261 => Some(H261Depacketizer::new()),
            _ => None,
        };

        Ok(Self {
            codec,
            payload_id,
            clock_rate: rate,
            packetizer,
            seq_tracker: SequenceTracker::new(),
            ts_tracker: TimestampTracker::new(),
            sync: SyncStore::new(),
            depacketizer,
            stats_sink: None,
            last_sent_pts: 0,
            sender_reports_sent: 0,
            last_remote_packets: None,
            received_at_last_report: 0,
        })
    }

    /// Overrides the payload id with an externally negotiated one.
    ///
    /// Must happen before the first frame is packetized; later calls are
    /// ignored with a warning, since remapping a live stream would
    /// desynchronize the far end.
    pub fn set_negotiated_payload_id(&mut self, id: u8) {
        if self.packetizer.has_sent() {
            log::warn!("ignoring payload id {} negotiated after first frame", id);
            return;
        }
        self.payload_id = id & 0x7f;
        self.packetizer.set_payload_id(id);
    }

    /// Packetizes one frame into on-wire packets.
    ///
    /// Never fails: codec admission already happened at
    /// [`new`](Self::new).
    pub fn packetize(&mut self, frame: &Frame) -> Vec<Bytes> {
        self.last_sent_pts = frame.pts;
        self.packetizer.packetize(frame)
    }

    /// Packetizes one frame and delivers the packets to a sink.
    pub fn packetize_into(&mut self, frame: &Frame, sink: &mut dyn PacketSink) {
        for packet in self.packetize(frame) {
            sink.deliver(&packet);
        }
    }

    /// Feeds one received datagram to the session.
    ///
    /// RTCP packets (types 200–204 in the second octet) go down the
    /// control path and are folded into the sync store and statistics;
    /// everything else parses as RTP. Errors are local to the datagram —
    /// drop it and keep the stream.
    pub fn receive(&mut self, datagram: &[u8]) -> Result<Received, ParseError> {
        if rtcp::is_rtcp(datagram) {
            self.receive_rtcp(datagram)
        } else {
            self.receive_media(datagram)
        }
    }

    fn receive_rtcp(&mut self, datagram: &[u8]) -> Result<Received, ParseError> {
        let packet = RtcpPacket::parse(datagram).map_err(|e| {
            log::warn!("dropping malformed RTCP packet: {}", e);
            e
        })?;
        log::trace!("received RTCP type {}", packet.packet_type());

        match &packet {
            RtcpPacket::SenderReport {
                ntp_timestamp,
                rtp_timestamp,
                packet_count,
                ..
            } => {
                self.sync
                    .set_reference(*ntp_timestamp, *rtp_timestamp as u64);

                let delay_us = rtcp::ntp_to_micros(rtcp::ntp_now()) as i64
                    - rtcp::ntp_to_micros(*ntp_timestamp) as i64;

                let reported = *packet_count;
                let last_remote = self.last_remote_packets.replace(reported);
                let received_before = self.received_at_last_report;

                let stats = self.sync.update_stats(|stats| {
                    stats.received_rtcp_packets += 1;
                    stats.sender_reports_received += 1;
                    stats.end_to_end_delay_us = delay_us;

                    if let Some(prev) = last_remote {
                        let sent_delta = reported.wrapping_sub(prev) as u64;
                        let recv_delta = stats.received_packets - received_before;
                        if sent_delta > 0 {
                            let loss = 1.0 - (recv_delta as f32 / sent_delta as f32);
                            stats.relative_loss = loss.clamp(0.0, 1.0);
                        }
                    }
                });
                self.received_at_last_report = stats.received_packets;
                self.push_stats(&stats);
            }
            RtcpPacket::SourceDescription { chunks } => {
                let description = chunks
                    .iter()
                    .flat_map(|chunk| chunk.items.iter())
                    .find(|item| {
                        matches!(item.item_type, SdesItemType::Cname | SdesItemType::Name)
                    })
                    .map(|item| item.text.clone());

                let stats = self.sync.update_stats(|stats| {
                    stats.received_rtcp_packets += 1;
                    stats.sender_descriptions_received += 1;
                    if let Some(description) = description {
                        stats.sender_description = description;
                    }
                });
                self.push_stats(&stats);
            }
            _ => {
                // BYE and APP are surfaced but don't move any statistics
                self.sync.update_stats(|stats| {
                    stats.received_rtcp_packets += 1;
                });
            }
        }

        Ok(Received::Control(packet))
    }

    fn receive_media(&mut self, datagram: &[u8]) -> Result<Received, ParseError> {
        let packet = RtpPacket::parse(datagram).map_err(|e| {
            log::warn!("dropping malformed RTP packet: {}", e);
            e
        })?;
        log::trace!(
            "received RTP seq={} ts={} pt={} marker={}",
            packet.sequence_number,
            packet.timestamp,
            packet.payload_type,
            packet.marker
        );

        if packet.payload_type != self.payload_id {
            log::warn!(
                "dropping packet with payload type {} (expected {})",
                packet.payload_type,
                self.payload_id
            );
            return Err(ParseError::Malformed("unexpected payload type"));
        }

        let ts = self
            .ts_tracker
            .observe(packet.timestamp, packet.ssrc, packet.payload_type);

        if !ts.source_changed && self.ts_tracker.source() != Some(packet.ssrc) {
            // foreign SSRC still below the hysteresis threshold: keep it
            // away from the sequence and loss accounting too
            log::debug!(
                "dropping packet from unconfirmed source {:#010x}",
                packet.ssrc
            );
            return Err(ParseError::Malformed("packet from unconfirmed source"));
        }

        if ts.source_changed {
            // fresh far end: sequence numbering and reassembly state are
            // meaningless across the change
            self.seq_tracker.reset();
            if let Some(depacketizer) = &mut self.depacketizer {
                depacketizer.reset();
            }
        }

        let seq = self.seq_tracker.observe(packet.sequence_number);

        let stats = self.sync.update_stats(|stats| {
            stats.received_packets += 1;
            stats.lost_packets += seq.lost;
        });
        if seq.lost > 0 {
            log::debug!("detected {} lost packets", seq.lost);
            self.push_stats(&stats);
        }

        let payload = match &mut self.depacketizer {
            Some(depacketizer) => depacketizer.depacketize(&packet.payload, packet.marker)?,
            None => packet.payload.clone(),
        };

        Ok(Received::Media(MediaChunk {
            payload,
            pts: ts.logical,
            marker: packet.marker,
            source_changed: ts.source_changed,
            lost: seq.lost,
        }))
    }

    /// Builds a sender report from the current send-side counters.
    ///
    /// Carries the current NTP time, the last packetized frame's pts in
    /// RTP clock units, and the sent packet/octet totals.
    pub fn build_sender_report(&mut self) -> Bytes {
        let (packets, octets) = self.packetizer.sent_counters();
        self.sender_reports_sent += 1;

        RtcpPacket::SenderReport {
            ssrc: self.packetizer.ssrc(),
            ntp_timestamp: rtcp::ntp_now(),
            rtp_timestamp: self.packetizer.rtp_timestamp(self.last_sent_pts),
            packet_count: packets as u32,
            octet_count: octets as u32,
            reports: Vec::new(),
        }
        .marshal()
    }

    /// Registers the statistics sink observations get pushed to.
    pub fn register_stats_sink(&mut self, sink: Box<dyn StatsSink>) {
        self.stats_sink = Some(sink);
    }

    /// The synchronization store, for cross-stream alignment.
    pub fn sync_store(&self) -> &SyncStore {
        &self.sync
    }

    /// Snapshot of the running statistics.
    pub fn stats(&self) -> StreamStats {
        self.sync.stats()
    }

    /// Packets detected as lost since the session opened.
    pub fn lost_packets(&self) -> u64 {
        self.seq_tracker.total_lost()
    }

    /// RTP data packets received so far.
    pub fn received_packets(&self) -> u64 {
        self.sync.stats().received_packets
    }

    /// RTCP control packets received so far.
    pub fn received_rtcp_packets(&self) -> u64 {
        self.sync.stats().received_rtcp_packets
    }

    /// Sender reports built so far.
    pub fn sender_reports_sent(&self) -> u64 {
        self.sender_reports_sent
    }

    /// The payload id expected on receive and stamped on send.
    pub fn payload_type(&self) -> u8 {
        self.payload_id
    }

    /// The local synchronization source identifier.
    pub fn ssrc(&self) -> u32 {
        self.packetizer.ssrc()
    }

    /// The remote source identifier, once a packet has arrived.
    pub fn remote_source(&self) -> Option<u32> {
        self.ts_tracker.source()
    }

    /// Timestamp of the most recent received packet, in RTP clock units.
    pub fn current_pts(&self) -> u64 {
        self.ts_tracker.highest()
    }

    /// The codec this session carries.
    pub fn codec(&self) -> CodecId {
        self.codec
    }

    /// The RTP clock rate in effect.
    pub fn clock_rate(&self) -> u32 {
        self.clock_rate
    }

    /// Resets all receive-side tracking state.
    ///
    /// Send-side counters survive: the far end's view of this sender
    /// doesn't change because our parser started over.
    pub fn reset(&mut self) {
        self.seq_tracker.reset();
        self.ts_tracker.reset();
        if let Some(depacketizer) = &mut self.depacketizer {
            depacketizer.reset();
        }
        self.sync.reset();
        self.last_remote_packets = None;
        self.received_at_last_report = 0;
    }

    fn push_stats(&mut self, stats: &StreamStats) {
        if let Some(sink) = &mut self.stats_sink {
            sink.on_stats(stats);
        }
    }
}

impl std::fmt::Debug for RtpSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RtpSession")
            .field("codec", &self.codec)
            .field("payload_id", &self.payload_id)
            .field("clock_rate", &self.clock_rate)
            .field("ssrc", &self.packetizer.ssrc())
            .finish()
    }
}
