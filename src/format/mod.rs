//! Wire-format implementations: the RTP data path and the RTCP control path.

/// RTP packet codec, stream trackers, and the per-stream session
pub mod rtp;

/// RTCP packet codec and report handling
pub mod rtcp;

/// Destination for finished on-wire packets.
///
/// The engine assumes in-order delivery into the sink but not to the far
/// end; implementations hand the bytes to the datagram transport and must
/// never block.
pub trait PacketSink {
    /// Delivers one finished on-wire packet.
    fn deliver(&mut self, packet: &[u8]);
}

/// Test doubles for the collaborator boundaries.
pub mod tests {
    use super::*;

    /// A sink that collects delivered packets for inspection.
    #[derive(Debug, Default)]
    pub struct TestSink {
        /// Packets in delivery order
        pub packets: Vec<Vec<u8>>,
    }

    impl TestSink {
        /// Creates an empty sink.
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl PacketSink for TestSink {
        fn deliver(&mut self, packet: &[u8]) {
            self.packets.push(packet.to_vec());
        }
    }
}

pub use self::rtcp::{ReceptionReport, RtcpPacket, SdesItemType};
pub use self::rtp::{Received, RtpPacket, RtpSession, SequenceTracker, TimestampTracker};
