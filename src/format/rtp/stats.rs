//! Per-stream health observations and the external statistics boundary.

/// Running per-stream statistics, derived from the data path and from
/// received RTCP reports.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamStats {
    /// RTP data packets received
    pub received_packets: u64,
    /// RTCP control packets received
    pub received_rtcp_packets: u64,
    /// Packets detected as lost from sequence gaps
    pub lost_packets: u64,
    /// Loss ratio over the most recent sender-report interval, 0.0..=1.0
    pub relative_loss: f32,
    /// One-way delay estimate from the most recent sender report, in
    /// microseconds
    pub end_to_end_delay_us: i64,
    /// Sender reports folded in so far
    pub sender_reports_received: u64,
    /// Source descriptions folded in so far
    pub sender_descriptions_received: u64,
    /// Latest sender description text (CNAME or NAME item)
    pub sender_description: String,
}

/// Receives statistics observations from the engine.
///
/// Push-only and best-effort: implementations must not block, and the
/// engine never depends on a sink being registered.
pub trait StatsSink: Send {
    /// Called with a fresh snapshot after loss events and RTCP updates.
    fn on_stats(&mut self, stats: &StreamStats);
}
