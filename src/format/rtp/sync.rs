//! Cross-flow shared state: the clock-synchronization reference pair and
//! the running statistics counters.
//!
//! This is the only state touched by both the data-packet flow and the
//! RTCP flow, so it lives behind one lock per session. The lock is held
//! only across the read-modify-write of the reference pair or counters,
//! never across header encode/decode.

use super::stats::StreamStats;
use parking_lot::Mutex;

/// The latest (absolute time, presentation time) pair from a received
/// sender report.
///
/// An external coordinator reads this from each stream to align
/// independent audio/video timelines; the engine only supplies the pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncReference {
    /// NTP time as a 64-bit fixed-point value
    pub ntp_time: u64,
    /// Presentation time in RTP clock units at that instant
    pub pts: u64,
}

#[derive(Debug, Default)]
struct Shared {
    reference: Option<SyncReference>,
    stats: StreamStats,
}

/// Mutex-guarded store for the sync reference and statistics counters.
#[derive(Debug, Default)]
pub struct SyncStore {
    shared: Mutex<Shared>,
}

impl SyncStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites the reference pair; called on each received sender report.
    pub fn set_reference(&self, ntp_time: u64, pts: u64) {
        self.shared.lock().reference = Some(SyncReference { ntp_time, pts });
    }

    /// Returns the latest reference pair, if any sender report arrived yet.
    pub fn reference(&self) -> Option<SyncReference> {
        self.shared.lock().reference
    }

    /// Returns a snapshot of the running statistics.
    pub fn stats(&self) -> StreamStats {
        self.shared.lock().stats.clone()
    }

    /// Applies a mutation to the statistics under the lock and returns the
    /// updated snapshot.
    pub fn update_stats<F>(&self, f: F) -> StreamStats
    where
        F: FnOnce(&mut StreamStats),
    {
        let mut shared = self.shared.lock();
        f(&mut shared.stats);
        shared.stats.clone()
    }

    /// Clears both the reference pair and the counters.
    pub fn reset(&self) {
        let mut shared = self.shared.lock();
        shared.reference = None;
        shared.stats = StreamStats::default();
    }
}
