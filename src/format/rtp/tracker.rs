//! Wraparound-safe expansion of the 16-bit sequence number and 32-bit
//! timestamp fields into monotone 64-bit logical values.
//!
//! The far end's counters wrap; the network reorders and duplicates. The
//! trackers here keep a logical 64-bit view that survives both, without
//! mistaking a lone out-of-order packet near the wrap boundary for a
//! genuine wraparound.

/// Consecutive wrap-candidate observations required before an epoch shift
/// is committed. A lone reordered packet resets the count.
pub const WRAP_CONFIRMATIONS: u32 = 2;

/// Consistent observations of a new SSRC required before the timestamp
/// tracker adopts it and reports a source change.
pub const SOURCE_CHANGE_THRESHOLD: u32 = 3;

/// Expands a fixed-width wrapping counter into a 64-bit logical value.
///
/// Holds the last raw value, the accumulated epoch shift, and a
/// consecutive-wrap-candidate count. A candidate (raw value numerically
/// smaller than the last by more than half the value space, i.e. a small
/// forward distance that crosses zero) yields a tentative next-epoch
/// logical value immediately, but the shift is only committed once
/// [`WRAP_CONFIRMATIONS`] candidates arrive in a row.
#[derive(Debug, Clone)]
pub struct OverflowTracker {
    modulus: u64,
    last_raw: u64,
    shift: u64,
    consecutive_wraps: u32,
    highest: u64,
    started: bool,
}

impl OverflowTracker {
    /// Creates a tracker for a field of the given bit width (16 or 32).
    pub fn new(bits: u32) -> Self {
        debug_assert!(bits == 16 || bits == 32);
        Self {
            modulus: 1u64 << bits,
            last_raw: 0,
            shift: 0,
            consecutive_wraps: 0,
            highest: 0,
            started: false,
        }
    }

    /// Feeds one raw observation and returns its logical 64-bit value.
    pub fn observe(&mut self, raw: u64) -> u64 {
        debug_assert!(raw < self.modulus);

        if !self.started {
            self.started = true;
            self.last_raw = raw;
            self.highest = raw;
            return raw;
        }

        let m = self.modulus;
        let half = m / 2;
        let forward = (raw + m - self.last_raw) % m;

        let logical = if forward == 0 {
            // duplicate of the newest packet
            self.consecutive_wraps = 0;
            self.shift + raw
        } else if forward <= half {
            if raw < self.last_raw {
                // forward progression that crossed zero: wrap candidate
                self.consecutive_wraps += 1;
                if self.consecutive_wraps >= WRAP_CONFIRMATIONS {
                    self.shift += m;
                    self.consecutive_wraps = 0;
                    self.last_raw = raw;
                    log::debug!("counter wraparound committed, shift now {}", self.shift);
                    self.shift + raw
                } else {
                    // tentative next-epoch value; commit deferred
                    self.shift + m + raw
                }
            } else {
                self.consecutive_wraps = 0;
                self.last_raw = raw;
                self.shift + raw
            }
        } else {
            // behind the newest packet: reordered, or a straggler from the
            // previous epoch
            self.consecutive_wraps = 0;
            if raw > self.last_raw {
                (self.shift + raw).saturating_sub(m)
            } else {
                self.shift + raw
            }
        };

        if logical > self.highest {
            self.highest = logical;
        }
        logical
    }

    /// Highest logical value observed so far.
    pub fn highest(&self) -> u64 {
        self.highest
    }

    /// Whether any observation has been fed yet.
    pub fn started(&self) -> bool {
        self.started
    }

    /// Clears all state, including the accumulated epoch shift.
    pub fn reset(&mut self) {
        self.last_raw = 0;
        self.shift = 0;
        self.consecutive_wraps = 0;
        self.highest = 0;
        self.started = false;
    }
}

/// One sequence-number observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeqObservation {
    /// Logical 64-bit sequence value
    pub logical: u64,
    /// Packets newly detected as lost by this observation
    pub lost: u64,
    /// True when this repeats the most recent sequence number
    pub duplicate: bool,
}

/// Tracks the 16-bit sequence field: expansion plus loss accounting.
///
/// Loss is the gap between the expected logical sequence (highest seen
/// plus one) and the observed one, saturating at zero — duplicates and
/// reordered packets never produce negative loss. State survives until an
/// explicit [`reset`](SequenceTracker::reset).
#[derive(Debug, Clone)]
pub struct SequenceTracker {
    counter: OverflowTracker,
    last_logical: Option<u64>,
    total_lost: u64,
}

impl SequenceTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self {
            counter: OverflowTracker::new(16),
            last_logical: None,
            total_lost: 0,
        }
    }

    /// Feeds one raw sequence number.
    pub fn observe(&mut self, raw: u16) -> SeqObservation {
        let prev_highest = if self.counter.started() {
            Some(self.counter.highest())
        } else {
            None
        };

        let logical = self.counter.observe(raw as u64);
        let duplicate = self.last_logical == Some(logical);

        let lost = match prev_highest {
            Some(h) if logical > h => logical - h - 1,
            _ => 0,
        };
        self.total_lost += lost;
        self.last_logical = Some(logical);

        SeqObservation {
            logical,
            lost,
            duplicate,
        }
    }

    /// Total packets detected as lost since the last reset.
    pub fn total_lost(&self) -> u64 {
        self.total_lost
    }

    /// Highest logical sequence observed.
    pub fn highest(&self) -> u64 {
        self.counter.highest()
    }

    /// Clears all tracking state.
    pub fn reset(&mut self) {
        self.counter = OverflowTracker::new(16);
        self.last_logical = None;
        self.total_lost = 0;
    }
}

impl Default for SequenceTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// One timestamp observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TsObservation {
    /// Logical 64-bit timestamp in RTP clock units
    pub logical: u64,
    /// True exactly once, when a source change is confirmed
    pub source_changed: bool,
}

/// Tracks the 32-bit timestamp field and the stream's source identity.
///
/// Timestamp expansion uses the same wraparound discipline as the sequence
/// tracker. On top of it sits a hysteresis score protecting source
/// identity: packets whose SSRC disagrees with the adopted one raise the
/// score (only while they keep naming the same candidate with a stable
/// payload type), agreeing packets decay it. Crossing
/// [`SOURCE_CHANGE_THRESHOLD`] adopts the candidate, resets the overflow
/// state, and reports `source_changed` exactly once — a lone corrupted
/// packet can never flip the source.
#[derive(Debug, Clone)]
pub struct TimestampTracker {
    counter: OverflowTracker,
    ssrc: Option<u32>,
    candidate_ssrc: u32,
    candidate_payload: u8,
    change_score: u32,
}

impl TimestampTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self {
            counter: OverflowTracker::new(32),
            ssrc: None,
            candidate_ssrc: 0,
            candidate_payload: 0,
            change_score: 0,
        }
    }

    /// Feeds one timestamp with the packet's SSRC and payload type.
    pub fn observe(&mut self, raw: u32, ssrc: u32, payload_type: u8) -> TsObservation {
        match self.ssrc {
            None => {
                self.ssrc = Some(ssrc);
            }
            Some(current) if current == ssrc => {
                self.change_score = self.change_score.saturating_sub(1);
            }
            Some(_) => {
                if ssrc == self.candidate_ssrc && payload_type == self.candidate_payload {
                    self.change_score += 1;
                } else {
                    self.candidate_ssrc = ssrc;
                    self.candidate_payload = payload_type;
                    self.change_score = 1;
                }

                if self.change_score >= SOURCE_CHANGE_THRESHOLD {
                    log::debug!("stream source changed to ssrc {:#010x}", ssrc);
                    self.ssrc = Some(ssrc);
                    self.change_score = 0;
                    self.counter = OverflowTracker::new(32);
                    let logical = self.counter.observe(raw as u64);
                    return TsObservation {
                        logical,
                        source_changed: true,
                    };
                }

                // Unconfirmed foreign packet: keep it out of the counter so a
                // corrupted timestamp cannot fake a wraparound.
                return TsObservation {
                    logical: self.counter.highest(),
                    source_changed: false,
                };
            }
        }

        let logical = self.counter.observe(raw as u64);
        TsObservation {
            logical,
            source_changed: false,
        }
    }

    /// The currently adopted source identifier, if any packet arrived yet.
    pub fn source(&self) -> Option<u32> {
        self.ssrc
    }

    /// Highest logical timestamp observed.
    pub fn highest(&self) -> u64 {
        self.counter.highest()
    }

    /// Clears all tracking state, including the adopted source.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for TimestampTracker {
    fn default() -> Self {
        Self::new()
    }
}
