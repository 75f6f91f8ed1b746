//! Per-session configuration.
//!
//! Everything that was tunable process-wide in older transport stacks (most
//! notably the fragment cap for the H.261 packetizer) is an explicit field
//! here, set at session construction.

use std::env;

/// Default maximum payload size per packet, in bytes.
///
/// Conservative sub-MTU value leaving room for the RTP header and the
/// transport's own overhead.
pub const DEFAULT_MAX_PAYLOAD_SIZE: usize = 1280;

/// Configuration for one [`RtpSession`](crate::format::rtp::RtpSession).
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Maximum payload bytes per packet; fragment cap for the H.261 path
    /// and chunk size for the generic path
    pub max_payload_size: usize,
    /// RTP clock rate override; `None` uses the codec's default rate
    pub clock_rate: Option<u32>,
    /// Fixed local SSRC; `None` generates a random one
    pub ssrc: Option<u32>,
    /// Externally negotiated payload id (e.g. from SDP); `None` uses the
    /// static table
    pub payload_id: Option<u8>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        // RTPIO_MAX_PAYLOAD_SIZE overrides the built-in cap, mirroring how
        // deployments tuned this knob before it became per-session state.
        let max_payload_size = env::var("RTPIO_MAX_PAYLOAD_SIZE")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|&v| v > 0)
            .unwrap_or(DEFAULT_MAX_PAYLOAD_SIZE);

        Self {
            max_payload_size,
            clock_rate: None,
            ssrc: None,
            payload_id: None,
        }
    }
}

impl SessionConfig {
    /// Creates a config with the built-in defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum payload size per packet.
    pub fn with_max_payload_size(mut self, size: usize) -> Self {
        self.max_payload_size = size;
        self
    }

    /// Overrides the RTP clock rate.
    pub fn with_clock_rate(mut self, rate: u32) -> Self {
        self.clock_rate = Some(rate);
        self
    }

    /// Pins the local SSRC instead of generating a random one.
    pub fn with_ssrc(mut self, ssrc: u32) -> Self {
        self.ssrc = Some(ssrc);
        self
    }

    /// Sets the externally negotiated payload id.
    pub fn with_payload_id(mut self, id: u8) -> Self {
        self.payload_id = Some(id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_chain() {
        let config = SessionConfig::new()
            .with_max_payload_size(512)
            .with_clock_rate(90000)
            .with_ssrc(0xdecafbad)
            .with_payload_id(96);

        assert_eq!(config.max_payload_size, 512);
        assert_eq!(config.clock_rate, Some(90000));
        assert_eq!(config.ssrc, Some(0xdecafbad));
        assert_eq!(config.payload_id, Some(96));
    }
}
