//! Core media types shared between the send and receive flows.
//!
//! The engine never looks inside an encoded payload beyond what
//! fragmentation requires; a [`Frame`] is an opaque byte buffer tagged with
//! a [`CodecId`] and a presentation timestamp.

/// Identifies the codec an encoded payload belongs to.
///
/// The set mirrors the payload formats the transport layer knows how to
/// carry. `Gsm` and `Jpeg` are recognized on the receive side but have no
/// packetizer, so opening a send stream for them fails admission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodecId {
    /// G.711 µ-law audio
    Pcmu,
    /// GSM 06.10 audio (receive only)
    Gsm,
    /// G.711 A-law audio
    Pcma,
    /// G.722 wideband audio
    G722,
    /// MPEG audio (MP3)
    Mp3,
    /// Motion JPEG video (receive only)
    Jpeg,
    /// H.261 video
    H261,
    /// H.263 video
    H263,
    /// H.264/AVC video
    H264,
    /// H.265/HEVC video
    H265,
    /// AAC audio
    Aac,
    /// Opus audio
    Opus,
}

mod frame;
pub use frame::*;
