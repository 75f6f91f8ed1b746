use crate::av::CodecId;
use thiserror::Error;

/// Errors raised while parsing received RTP or RTCP packets.
///
/// Every variant is local to the offending datagram: the caller drops the
/// packet and keeps the stream alive. Nothing here is stream-fatal.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// Truncated or structurally invalid packet data
    #[error("malformed packet: {0}")]
    Malformed(&'static str),

    /// The header carried a protocol version other than 2
    #[error("unsupported protocol version {0}")]
    UnsupportedVersion(u8),
}

/// Errors raised on the send path, surfaced when a stream is opened.
///
/// Admission happens at session construction; frames handed to an open
/// session never fail to packetize.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PacketizeError {
    /// The codec is not in the packetizer's supported set
    #[error("unsupported codec: {0:?}")]
    UnsupportedCodec(CodecId),
}

/// Top-level error type covering both engine flows.
#[derive(Debug, Error)]
pub enum RtpioError {
    /// Receive-path error (packet dropped, stream continues)
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Send-path admission error
    #[error("packetize error: {0}")]
    Packetize(#[from] PacketizeError),
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, RtpioError>;
