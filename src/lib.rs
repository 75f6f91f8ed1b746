#![doc(html_root_url = "https://docs.rs/rtpio/0.1.0")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

//! # rtpio - Rust Real-time Transport Engine
//!
//! `rtpio` is a transport engine for real-time media applications in Rust.
//! It packetizes encoded audio/video frames into the RTP wire format,
//! parses received datagrams back into frame fragments, and tracks
//! per-stream health — loss, clock synchronization, source changes — over
//! an unreliable, unordered datagram channel.
//!
//! The crate deliberately stops at the transport boundary: it never
//! decodes media, never owns a socket, and never retransmits. A late
//! packet is worthless in real-time delivery, so the engine is built for
//! lossy networks — every receive-path error is local to one datagram.
//!
//! ## Features
//!
//! ### RTP Data Path
//! - Bit-exact 12-byte header encode/decode, network byte order
//! - Wraparound-safe sequence and timestamp tracking (16/32-bit fields
//!   expanded to monotone 64-bit logical values)
//! - Loss detection that survives reordering and duplicates
//! - Source-change detection with hysteresis against corrupted packets
//!
//! ### Packetization
//! - Generic chunking path for self-framing codecs
//! - Dedicated H.261 fragmenter with the RFC 4587 payload header and
//!   split-byte reassembly
//!
//! ### RTCP Control Path
//! - Sender/receiver reports, source descriptions, BYE and APP packets
//! - Sender-report building from send-side counters
//! - Relative loss and end-to-end delay derivation
//! - Clock-synchronization reference pair for cross-stream alignment
//!
//! ## Quick Start
//!
//! Add this to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! rtpio = "0.1.0"
//! ```
//!
//! ### Sending a Stream
//!
//! ```rust
//! use rtpio::av::{CodecId, Frame};
//! use rtpio::config::SessionConfig;
//! use rtpio::format::rtp::RtpSession;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut session = RtpSession::new(CodecId::H261, SessionConfig::new())?;
//!
//! let frame = Frame::new(CodecId::H261, vec![0u8; 4000])
//!     .with_pts(40)
//!     .with_boundary(true);
//!
//! for packet in session.packetize(&frame) {
//!     // hand the bytes to the datagram transport
//!     let _ = packet;
//! }
//!
//! // periodically, on the RTCP port:
//! let report = session.build_sender_report();
//! # let _ = report;
//! # Ok(())
//! # }
//! ```
//!
//! ### Receiving a Stream
//!
//! ```rust,no_run
//! use rtpio::av::CodecId;
//! use rtpio::config::SessionConfig;
//! use rtpio::format::rtp::{Received, RtpSession};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut session = RtpSession::new(CodecId::H261, SessionConfig::new())?;
//! # let datagrams: Vec<Vec<u8>> = vec![];
//!
//! for datagram in datagrams {
//!     match session.receive(&datagram) {
//!         Ok(Received::Media(chunk)) => {
//!             // reassemble; chunk.marker closes the frame
//!         }
//!         Ok(Received::Control(_report)) => {
//!             // statistics and sync reference already folded in
//!         }
//!         Err(_) => {
//!             // damaged datagram: dropped, stream continues
//!         }
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! - `av`: frame and codec-identifier types at the codec boundary
//!
//! - `codec`: payload formats needing custom headers (H.261)
//!
//! - `format`: the wire formats
//!   - RTP packet codec, trackers, and the per-stream session
//!   - RTCP packet codec and report handling
//!
//! - `error`: the crate's error taxonomy
//!   - Receive-path errors are droppable, never stream-fatal
//!   - Send-path admission errors surface at session open
//!
//! - `utils`: bit-level reader/writer
//!
//! - `config`: explicit per-session configuration
//!
/// Frame and codec-identifier types
pub mod av;

/// Codec-specific payload formats
pub mod codec;

/// Error types and utilities
pub mod error;

/// Wire-format implementations (RTP, RTCP)
pub mod format;

/// Common utilities and helper functions
pub mod utils;

/// Per-session configuration
pub mod config;

pub use config::SessionConfig;
pub use error::{PacketizeError, ParseError, Result, RtpioError};
