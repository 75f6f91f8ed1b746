use super::CodecId;
use bytes::Bytes;

/// An encoded media frame handed to the engine for packetization.
///
/// `pts` is in milliseconds; conversion to RTP timestamp units happens
/// inside the engine using the codec clock rate.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Codec the payload is encoded with
    pub codec: CodecId,
    /// Opaque encoded payload
    pub data: Bytes,
    /// Presentation timestamp in milliseconds
    pub pts: i64,
    /// True for keyframes and other discrete frame boundaries
    pub is_boundary: bool,
}

impl Frame {
    /// Creates a frame with zero pts and no boundary flag.
    pub fn new(codec: CodecId, data: impl Into<Bytes>) -> Self {
        Self {
            codec,
            data: data.into(),
            pts: 0,
            is_boundary: false,
        }
    }

    /// Sets the presentation timestamp (milliseconds).
    pub fn with_pts(mut self, pts: i64) -> Self {
        self.pts = pts;
        self
    }

    /// Marks the frame as a keyframe / discrete boundary.
    pub fn with_boundary(mut self, is_boundary: bool) -> Self {
        self.is_boundary = is_boundary;
        self
    }
}
