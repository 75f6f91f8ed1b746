use crate::error::ParseError;
use crate::utils::{BitReader, BitWriter};

/// Size of the H.261 payload header in bytes.
pub const H261_HEADER_SIZE: usize = 4;

/// The RFC 4587 H.261 payload header.
///
/// `hmvd`/`vmvd` hold the raw 5-bit motion vector fields; they are only
/// meaningful when a fragment starts mid-GOB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct H261Header {
    /// Invalid bits at the start of the first payload byte (0..=7)
    pub sbit: u8,
    /// Invalid bits at the end of the last payload byte (0..=7)
    pub ebit: u8,
    /// Intra-frame flag: the payload contains only intra-coded blocks
    pub intra: bool,
    /// Motion-vector flag: motion vectors may be present
    pub motion_vectors: bool,
    /// GOB number of the first GOB in the payload; 0 when the payload
    /// starts with a GOB or picture header
    pub gobn: u8,
    /// Macroblock address predictor (raw 5-bit field)
    pub mbap: u8,
    /// Quantizer in effect at the start of the payload (raw 5-bit field)
    pub quant: u8,
    /// Horizontal motion vector predictor (raw 5-bit field)
    pub hmvd: u8,
    /// Vertical motion vector predictor (raw 5-bit field)
    pub vmvd: u8,
}

impl H261Header {
    /// Parses the 4-byte header from the front of a payload.
    pub fn parse(data: &[u8]) -> Result<Self, ParseError> {
        if data.len() < H261_HEADER_SIZE {
            return Err(ParseError::Malformed("truncated H.261 payload header"));
        }

        let mut reader = BitReader::new(&data[..H261_HEADER_SIZE]);
        Ok(Self {
            sbit: reader.read_bits(3)? as u8,
            ebit: reader.read_bits(3)? as u8,
            intra: reader.read_bit()?,
            motion_vectors: reader.read_bit()?,
            gobn: reader.read_bits(4)? as u8,
            mbap: reader.read_bits(5)? as u8,
            quant: reader.read_bits(5)? as u8,
            hmvd: reader.read_bits(5)? as u8,
            vmvd: reader.read_bits(5)? as u8,
        })
    }

    /// Serializes the header to its 4-byte form.
    pub fn marshal(&self) -> [u8; H261_HEADER_SIZE] {
        let mut writer = BitWriter::new();
        writer.write_bits(self.sbit as u32 & 0x07, 3);
        writer.write_bits(self.ebit as u32 & 0x07, 3);
        writer.write_bit(self.intra);
        writer.write_bit(self.motion_vectors);
        writer.write_bits(self.gobn as u32 & 0x0f, 4);
        writer.write_bits(self.mbap as u32 & 0x1f, 5);
        writer.write_bits(self.quant as u32 & 0x1f, 5);
        writer.write_bits(self.hmvd as u32 & 0x1f, 5);
        writer.write_bits(self.vmvd as u32 & 0x1f, 5);

        let bytes = writer.finish();
        [bytes[0], bytes[1], bytes[2], bytes[3]]
    }
}
