use super::*;
use crate::av::{CodecId, Frame};
use bytes::BytesMut;

#[test]
fn test_header_bit_layout() {
    let header = H261Header {
        sbit: 0b101,
        ebit: 0b011,
        intra: true,
        motion_vectors: false,
        gobn: 0b1001,
        mbap: 0b10101,
        quant: 0b01010,
        hmvd: 0b11111,
        vmvd: 0b00001,
    };

    let raw = header.marshal();
    // SBIT=101 EBIT=011 I=1 V=0 | GOBN=1001 MBAP=10101 QUANT=01010 HMVD=11111 VMVD=00001
    assert_eq!(raw, [0b10101110, 0b10011010, 0b10101011, 0b11100001]);
    assert_eq!(H261Header::parse(&raw).unwrap(), header);
}

#[test]
fn test_header_truncated() {
    assert!(matches!(
        H261Header::parse(&[0x00, 0x01, 0x02]),
        Err(crate::error::ParseError::Malformed(_))
    ));
}

#[test]
fn test_fragment_counts() {
    let packetizer = H261Packetizer::new(100);

    // 250 bytes at a 100-byte cap -> 3 fragments of 100/100/50
    let frame = Frame::new(CodecId::H261, vec![0xab; 250]);
    let fragments = packetizer.fragment(&frame);
    assert_eq!(fragments.len(), 3);
    assert_eq!(fragments[0].len(), H261_HEADER_SIZE + 100);
    assert_eq!(fragments[1].len(), H261_HEADER_SIZE + 100);
    assert_eq!(fragments[2].len(), H261_HEADER_SIZE + 50);

    // a frame that fits yields exactly one fragment
    let frame = Frame::new(CodecId::H261, vec![0xcd; 100]);
    assert_eq!(packetizer.fragment(&frame).len(), 1);

    // empty frames produce nothing
    let frame = Frame::new(CodecId::H261, Vec::new());
    assert!(packetizer.fragment(&frame).is_empty());
}

#[test]
fn test_fragment_intra_flag() {
    let packetizer = H261Packetizer::new(64);
    let frame = Frame::new(CodecId::H261, vec![1u8; 10]).with_boundary(true);

    let fragments = packetizer.fragment(&frame);
    let header = H261Header::parse(&fragments[0]).unwrap();
    assert!(header.intra);
    assert!(!header.motion_vectors);
}

#[test]
fn test_fragment_reassembly() {
    let packetizer = H261Packetizer::new(96);
    let mut depacketizer = H261Depacketizer::new();

    let original: Vec<u8> = (0..=255u8).cycle().take(500).collect();
    let frame = Frame::new(CodecId::H261, original.clone());
    let fragments = packetizer.fragment(&frame);
    assert_eq!(fragments.len(), 6);

    let mut reassembled = BytesMut::new();
    let last = fragments.len() - 1;
    for (i, fragment) in fragments.iter().enumerate() {
        let part = depacketizer.depacketize(fragment, i == last).unwrap();
        reassembled.extend_from_slice(&part);
    }

    assert_eq!(&reassembled[..], &original[..]);
}

#[test]
fn test_split_byte_merge() {
    // A byte split across two fragments: the first carries its high 3
    // bits (ebit=5 invalid low bits), the second its low 5 bits (sbit=3).
    let first_header = H261Header {
        ebit: 5,
        ..Default::default()
    };
    let second_header = H261Header {
        sbit: 3,
        ..Default::default()
    };

    let mut first = first_header.marshal().to_vec();
    first.extend_from_slice(&[0xaa, 0b101_00000]);
    let mut second = second_header.marshal().to_vec();
    second.extend_from_slice(&[0b000_10110, 0x55]);

    let mut depacketizer = H261Depacketizer::new();
    let a = depacketizer.depacketize(&first, false).unwrap();
    let b = depacketizer.depacketize(&second, true).unwrap();

    // 0b101_00000 (high bits) | 0b000_10110 (low bits) = 0b101_10110
    assert_eq!(&a[..], &[0xaa]);
    assert_eq!(&b[..], &[0b10110110, 0x55]);
}

#[test]
fn test_split_byte_mismatch_discards_pending() {
    // Fragment ends mid-byte, but the continuation is missing (dropped
    // packet): its sbit does not match, so the partial byte is dropped.
    let first_header = H261Header {
        ebit: 4,
        ..Default::default()
    };
    let mut first = first_header.marshal().to_vec();
    first.extend_from_slice(&[0x11, 0xf0]);

    let mut second = H261Header::default().marshal().to_vec();
    second.extend_from_slice(&[0x22, 0x33]);

    let mut depacketizer = H261Depacketizer::new();
    let a = depacketizer.depacketize(&first, false).unwrap();
    let b = depacketizer.depacketize(&second, true).unwrap();

    assert_eq!(&a[..], &[0x11]);
    assert_eq!(&b[..], &[0x22, 0x33]);
}

#[test]
fn test_marker_flushes_state() {
    let header = H261Header {
        ebit: 2,
        ..Default::default()
    };
    let mut fragment = header.marshal().to_vec();
    fragment.extend_from_slice(&[0x7c]);

    let mut depacketizer = H261Depacketizer::new();
    // frame-final fragment keeps its partial last byte
    let out = depacketizer.depacketize(&fragment, true).unwrap();
    assert_eq!(&out[..], &[0x7c]);

    // nothing pends into the next frame
    let mut clean_fragment = H261Header::default().marshal().to_vec();
    clean_fragment.extend_from_slice(&[0x01]);
    let out = depacketizer.depacketize(&clean_fragment, true).unwrap();
    assert_eq!(&out[..], &[0x01]);
}

#[test]
fn test_depacketize_rejects_short_payload() {
    let mut depacketizer = H261Depacketizer::new();
    assert!(depacketizer.depacketize(&[0x00], false).is_err());
}
