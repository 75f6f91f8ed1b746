use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_sender_report_parse() {
    let data = vec![
        0x80, 0xc8, 0x00, 0x06, // V=2, P=0, Count=0, Type=SR(200), Len=6
        0x12, 0x34, 0x56, 0x78, // SSRC
        0xdf, 0xa0, 0x00, 0x00, // NTP timestamp (MSW)
        0x00, 0x00, 0x00, 0x00, // NTP timestamp (LSW)
        0x00, 0x01, 0x86, 0xa0, // RTP timestamp (100000)
        0x00, 0x00, 0x00, 0x0a, // Packet count (10)
        0x00, 0x00, 0x0b, 0xb8, // Octet count (3000)
    ];

    let packet = RtcpPacket::parse(&data).unwrap();
    match packet {
        RtcpPacket::SenderReport {
            ssrc,
            ntp_timestamp,
            rtp_timestamp,
            packet_count,
            octet_count,
            reports,
        } => {
            assert_eq!(ssrc, 0x12345678);
            assert_eq!(ntp_timestamp, 0xdfa0_0000_0000_0000);
            assert_eq!(rtp_timestamp, 100000);
            assert_eq!(packet_count, 10);
            assert_eq!(octet_count, 3000);
            assert!(reports.is_empty());
        }
        _ => panic!("expected SenderReport"),
    }
}

#[test]
fn test_sender_report_round_trip() {
    let report = RtcpPacket::SenderReport {
        ssrc: 0xcafe_f00d,
        ntp_timestamp: ntp_now(),
        rtp_timestamp: 1_234_567,
        packet_count: 4321,
        octet_count: 987_654,
        reports: vec![ReceptionReport {
            ssrc: 0x1111_1111,
            fraction_lost: 0x20,
            packets_lost: 17,
            highest_seq: 99_999,
            jitter: 100,
            last_sr: 0x1234_5678,
            delay_last_sr: 10,
        }],
    };

    let wire = report.marshal();
    // length field: 6 words of SR body + 6 per report block
    assert_eq!(u16::from_be_bytes([wire[2], wire[3]]), 12);
    assert_eq!(wire.len(), (12 + 1) * 4);

    let parsed = RtcpPacket::parse(&wire).unwrap();
    assert_eq!(parsed, report);
}

#[test]
fn test_receiver_report_parse() {
    let data = vec![
        0x81, 0xc9, 0x00, 0x07, // V=2, P=0, Count=1, Type=RR(201), Len=7
        0x12, 0x34, 0x56, 0x78, // SSRC of packet sender
        0x11, 0x11, 0x11, 0x11, // SSRC_1 (source 1)
        0x20, 0x00, 0x00, 0x01, // fraction lost + cumulative lost
        0x00, 0x00, 0x03, 0xe8, // extended highest seq number
        0x00, 0x00, 0x00, 0x64, // interarrival jitter
        0x00, 0x00, 0x00, 0x00, // LSR
        0x00, 0x00, 0x00, 0x00, // DLSR
    ];

    let packet = RtcpPacket::parse(&data).unwrap();
    match packet {
        RtcpPacket::ReceiverReport { ssrc, reports } => {
            assert_eq!(ssrc, 0x12345678);
            assert_eq!(reports.len(), 1);

            let report = &reports[0];
            assert_eq!(report.ssrc, 0x11111111);
            assert_eq!(report.fraction_lost, 0x20);
            assert_eq!(report.packets_lost, 1);
            assert_eq!(report.highest_seq, 1000);
            assert_eq!(report.jitter, 100);
        }
        _ => panic!("expected ReceiverReport"),
    }
}

#[test]
fn test_source_description_round_trip() {
    let packet = RtcpPacket::SourceDescription {
        chunks: vec![SdesChunk {
            ssrc: 0xaabb_ccdd,
            items: vec![
                SdesItem {
                    item_type: SdesItemType::Cname,
                    text: "alice@example.com".into(),
                },
                SdesItem {
                    item_type: SdesItemType::Tool,
                    text: "rtpio".into(),
                },
            ],
        }],
    };

    let wire = packet.marshal();
    assert_eq!(wire.len() % 4, 0, "SDES must pad to a word boundary");

    let parsed = RtcpPacket::parse(&wire).unwrap();
    assert_eq!(parsed, packet);
}

#[test]
fn test_source_description_item_order_preserved() {
    let items = vec![
        SdesItem {
            item_type: SdesItemType::Name,
            text: "Alice".into(),
        },
        SdesItem {
            item_type: SdesItemType::Email,
            text: "a@b.c".into(),
        },
        SdesItem {
            item_type: SdesItemType::Note,
            text: "on the road".into(),
        },
    ];
    let packet = RtcpPacket::SourceDescription {
        chunks: vec![SdesChunk {
            ssrc: 1,
            items: items.clone(),
        }],
    };

    match RtcpPacket::parse(&packet.marshal()).unwrap() {
        RtcpPacket::SourceDescription { chunks } => assert_eq!(chunks[0].items, items),
        _ => panic!("expected SourceDescription"),
    }
}

#[test]
fn test_goodbye_round_trip() {
    let packet = RtcpPacket::Goodbye {
        sources: vec![0x1, 0x2],
        reason: Some("shutting down".into()),
    };

    let parsed = RtcpPacket::parse(&packet.marshal()).unwrap();
    assert_eq!(parsed, packet);

    let bare = RtcpPacket::Goodbye {
        sources: vec![0x3],
        reason: None,
    };
    assert_eq!(RtcpPacket::parse(&bare.marshal()).unwrap(), bare);
}

#[test]
fn test_app_round_trip() {
    let packet = RtcpPacket::ApplicationDefined {
        ssrc: 0x4242_4242,
        subtype: 5,
        name: *b"qfbk",
        data: Bytes::from(vec![1, 2, 3, 4, 5, 6, 7, 8]),
    };

    let parsed = RtcpPacket::parse(&packet.marshal()).unwrap();
    assert_eq!(parsed, packet);
}

#[test]
fn test_invalid_packets() {
    // too short for the common prefix
    let data = vec![0x80, 0xc8, 0x00];
    assert!(matches!(
        RtcpPacket::parse(&data),
        Err(ParseError::Malformed(_))
    ));

    // version 1
    let data = vec![
        0x40, 0xc8, 0x00, 0x01, //
        0x00, 0x00, 0x00, 0x00,
    ];
    assert!(matches!(
        RtcpPacket::parse(&data),
        Err(ParseError::UnsupportedVersion(1))
    ));

    // unknown packet type
    let data = vec![
        0x80, 0xff, 0x00, 0x01, //
        0x00, 0x00, 0x00, 0x00,
    ];
    assert!(matches!(
        RtcpPacket::parse(&data),
        Err(ParseError::Malformed(_))
    ));

    // length field claims more words than the buffer holds
    let data = vec![
        0x80, 0xc8, 0x00, 0x06, //
        0x12, 0x34, 0x56, 0x78,
    ];
    assert!(matches!(
        RtcpPacket::parse(&data),
        Err(ParseError::Malformed(_))
    ));
}

#[test]
fn test_is_rtcp_discrimination() {
    let sr = RtcpPacket::SenderReport {
        ssrc: 1,
        ntp_timestamp: 0,
        rtp_timestamp: 0,
        packet_count: 0,
        octet_count: 0,
        reports: vec![],
    }
    .marshal();
    assert!(is_rtcp(&sr));

    // an RTP packet with a marked payload type stays on the data path:
    // 0x80 | 31 = 159, well outside 200..=204
    let rtp = [0x80u8, 0x9f, 0x00, 0x01];
    assert!(!is_rtcp(&rtp));

    assert!(!is_rtcp(&[0x80]));
}

#[test]
fn test_ntp_now_advances() {
    let ts = ntp_now();
    assert!(ts > 0);

    // after Jan 1 2020 in NTP seconds
    let jan_2020_ntp = 3_786_825_600u64 << 32;
    assert!(ts > jan_2020_ntp);
}

#[test]
fn test_ntp_micro_conversion() {
    // 2.5 seconds in fixed point
    let ntp = (2u64 << 32) | (1u64 << 31);
    assert_eq!(ntp_to_micros(ntp), 2_500_000);
}
