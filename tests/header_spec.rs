mod common;

use std::io::Cursor;

use chrono::NaiveDate;
use common::{QM7_TEXT, qm7_created, raw_header};
use mat5_codec::mat::format::header;
use mat5_codec::{Endianness, Header, MatError};

#[test]
fn decodes_reference_header_text() {
    let bytes = raw_header(QM7_TEXT, b"IM");
    let parsed = header::decode(&mut Cursor::new(bytes)).expect("valid header");

    assert_eq!(parsed.level, "5.0");
    assert_eq!(parsed.platform, "posix");
    assert_eq!(parsed.created, qm7_created());
    assert_eq!(parsed.byte_order, Endianness::Little);
    assert_eq!(parsed.to_string(), QM7_TEXT);
}

#[test]
fn big_endian_marker_selects_big_endian() {
    let bytes = raw_header(QM7_TEXT, b"MI");
    let parsed = header::decode(&mut Cursor::new(bytes)).expect("valid header");
    assert_eq!(parsed.byte_order, Endianness::Big);
}

#[test]
fn header_consumes_exactly_128_bytes() {
    let mut bytes = raw_header(QM7_TEXT, b"IM");
    bytes.extend_from_slice(&[0xAA; 16]);
    let mut cursor = Cursor::new(bytes);
    header::decode(&mut cursor).expect("valid header");
    assert_eq!(cursor.position(), 128);
}

#[test]
fn accepts_descriptor_without_comma_and_free_text_after_timestamp() {
    let text = "MATLAB 5.0 MAT-file Platform: GLNXA64, Created on: Mon Feb 18 17:12:08 2013 HDF5 schema 1.00 .";
    let parsed = header::decode(&mut Cursor::new(raw_header(text, b"IM"))).expect("valid header");
    assert_eq!(parsed.platform, "GLNXA64");
    assert_eq!(parsed.created, qm7_created());
}

#[test]
fn header_round_trips_in_both_byte_orders() {
    // A single-digit day is space padded in the timestamp.
    let created = NaiveDate::from_ymd_opt(2021, 3, 1).unwrap().and_hms_opt(9, 5, 0).unwrap();
    for order in [Endianness::Little, Endianness::Big] {
        let original = Header::new("MACI64", created, order);
        let mut bytes = Vec::new();
        header::encode(&mut bytes, &original).expect("encode header");
        assert_eq!(bytes.len(), 128);

        let decoded = header::decode(&mut Cursor::new(&bytes)).expect("decode header");
        assert_eq!(decoded, original);
        assert!(decoded.to_string().ends_with("Created on: Mon Mar  1 09:05:00 2021"));
    }
}

#[test]
fn encoded_header_layout() {
    let original = Header::new("posix", qm7_created(), Endianness::Little);
    let mut bytes = Vec::new();
    header::encode(&mut bytes, &original).expect("encode header");

    assert_eq!(&bytes[..QM7_TEXT.len()], QM7_TEXT.as_bytes());
    assert!(bytes[QM7_TEXT.len()..116].iter().all(|&b| b == b' '));
    assert!(bytes[116..124].iter().all(|&b| b == 0));
    assert_eq!(&bytes[124..126], &[0x00, 0x01]);
    assert_eq!(&bytes[126..128], b"IM");

    let mut big = Vec::new();
    header::encode(&mut big, &Header::new("posix", qm7_created(), Endianness::Big)).expect("encode header");
    assert_eq!(&big[124..128], &[0x01, 0x00, b'M', b'I']);
}

#[test]
fn rejects_missing_magic() {
    let bytes = raw_header("This is not a MAT-file at all", b"IM");
    match header::decode(&mut Cursor::new(bytes)) {
        Err(MatError::InvalidMagic { found }) => assert_eq!(found, "This is"),
        other => panic!("expected InvalidMagic, got {:?}", other),
    }
}

#[test]
fn rejects_level_7() {
    let text = "MATLAB 7.0 MAT-file, Platform: posix, Created on: Mon Feb 18 17:12:08 2013";
    match header::decode(&mut Cursor::new(raw_header(text, b"IM"))) {
        Err(MatError::UnsupportedLevel(level)) => assert_eq!(level, "7.0"),
        other => panic!("expected UnsupportedLevel, got {:?}", other),
    }
}

#[test]
fn rejects_unknown_byte_order_marker() {
    match header::decode(&mut Cursor::new(raw_header(QM7_TEXT, b"XX"))) {
        Err(MatError::InvalidByteOrder { marker }) => assert_eq!(marker, "XX"),
        other => panic!("expected InvalidByteOrder, got {:?}", other),
    }
}

#[test]
fn rejects_unparseable_timestamp() {
    let text = "MATLAB 5.0 MAT-file, Platform: posix, Created on: Someday in February";
    let err = header::decode(&mut Cursor::new(raw_header(text, b"IM"))).unwrap_err();
    assert!(matches!(err, MatError::InvalidTimestamp { .. }), "got {:?}", err);
}

#[test]
fn short_stream_is_truncated_read() {
    let bytes = raw_header(QM7_TEXT, b"IM");
    match header::decode(&mut Cursor::new(&bytes[..100])) {
        Err(MatError::TruncatedRead { offset, expected, found }) => {
            assert_eq!((offset, expected, found), (0, 128, 100));
        }
        other => panic!("expected TruncatedRead, got {:?}", other),
    }
}

#[test]
fn encode_rejects_text_that_does_not_fit() {
    let original = Header::new("x".repeat(80), qm7_created(), Endianness::Little);
    let err = header::encode(&mut Vec::new(), &original).unwrap_err();
    assert!(matches!(err, MatError::InvalidFormat(_)), "got {:?}", err);
}
