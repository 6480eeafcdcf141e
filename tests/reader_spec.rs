mod common;

use std::io::Cursor;
use std::time::{Duration, Instant};

use common::*;
use flate2::Compression;
use mat5_codec::{
    CancelToken, CancellableReader, DataType, Element, Endianness, Header, MatError, MatReader, MatWriter, Matrix,
    MatrixClass, NumericData, Value,
};

const MX_CELL: u32 = 1;
const MX_DOUBLE: u32 = 6;

fn sample_elements() -> Vec<Element> {
    let x = Matrix::new("x", MatrixClass::Double, vec![2, 2], NumericData::Double(vec![1.0, 2.0, 3.0, 4.0])).unwrap();
    let z = Matrix::complex(
        "z",
        MatrixClass::Single,
        vec![1, 2],
        NumericData::Single(vec![1.5, -1.5]),
        NumericData::Single(vec![0.25, 0.75]),
    )
    .unwrap();
    vec![
        Element::matrix(x),
        Element::matrix(Matrix::from_text("label", "MAT-file").unwrap()),
        Element::matrix(z),
        Element::numeric(NumericData::Int32(vec![10, 20, 30])),
        Element::numeric(NumericData::UInt16(vec![65535])),
        Element::text(DataType::Utf8, "free text"),
    ]
}

fn write_file(order: Endianness, compression: Option<Compression>, elements: &[Element]) -> Vec<u8> {
    let mut writer = MatWriter::new(Vec::new());
    if let Some(level) = compression {
        writer = writer.with_compression(level);
    }
    writer.write_header(&Header::new("posix", qm7_created(), order)).unwrap();
    for element in elements {
        writer.write_element(element).unwrap();
    }
    let written = writer.bytes_written();
    let bytes = writer.into_inner();
    assert_eq!(written, bytes.len() as u64);
    bytes
}

fn cell_then_double() -> Vec<u8> {
    let mut bytes = raw_header(QM7_TEXT, b"IM");
    bytes.extend(matrix_le(&[
        flags_le(MX_CELL, 0),
        dims_le(&[1, 1]),
        name_le("cells"),
        matrix_le(&[flags_le(MX_DOUBLE, 0), dims_le(&[1, 1]), tag_le(MI_INT8, 0), element_le(MI_DOUBLE, &f64s_le(&[1.0]))]),
    ]));
    bytes.extend(matrix_le(&[
        flags_le(MX_DOUBLE, 0),
        dims_le(&[1, 1]),
        name_le("y"),
        element_le(MI_DOUBLE, &f64s_le(&[42.0])),
    ]));
    bytes
}

#[test]
fn writer_output_reads_back_in_both_orders() {
    let elements = sample_elements();
    for order in [Endianness::Little, Endianness::Big] {
        let bytes = write_file(order, None, &elements);
        assert_eq!(bytes.len() % 8, 0);

        let mut reader = MatReader::new(Cursor::new(&bytes)).unwrap();
        assert_eq!(reader.byte_order(), order);
        assert_eq!(reader.header().to_string(), QM7_TEXT);
        assert_eq!(reader.offset(), 128);

        assert_eq!(reader.read_all().unwrap(), elements);
        assert!(reader.next_element().unwrap().is_none());
        assert_eq!(reader.offset(), bytes.len() as u64);
    }
}

#[test]
fn compressed_files_read_back_transparently() {
    let elements = sample_elements();
    let plain = write_file(Endianness::Little, None, &elements);
    let compressed = write_file(Endianness::Little, Some(Compression::best()), &elements);
    assert_eq!(&compressed[128..132], &MI_COMPRESSED.to_le_bytes());

    let mut reader = MatReader::new(Cursor::new(&compressed)).unwrap();
    assert_eq!(reader.read_all().unwrap(), elements);
    assert_eq!(reader.offset(), compressed.len() as u64);

    let mut reader = MatReader::new(Cursor::new(&plain)).unwrap();
    assert_eq!(reader.read_all().unwrap(), elements);
}

#[test]
fn write_compressed_wraps_a_single_element() {
    let mut writer = MatWriter::new(Vec::new());
    writer.write_header(&Header::new("posix", qm7_created(), Endianness::Big)).unwrap();
    let big = Matrix::new("big", MatrixClass::Double, vec![100, 1], NumericData::Double(vec![0.0; 100])).unwrap();
    let written = writer.write_compressed(&Element::matrix(big.clone())).unwrap();
    assert!(written < 800);
    writer.write_element(&Element::numeric(NumericData::Int8(vec![1]))).unwrap();
    let bytes = writer.into_inner();

    let mut reader = MatReader::new(Cursor::new(bytes)).unwrap();
    assert_eq!(reader.next_element().unwrap(), Some(Element::matrix(big)));
    assert_eq!(reader.next_element().unwrap().map(|e| e.value), Some(Value::Int(1)));
    assert_eq!(reader.next_element().unwrap(), None);
}

#[test]
fn elements_require_a_header_first() {
    let mut writer = MatWriter::new(Vec::new());
    let err = writer.write_element(&Element::numeric(NumericData::Int8(vec![1]))).unwrap_err();
    assert!(matches!(err, MatError::HeaderNotWritten), "got {:?}", err);
    assert!(writer.into_inner().is_empty());
}

#[test]
fn header_only_file_has_no_elements() {
    let mut reader = MatReader::new(Cursor::new(raw_header(QM7_TEXT, b"IM"))).unwrap();
    assert_eq!(reader.elements().count(), 0);
}

#[test]
fn unsupported_arrays_are_reported_and_skipped() {
    let bytes = cell_then_double();
    let mut reader = MatReader::new(Cursor::new(&bytes)).unwrap();
    let results: Vec<_> = reader.elements().collect();
    assert_eq!(results.len(), 2);
    match &results[0] {
        Err(e) => {
            assert!(e.is_resumable());
            assert!(matches!(e, MatError::UnsupportedClass { class: MatrixClass::Cell, .. }));
        }
        Ok(element) => panic!("expected an unsupported class, got {:?}", element),
    }
    let y = results[1].as_ref().unwrap();
    assert_eq!(y.name(), Some("y"));
    assert_eq!(y.as_matrix().and_then(|m| m.get(0)), Some(42.0));

    let mut reader = MatReader::new(Cursor::new(&bytes)).unwrap();
    let names: Vec<String> = reader
        .elements()
        .skip_unsupported()
        .map(|r| r.unwrap().name().unwrap_or_default().to_string())
        .collect();
    assert_eq!(names, vec!["y"]);
}

#[test]
fn truncated_element_ends_iteration() {
    let mut bytes = raw_header(QM7_TEXT, b"IM");
    bytes.extend(element_le(MI_DOUBLE, &f64s_le(&[1.0, 2.0])));
    let mut partial = element_le(MI_DOUBLE, &f64s_le(&[3.0, 4.0]));
    partial.truncate(12);
    bytes.extend(partial);

    let mut reader = MatReader::new(Cursor::new(bytes)).unwrap();
    let results: Vec<_> = reader.elements().collect();
    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    match &results[1] {
        Err(MatError::TruncatedRead { offset, expected, found }) => {
            assert_eq!((*offset, *expected, *found), (160, 16, 4));
        }
        other => panic!("expected TruncatedRead, got {:?}", other),
    }
}

#[test]
fn partial_tag_at_end_of_stream_is_truncated() {
    let mut bytes = raw_header(QM7_TEXT, b"IM");
    bytes.extend_from_slice(&[9, 0, 0]);
    let mut reader = MatReader::new(Cursor::new(bytes)).unwrap();
    let err = reader.next_element().unwrap_err();
    assert!(matches!(err, MatError::TruncatedRead { offset: 128, expected: 8, found: 3 }), "got {:?}", err);
}

#[test]
fn cancelled_token_aborts_header() {
    let token = CancelToken::new();
    token.cancel();
    let source = CancellableReader::new(Cursor::new(cell_then_double()), token);
    let err = MatReader::new(source).unwrap_err();
    assert!(matches!(err, MatError::Cancelled), "got {:?}", err);
}

#[test]
fn cancelling_between_elements_aborts_the_next_read() {
    let token = CancelToken::new();
    let bytes = write_file(Endianness::Little, None, &sample_elements());
    let mut reader = MatReader::new(CancellableReader::new(Cursor::new(bytes), token.clone())).unwrap();
    assert!(reader.next_element().unwrap().is_some());

    token.cancel();
    let err = reader.next_element().unwrap_err();
    assert!(matches!(err, MatError::Cancelled), "got {:?}", err);
    assert!(!err.is_resumable());
}

#[test]
fn expired_deadline_aborts_reads() {
    let source = CancellableReader::new(Cursor::new(cell_then_double()), CancelToken::new())
        .with_deadline(Instant::now());
    let err = MatReader::new(source).unwrap_err();
    assert!(matches!(err, MatError::Cancelled), "got {:?}", err);
}

#[test]
fn generous_timeout_does_not_interfere() {
    let bytes = write_file(Endianness::Big, None, &sample_elements());
    let source = CancellableReader::new(Cursor::new(bytes), CancelToken::new()).with_timeout(Duration::from_secs(60));
    let mut reader = MatReader::new(source).unwrap();
    assert_eq!(reader.read_all().unwrap(), sample_elements());
}
