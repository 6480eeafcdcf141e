//! Data element decoding and encoding.
//!
//! This is the dispatch layer between tags and payload parsers:
//! - miCOMPRESSED goes to the compression envelope
//! - miMATRIX goes to the matrix codec
//! - numeric and text types are decoded here
//!
//! Alignment padding after a payload is always consumed (and emitted) here,
//! never by callers.

use std::io::{Read, Write};

use flate2::Compression;
use log::debug;

use super::matrix;
use super::tag::{self, TAG_LEN, Tag};
use crate::mat::codec::{compression, text};
use crate::mat::types::error::{MatError, Result};
use crate::mat::types::models::{DataType, Endianness};
use crate::mat::types::value::{Element, NumericData, Value};
use crate::mat::utils::ByteSource;

const ZERO_PADDING: [u8; 8] = [0; 8];

/// Decodes one element from `reader`.
///
/// The reader is left on the boundary of the next element.
pub fn decode<R: Read>(reader: &mut R, order: Endianness) -> Result<Element> {
    let mut source = ByteSource::new(reader);
    decode_from(&mut source, order)
}

pub(crate) fn decode_from(source: &mut ByteSource<'_>, order: Endianness) -> Result<Element> {
    let tag = tag::decode(source, order)?;
    decode_tagged(source, tag, order)
}

/// Decodes the payload of an element whose tag has already been read.
pub(crate) fn decode_tagged(source: &mut ByteSource<'_>, tag: Tag, order: Endianness) -> Result<Element> {
    let offset = source.offset();
    match tag.data_type {
        DataType::Compressed => {
            if tag.is_small() {
                return Err(small_not_allowed(&tag, offset));
            }
            compression::decode(source, tag.length, order)
        }
        DataType::Matrix => {
            if tag.is_small() {
                return Err(small_not_allowed(&tag, offset));
            }
            let decoded = matrix::decode(source, tag.length, order);
            if decoded.is_ok() || decoded.as_ref().is_err_and(MatError::is_resumable) {
                source.skip(tag.padding())?;
            }
            let matrix = decoded?;
            debug!("Decoded {} matrix {:?} {:?}", matrix.class, matrix.name, matrix.dims);
            Ok(Element::matrix(matrix))
        }
        data_type if data_type.is_text() => {
            let payload = read_payload(source, &tag)?;
            let text = text::decode(data_type, &payload, order)?;
            Ok(Element::text(data_type, text))
        }
        data_type => {
            let payload = read_payload(source, &tag)?;
            let data = NumericData::from_bytes(data_type, &payload, order)?;
            Ok(Element::numeric(data))
        }
    }
}

fn small_not_allowed(tag: &Tag, offset: u64) -> MatError {
    MatError::InvalidFormat(format!(
        "{} element before offset {} cannot use the small element layout",
        tag.data_type, offset
    ))
}

/// Returns the raw payload of `tag` and consumes any padding after it.
pub(crate) fn read_payload(source: &mut ByteSource<'_>, tag: &Tag) -> Result<Vec<u8>> {
    if let Some(inline) = tag.inline_payload() {
        return Ok(inline.to_vec());
    }
    let payload = source.read_vec(u64::from(tag.length))?;
    source.skip(tag.padding())?;
    Ok(payload)
}

/// Encodes one element, returning the number of bytes written.
///
/// # Errors
/// - [`MatError::InvalidFormat`] if the value does not fit `element.data_type`
/// - [`MatError::Io`] if the writer fails
pub fn encode<W: Write>(writer: &mut W, element: &Element, order: Endianness) -> Result<u64> {
    if let Value::Compressed(inner) = &element.value {
        if element.data_type != DataType::Compressed {
            return Err(type_mismatch(element));
        }
        return compression::encode(writer, inner, order, Compression::default());
    }
    let payload = encode_payload(element, order)?;
    write_framed(writer, element.data_type, &payload, order)
}

/// Writes a tag for `payload`, the payload, and its padding.
pub(crate) fn write_framed<W: Write>(writer: &mut W, data_type: DataType, payload: &[u8], order: Endianness) -> Result<u64> {
    let tag = Tag::for_payload(data_type, payload)?;
    tag::encode(writer, &tag, order)?;
    if tag.is_small() {
        return Ok(TAG_LEN);
    }
    writer.write_all(payload)?;
    writer.write_all(&ZERO_PADDING[..tag.padding() as usize])?;
    Ok(tag.framed_len())
}

fn encode_payload(element: &Element, order: Endianness) -> Result<Vec<u8>> {
    let data_type = element.data_type;
    match &element.value {
        Value::Int(_) | Value::UInt(_) | Value::Float(_) => Ok(scalar_data(element)?.to_bytes(order)),
        // Single values decode as scalars.
        Value::Array(data) if data.len() == 1 => Err(MatError::InvalidFormat(format!(
            "A single {} value must be encoded as a scalar",
            data_type
        ))),
        Value::Array(data) if data.data_type() == data_type => Ok(data.to_bytes(order)),
        Value::Text(s) if data_type.is_text() => text::encode(data_type, s, order),
        Value::Matrix(m) if data_type == DataType::Matrix => matrix::encode_payload(m, order),
        _ => Err(type_mismatch(element)),
    }
}

/// Widens or narrows a scalar value to the element's declared numeric type.
fn scalar_data(element: &Element) -> Result<NumericData> {
    let out_of_range = || {
        MatError::InvalidFormat(format!("{:?} does not fit in {}", element.value, element.data_type))
    };
    Ok(match (element.data_type, &element.value) {
        (DataType::Int8, &Value::Int(v)) => NumericData::Int8(vec![i8::try_from(v).map_err(|_| out_of_range())?]),
        (DataType::Int16, &Value::Int(v)) => NumericData::Int16(vec![i16::try_from(v).map_err(|_| out_of_range())?]),
        (DataType::Int32, &Value::Int(v)) => NumericData::Int32(vec![i32::try_from(v).map_err(|_| out_of_range())?]),
        (DataType::Int64, &Value::Int(v)) => NumericData::Int64(vec![v]),
        (DataType::UInt8, &Value::UInt(v)) => NumericData::UInt8(vec![u8::try_from(v).map_err(|_| out_of_range())?]),
        (DataType::UInt16, &Value::UInt(v)) => NumericData::UInt16(vec![u16::try_from(v).map_err(|_| out_of_range())?]),
        (DataType::UInt32, &Value::UInt(v)) => NumericData::UInt32(vec![u32::try_from(v).map_err(|_| out_of_range())?]),
        (DataType::UInt64, &Value::UInt(v)) => NumericData::UInt64(vec![v]),
        (DataType::Single, &Value::Float(v)) => NumericData::Single(vec![v as f32]),
        (DataType::Double, &Value::Float(v)) => NumericData::Double(vec![v]),
        _ => return Err(type_mismatch(element)),
    })
}

fn type_mismatch(element: &Element) -> MatError {
    let shape = match &element.value {
        Value::Int(_) => "signed integer",
        Value::UInt(_) => "unsigned integer",
        Value::Float(_) => "float",
        Value::Array(_) => "numeric array",
        Value::Text(_) => "text",
        Value::Matrix(_) => "matrix",
        Value::Compressed(_) => "compressed element",
    };
    MatError::InvalidFormat(format!("A {} value cannot be encoded as {}", shape, element.data_type))
}
