//! Character data of miUTF8, miUTF16 and miUTF32 elements.

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use encoding_rs::{UTF_16BE, UTF_16LE};

use crate::mat::types::error::{MatError, Result};
use crate::mat::types::models::{DataType, Endianness};

/// Decodes a text payload in the file's byte order.
pub fn decode(data_type: DataType, bytes: &[u8], order: Endianness) -> Result<String> {
    match data_type {
        DataType::Utf8 => String::from_utf8(bytes.to_vec())
            .map_err(|e| MatError::InvalidFormat(format!("Invalid miUTF8 data: {}", e))),
        DataType::Utf16 => {
            if bytes.len() % 2 != 0 {
                return Err(MatError::length_mismatch("miUTF16 payload", bytes.len() as u64 & !1, bytes.len() as u64));
            }
            let encoding = match order {
                Endianness::Big => UTF_16BE,
                Endianness::Little => UTF_16LE,
            };
            let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
            if had_errors {
                return Err(MatError::InvalidFormat("Invalid miUTF16 data".to_string()));
            }
            Ok(text.into_owned())
        }
        DataType::Utf32 => {
            if bytes.len() % 4 != 0 {
                return Err(MatError::length_mismatch("miUTF32 payload", bytes.len() as u64 & !3, bytes.len() as u64));
            }
            bytes
                .chunks_exact(4)
                .map(|chunk| {
                    let code = order.read_u32(chunk);
                    char::from_u32(code)
                        .ok_or_else(|| MatError::InvalidFormat(format!("Invalid miUTF32 code point {:#x}", code)))
                })
                .collect()
        }
        other => Err(MatError::InvalidFormat(format!("{} is not a text type", other))),
    }
}

/// Encodes text as a payload of the given text type.
pub fn encode(data_type: DataType, text: &str, order: Endianness) -> Result<Vec<u8>> {
    match data_type {
        DataType::Utf8 => Ok(text.as_bytes().to_vec()),
        DataType::Utf16 => {
            let mut out = Vec::with_capacity(text.len() * 2);
            for unit in text.encode_utf16() {
                let mut buf = [0u8; 2];
                order.write_u16(&mut buf, unit);
                out.extend_from_slice(&buf);
            }
            Ok(out)
        }
        DataType::Utf32 => {
            let mut out = Vec::with_capacity(text.len() * 4);
            for c in text.chars() {
                let mut buf = [0u8; 4];
                order.write_u32(&mut buf, u32::from(c));
                out.extend_from_slice(&buf);
            }
            Ok(out)
        }
        other => Err(MatError::InvalidFormat(format!("{} is not a text type", other))),
    }
}

/// UTF-16 code units of a text payload, as held by char matrices.
///
/// miUTF16 units are taken as stored, so unpaired surrogates survive.
pub fn decode_units(data_type: DataType, bytes: &[u8], order: Endianness) -> Result<Vec<u16>> {
    if data_type != DataType::Utf16 {
        return Ok(decode(data_type, bytes, order)?.encode_utf16().collect());
    }
    if bytes.len() % 2 != 0 {
        return Err(MatError::length_mismatch("miUTF16 payload", bytes.len() as u64 & !1, bytes.len() as u64));
    }
    let mut units = vec![0u16; bytes.len() / 2];
    match order {
        Endianness::Big => BigEndian::read_u16_into(bytes, &mut units),
        Endianness::Little => LittleEndian::read_u16_into(bytes, &mut units),
    }
    Ok(units)
}
