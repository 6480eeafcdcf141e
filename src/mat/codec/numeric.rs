//! Conversion between raw payload bytes and typed numeric buffers.
//!
//! All multi-byte values go through `byteorder`, dispatched once per buffer
//! on the file's [`Endianness`].

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::mat::types::error::{MatError, Result};
use crate::mat::types::models::{DataType, Endianness};
use crate::mat::types::value::{NumericData, with_values};

impl NumericData {
    /// Decodes a payload of `data_type` values.
    ///
    /// # Errors
    /// - [`MatError::UnsupportedType`] if `data_type` is not numeric
    /// - [`MatError::LengthMismatch`] if the payload is not a whole number of values
    pub fn from_bytes(data_type: DataType, bytes: &[u8], order: Endianness) -> Result<Self> {
        let size = data_type.element_size().ok_or(MatError::UnsupportedType {
            code: data_type.code(),
            offset: 0,
        })?;
        if bytes.len() % size != 0 {
            let whole = (bytes.len() / size * size) as u64;
            return Err(MatError::length_mismatch("numeric payload", whole, bytes.len() as u64));
        }
        Ok(match order {
            Endianness::Big => decode_with::<BigEndian>(data_type, bytes, size),
            Endianness::Little => decode_with::<LittleEndian>(data_type, bytes, size),
        })
    }

    /// Encodes the values in the given byte order.
    pub fn to_bytes(&self, order: Endianness) -> Vec<u8> {
        match order {
            Endianness::Big => encode_with::<BigEndian>(self),
            Endianness::Little => encode_with::<LittleEndian>(self),
        }
    }

    /// Converts every value to `target` with `as` semantics.
    ///
    /// Used to widen compact storage types (MATLAB writes integral doubles as
    /// miUINT8, for instance) to the type of the array class.
    pub fn cast(&self, target: DataType) -> Option<NumericData> {
        if self.data_type() == target {
            return Some(self.clone());
        }
        Some(match target {
            DataType::Int8 => NumericData::Int8(with_values!(self, v => v.iter().map(|&x| x as i8).collect())),
            DataType::UInt8 => NumericData::UInt8(with_values!(self, v => v.iter().map(|&x| x as u8).collect())),
            DataType::Int16 => NumericData::Int16(with_values!(self, v => v.iter().map(|&x| x as i16).collect())),
            DataType::UInt16 => NumericData::UInt16(with_values!(self, v => v.iter().map(|&x| x as u16).collect())),
            DataType::Int32 => NumericData::Int32(with_values!(self, v => v.iter().map(|&x| x as i32).collect())),
            DataType::UInt32 => NumericData::UInt32(with_values!(self, v => v.iter().map(|&x| x as u32).collect())),
            DataType::Int64 => NumericData::Int64(with_values!(self, v => v.iter().map(|&x| x as i64).collect())),
            DataType::UInt64 => NumericData::UInt64(with_values!(self, v => v.iter().map(|&x| x as u64).collect())),
            DataType::Single => NumericData::Single(with_values!(self, v => v.iter().map(|&x| x as f32).collect())),
            DataType::Double => NumericData::Double(with_values!(self, v => v.iter().map(|&x| x as f64).collect())),
            _ => return None,
        })
    }
}

fn decode_with<B: ByteOrder>(data_type: DataType, bytes: &[u8], size: usize) -> NumericData {
    let count = bytes.len() / size;
    match data_type {
        DataType::Int8 => NumericData::Int8(bytes.iter().map(|&b| b as i8).collect()),
        DataType::UInt8 => NumericData::UInt8(bytes.to_vec()),
        DataType::Int16 => {
            let mut out = vec![0; count];
            B::read_i16_into(bytes, &mut out);
            NumericData::Int16(out)
        }
        DataType::UInt16 => {
            let mut out = vec![0; count];
            B::read_u16_into(bytes, &mut out);
            NumericData::UInt16(out)
        }
        DataType::Int32 => {
            let mut out = vec![0; count];
            B::read_i32_into(bytes, &mut out);
            NumericData::Int32(out)
        }
        DataType::UInt32 => {
            let mut out = vec![0; count];
            B::read_u32_into(bytes, &mut out);
            NumericData::UInt32(out)
        }
        DataType::Int64 => {
            let mut out = vec![0; count];
            B::read_i64_into(bytes, &mut out);
            NumericData::Int64(out)
        }
        DataType::UInt64 => {
            let mut out = vec![0; count];
            B::read_u64_into(bytes, &mut out);
            NumericData::UInt64(out)
        }
        DataType::Single => {
            let mut out = vec![0.0; count];
            B::read_f32_into(bytes, &mut out);
            NumericData::Single(out)
        }
        // Callers only pass numeric types, so the remaining arm is miDOUBLE.
        _ => {
            let mut out = vec![0.0; count];
            B::read_f64_into(bytes, &mut out);
            NumericData::Double(out)
        }
    }
}

fn encode_with<B: ByteOrder>(data: &NumericData) -> Vec<u8> {
    let mut out = vec![0u8; data.byte_len()];
    match data {
        NumericData::Int8(v) => out.iter_mut().zip(v).for_each(|(o, &x)| *o = x as u8),
        NumericData::UInt8(v) => out.copy_from_slice(v),
        NumericData::Int16(v) => B::write_i16_into(v, &mut out),
        NumericData::UInt16(v) => B::write_u16_into(v, &mut out),
        NumericData::Int32(v) => B::write_i32_into(v, &mut out),
        NumericData::UInt32(v) => B::write_u32_into(v, &mut out),
        NumericData::Int64(v) => B::write_i64_into(v, &mut out),
        NumericData::UInt64(v) => B::write_u64_into(v, &mut out),
        NumericData::Single(v) => B::write_f32_into(v, &mut out),
        NumericData::Double(v) => B::write_f64_into(v, &mut out),
    }
    out
}
