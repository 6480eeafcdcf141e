//! miMATRIX payloads.
//!
//! # Payload Structure
//! ```text
//! [miUINT32] Array flags: class code, complex/global/logical bits, nzmax
//! [miINT32]  Dimensions, one i32 per dimension
//! [miINT8]   Array name
//! [numeric]  Real part, product(dims) values
//! [numeric]  Imaginary part, only for complex arrays
//! ```
//!
//! Each part is a complete tagged element. The parts carry no terminator, so
//! the decoder tracks the bytes consumed against the miMATRIX length and stops
//! exactly when that budget is spent.

use log::{debug, trace};

use super::element::{self, read_payload};
use super::tag::{self, TAG_LEN, Tag};
use crate::mat::codec::text;
use crate::mat::types::error::{MatError, Result};
use crate::mat::types::models::{ArrayFlags, DataType, Endianness, MatrixClass};
use crate::mat::types::value::{Matrix, NumericData};
use crate::mat::utils::ByteSource;

/// Byte budget of one miMATRIX payload.
struct Budget {
    start: u64,
    total: u64,
}

impl Budget {
    fn new(source: &ByteSource<'_>, length: u32) -> Self {
        Self { start: source.offset(), total: u64::from(length) }
    }

    fn consumed(&self, source: &ByteSource<'_>) -> u64 {
        source.offset() - self.start
    }

    fn remaining(&self, source: &ByteSource<'_>) -> Result<u64> {
        let consumed = self.consumed(source);
        self.total
            .checked_sub(consumed)
            .ok_or_else(|| MatError::length_mismatch("miMATRIX payload", self.total, consumed))
    }

    /// Reads the next sub-element tag, rejecting one that would overrun the budget.
    fn next_tag(&self, source: &mut ByteSource<'_>, order: Endianness) -> Result<Tag> {
        let remaining = self.remaining(source)?;
        if remaining < TAG_LEN {
            return Err(MatError::length_mismatch("miMATRIX sub-element tag", TAG_LEN, remaining));
        }
        let tag = tag::decode(source, order)?;
        if tag.framed_len() > remaining {
            return Err(MatError::length_mismatch("miMATRIX sub-element", remaining, tag.framed_len()));
        }
        Ok(tag)
    }
}

/// Decodes an miMATRIX payload of `length` bytes.
///
/// Cell, struct, object and sparse arrays are skipped to the end of their
/// payload and reported as [`MatError::UnsupportedClass`], which leaves the
/// stream on the next element.
pub fn decode(source: &mut ByteSource<'_>, length: u32, order: Endianness) -> Result<Matrix> {
    let budget = Budget::new(source, length);

    let flags = decode_flags(source, &budget, order)?;
    let dims = decode_dims(source, &budget, order)?;
    let name = decode_name(source, &budget, order)?;
    trace!("Matrix {:?}: {:?} dims={:?}", name, flags, dims);

    let Some(storage) = flags.class.storage_type() else {
        let rest = budget.remaining(source)?;
        debug!("Skipping {} bytes of unsupported {} array {:?}", rest, flags.class, name);
        source.skip(rest)?;
        return Err(MatError::UnsupportedClass { class: flags.class, name });
    };

    let numel = dims
        .iter()
        .try_fold(1u64, |acc, &d| acc.checked_mul(d as u64))
        .ok_or_else(|| MatError::InvalidDimensions(format!("{:?} overflows the element count", dims)))?;

    let real = if numel == 0 && budget.remaining(source)? == 0 {
        // Empty arrays may omit their data parts entirely.
        NumericData::empty(storage).unwrap_or(NumericData::Double(Vec::new()))
    } else {
        decode_part(source, &budget, flags.class, storage, numel, order, "matrix real part")?
    };

    let imag = if !flags.is_complex {
        None
    } else if numel == 0 && budget.remaining(source)? == 0 {
        NumericData::empty(storage)
    } else {
        Some(decode_part(source, &budget, flags.class, storage, numel, order, "matrix imaginary part")?)
    };

    let left = budget.remaining(source)?;
    if left != 0 {
        return Err(MatError::length_mismatch(
            "miMATRIX payload",
            budget.total,
            budget.consumed(source),
        ));
    }

    Ok(Matrix {
        class: flags.class,
        dims,
        name,
        is_complex: flags.is_complex,
        is_logical: flags.is_logical,
        is_global: flags.is_global,
        real,
        imag,
    })
}

fn decode_flags(source: &mut ByteSource<'_>, budget: &Budget, order: Endianness) -> Result<ArrayFlags> {
    let tag = budget.next_tag(source, order)?;
    if tag.data_type != DataType::UInt32 {
        return Err(MatError::InvalidArrayFlags(format!(
            "expected miUINT32, found {}",
            tag.data_type
        )));
    }
    let payload = read_payload(source, &tag)?;
    if payload.len() < 4 {
        return Err(MatError::InvalidArrayFlags(format!(
            "payload of {} bytes is too short",
            payload.len()
        )));
    }
    ArrayFlags::from_word(order.read_u32(&payload[..4]))
        .map_err(|code| MatError::InvalidArrayFlags(format!("unknown class code {}", code)))
}

fn decode_dims(source: &mut ByteSource<'_>, budget: &Budget, order: Endianness) -> Result<Vec<i32>> {
    let tag = budget.next_tag(source, order)?;
    if tag.data_type != DataType::Int32 {
        return Err(MatError::InvalidDimensions(format!(
            "expected miINT32, found {}",
            tag.data_type
        )));
    }
    let payload = read_payload(source, &tag)?;
    if payload.is_empty() || payload.len() % 4 != 0 {
        return Err(MatError::InvalidDimensions(format!(
            "payload of {} bytes is not a whole, non-empty list of miINT32 values",
            payload.len()
        )));
    }
    let dims: Vec<i32> = payload.chunks_exact(4).map(|c| order.read_u32(c) as i32).collect();
    if dims.iter().any(|&d| d < 0) {
        return Err(MatError::InvalidDimensions(format!("negative dimension in {:?}", dims)));
    }
    Ok(dims)
}

fn decode_name(source: &mut ByteSource<'_>, budget: &Budget, order: Endianness) -> Result<String> {
    let offset = source.offset();
    let tag = budget.next_tag(source, order)?;
    if !tag.data_type.is_integer() {
        return Err(MatError::UnsupportedType { code: tag.data_type.code(), offset });
    }
    let payload = read_payload(source, &tag)?;
    Ok(payload.into_iter().map(char::from).collect())
}

/// Decodes a real or imaginary part and converts it to the class's type.
fn decode_part(
    source: &mut ByteSource<'_>,
    budget: &Budget,
    class: MatrixClass,
    storage: DataType,
    numel: u64,
    order: Endianness,
    context: &'static str,
) -> Result<NumericData> {
    let offset = source.offset();
    let tag = budget.next_tag(source, order)?;
    let payload = read_payload(source, &tag)?;

    let data = if class == MatrixClass::Char && tag.data_type.is_text() {
        NumericData::UInt16(text::decode_units(tag.data_type, &payload, order)?)
    } else if tag.data_type.is_numeric() {
        let stored = NumericData::from_bytes(tag.data_type, &payload, order)?;
        if tag.data_type != storage {
            trace!("Widening {} {} data to {}", class, tag.data_type, storage);
        }
        stored
            .cast(storage)
            .ok_or(MatError::UnsupportedType { code: storage.code(), offset })?
    } else {
        return Err(MatError::UnsupportedType { code: tag.data_type.code(), offset });
    };

    if data.len() as u64 != numel {
        let size = tag.data_type.element_size().unwrap_or(1) as u64;
        return Err(MatError::length_mismatch(context, numel.saturating_mul(size), u64::from(tag.length)));
    }
    Ok(data)
}

/// Serializes the sub-elements of a matrix into an miMATRIX payload.
///
/// Data parts are written in the class's own storage type. The payload length
/// is the sum of the framed sub-element lengths, which are all 8-byte aligned.
pub fn encode_payload(matrix: &Matrix, order: Endianness) -> Result<Vec<u8>> {
    matrix.validate()?;
    let storage = matrix.class.storage_type().ok_or_else(|| MatError::UnsupportedClass {
        class: matrix.class,
        name: matrix.name.clone(),
    })?;

    let name = matrix
        .name
        .chars()
        .map(u8::try_from)
        .collect::<std::result::Result<Vec<u8>, _>>()
        .map_err(|_| MatError::InvalidFormat(format!("Variable name {:?} is not 8-bit text", matrix.name)))?;

    let flags = ArrayFlags {
        class: matrix.class,
        is_complex: matrix.is_complex,
        is_global: matrix.is_global,
        is_logical: matrix.is_logical,
    };

    let mut payload = Vec::new();
    let mut written = 0;
    written += element::write_framed(
        &mut payload,
        DataType::UInt32,
        &NumericData::UInt32(vec![flags.to_word(), 0]).to_bytes(order),
        order,
    )?;
    written += element::write_framed(
        &mut payload,
        DataType::Int32,
        &NumericData::Int32(matrix.dims.clone()).to_bytes(order),
        order,
    )?;
    written += element::write_framed(&mut payload, DataType::Int8, &name, order)?;
    written += element::write_framed(&mut payload, storage, &matrix.real.to_bytes(order), order)?;
    if let Some(imag) = &matrix.imag {
        written += element::write_framed(&mut payload, storage, &imag.to_bytes(order), order)?;
    }
    debug_assert_eq!(written, payload.len() as u64);

    Ok(payload)
}
