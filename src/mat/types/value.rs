//! Decoded element values.
//!
//! Every payload shape the codec understands has exactly one case here, so
//! consumers match exhaustively instead of probing dynamic values.

use super::error::{MatError, Result};
use super::models::{DataType, MatrixClass};

/// A typed buffer of numeric values, one case per numeric [`DataType`].
#[derive(Debug, Clone, PartialEq)]
pub enum NumericData {
    Int8(Vec<i8>),
    UInt8(Vec<u8>),
    Int16(Vec<i16>),
    UInt16(Vec<u16>),
    Int32(Vec<i32>),
    UInt32(Vec<u32>),
    Int64(Vec<i64>),
    UInt64(Vec<u64>),
    Single(Vec<f32>),
    Double(Vec<f64>),
}

/// Applies an expression to the vector inside any [`NumericData`] case.
macro_rules! with_values {
    ($data:expr, $v:ident => $body:expr) => {
        match $data {
            NumericData::Int8($v) => $body,
            NumericData::UInt8($v) => $body,
            NumericData::Int16($v) => $body,
            NumericData::UInt16($v) => $body,
            NumericData::Int32($v) => $body,
            NumericData::UInt32($v) => $body,
            NumericData::Int64($v) => $body,
            NumericData::UInt64($v) => $body,
            NumericData::Single($v) => $body,
            NumericData::Double($v) => $body,
        }
    };
}
pub(crate) use with_values;

impl NumericData {
    pub fn data_type(&self) -> DataType {
        match self {
            NumericData::Int8(_) => DataType::Int8,
            NumericData::UInt8(_) => DataType::UInt8,
            NumericData::Int16(_) => DataType::Int16,
            NumericData::UInt16(_) => DataType::UInt16,
            NumericData::Int32(_) => DataType::Int32,
            NumericData::UInt32(_) => DataType::UInt32,
            NumericData::Int64(_) => DataType::Int64,
            NumericData::UInt64(_) => DataType::UInt64,
            NumericData::Single(_) => DataType::Single,
            NumericData::Double(_) => DataType::Double,
        }
    }

    pub fn len(&self) -> usize {
        with_values!(self, v => v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size of the encoded values in bytes.
    pub fn byte_len(&self) -> usize {
        self.len() * self.data_type().element_size().unwrap_or(0)
    }

    /// An empty buffer of the given numeric type.
    pub fn empty(data_type: DataType) -> Option<Self> {
        Some(match data_type {
            DataType::Int8 => NumericData::Int8(Vec::new()),
            DataType::UInt8 => NumericData::UInt8(Vec::new()),
            DataType::Int16 => NumericData::Int16(Vec::new()),
            DataType::UInt16 => NumericData::UInt16(Vec::new()),
            DataType::Int32 => NumericData::Int32(Vec::new()),
            DataType::UInt32 => NumericData::UInt32(Vec::new()),
            DataType::Int64 => NumericData::Int64(Vec::new()),
            DataType::UInt64 => NumericData::UInt64(Vec::new()),
            DataType::Single => NumericData::Single(Vec::new()),
            DataType::Double => NumericData::Double(Vec::new()),
            _ => return None,
        })
    }

    /// Value at `index` widened to `f64`.
    pub fn get_f64(&self, index: usize) -> Option<f64> {
        with_values!(self, v => v.get(index).map(|&x| x as f64))
    }

    /// All values widened to `f64`.
    pub fn to_f64_vec(&self) -> Vec<f64> {
        with_values!(self, v => v.iter().map(|&x| x as f64).collect())
    }
}

/// A MATLAB numeric or character array decoded from an miMATRIX element.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    pub class: MatrixClass,
    pub dims: Vec<i32>,
    pub name: String,
    pub is_complex: bool,
    pub is_logical: bool,
    pub is_global: bool,
    /// Values in column-major order, typed per `class` (char holds UTF-16 code units).
    pub real: NumericData,
    pub imag: Option<NumericData>,
}

impl Matrix {
    /// Builds a real, non-global matrix, validating the buffer against the class and shape.
    pub fn new(name: impl Into<String>, class: MatrixClass, dims: Vec<i32>, real: NumericData) -> Result<Self> {
        let matrix = Self {
            class,
            dims,
            name: name.into(),
            is_complex: false,
            is_logical: false,
            is_global: false,
            real,
            imag: None,
        };
        matrix.validate()?;
        Ok(matrix)
    }

    /// Builds a complex matrix from real and imaginary buffers of the same shape.
    pub fn complex(
        name: impl Into<String>,
        class: MatrixClass,
        dims: Vec<i32>,
        real: NumericData,
        imag: NumericData,
    ) -> Result<Self> {
        let matrix = Self {
            class,
            dims,
            name: name.into(),
            is_complex: true,
            is_logical: false,
            is_global: false,
            real,
            imag: Some(imag),
        };
        matrix.validate()?;
        Ok(matrix)
    }

    /// Builds a 1xN char matrix from text.
    ///
    /// # Errors
    /// [`MatError::InvalidDimensions`] if the text has more UTF-16 code units than an `i32` dimension holds.
    pub fn from_text(name: impl Into<String>, text: &str) -> Result<Self> {
        let name = name.into();
        let units: Vec<u16> = text.encode_utf16().collect();
        let len = i32::try_from(units.len()).map_err(|_| {
            MatError::InvalidDimensions(format!("{} code units of text for variable {:?}", units.len(), name))
        })?;
        Ok(Self {
            class: MatrixClass::Char,
            dims: vec![1, len],
            name,
            is_complex: false,
            is_logical: false,
            is_global: false,
            real: NumericData::UInt16(units),
            imag: None,
        })
    }

    /// Total element count, the product of `dims`, saturating at `usize::MAX`.
    pub fn numel(&self) -> usize {
        self.checked_numel()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(usize::MAX)
    }

    fn checked_numel(&self) -> Option<u64> {
        self.dims
            .iter()
            .try_fold(1u64, |acc, &d| acc.checked_mul(u64::try_from(d).ok()?))
    }

    /// Real part of the element at a column-major linear index, widened to `f64`.
    pub fn get(&self, index: usize) -> Option<f64> {
        self.real.get_f64(index)
    }

    /// Text of a char matrix, read in column-major order.
    pub fn to_text(&self) -> Option<String> {
        match (&self.class, &self.real) {
            (MatrixClass::Char, NumericData::UInt16(units)) => Some(String::from_utf16_lossy(units)),
            _ => None,
        }
    }

    /// Checks the invariants the encoder relies on.
    pub fn validate(&self) -> Result<()> {
        let storage = self.class.storage_type().ok_or_else(|| MatError::UnsupportedClass {
            class: self.class,
            name: self.name.clone(),
        })?;
        if self.dims.is_empty() || self.dims.iter().any(|&d| d < 0) {
            return Err(MatError::InvalidDimensions(format!(
                "{:?} for variable {:?}",
                self.dims, self.name
            )));
        }
        if self.is_complex != self.imag.is_some() {
            return Err(MatError::InvalidArrayFlags(format!(
                "complex flag is {} but imaginary part is {}",
                self.is_complex,
                if self.imag.is_some() { "present" } else { "absent" }
            )));
        }
        let size = storage.element_size().unwrap_or(0) as u64;
        let expected = self
            .checked_numel()
            .and_then(|n| n.checked_mul(size))
            .ok_or_else(|| {
                MatError::InvalidDimensions(format!(
                    "{:?} for variable {:?} overflows the element count",
                    self.dims, self.name
                ))
            })?;
        for part in std::iter::once(&self.real).chain(self.imag.as_ref()) {
            if part.data_type() != storage {
                return Err(MatError::InvalidFormat(format!(
                    "{} data of variable {:?} must be {}, found {}",
                    self.class,
                    self.name,
                    storage,
                    part.data_type()
                )));
            }
            if part.byte_len() as u64 != expected {
                return Err(MatError::length_mismatch("matrix data", expected, part.byte_len() as u64));
            }
        }
        Ok(())
    }
}

/// Payload of a decoded element.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A single signed integer (miINT8 to miINT64 payload of one value).
    Int(i64),
    /// A single unsigned integer (miUINT8 to miUINT64 payload of one value).
    UInt(u64),
    /// A single miSINGLE or miDOUBLE value.
    Float(f64),
    /// Any other count of numeric values, including none.
    Array(NumericData),
    /// Character data of miUTF8, miUTF16 or miUTF32 elements.
    Text(String),
    Matrix(Matrix),
    /// An element to be written inside a compression envelope.
    Compressed(Box<Element>),
}

/// A typed data element: the unit read from and written to the element stream.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub data_type: DataType,
    pub value: Value,
}

impl Element {
    /// Wraps numeric values, collapsing a single value into its scalar case.
    pub fn numeric(data: NumericData) -> Self {
        let data_type = data.data_type();
        let value = if data.len() == 1 {
            match &data {
                NumericData::Int8(v) => Value::Int(i64::from(v[0])),
                NumericData::Int16(v) => Value::Int(i64::from(v[0])),
                NumericData::Int32(v) => Value::Int(i64::from(v[0])),
                NumericData::Int64(v) => Value::Int(v[0]),
                NumericData::UInt8(v) => Value::UInt(u64::from(v[0])),
                NumericData::UInt16(v) => Value::UInt(u64::from(v[0])),
                NumericData::UInt32(v) => Value::UInt(u64::from(v[0])),
                NumericData::UInt64(v) => Value::UInt(v[0]),
                NumericData::Single(v) => Value::Float(f64::from(v[0])),
                NumericData::Double(v) => Value::Float(v[0]),
            }
        } else {
            Value::Array(data)
        };
        Self { data_type, value }
    }

    pub fn text(data_type: DataType, text: impl Into<String>) -> Self {
        Self { data_type, value: Value::Text(text.into()) }
    }

    pub fn matrix(matrix: Matrix) -> Self {
        Self { data_type: DataType::Matrix, value: Value::Matrix(matrix) }
    }

    pub fn compressed(inner: Element) -> Self {
        Self { data_type: DataType::Compressed, value: Value::Compressed(Box::new(inner)) }
    }

    pub fn as_matrix(&self) -> Option<&Matrix> {
        match &self.value {
            Value::Matrix(m) => Some(m),
            _ => None,
        }
    }

    /// Variable name, for matrix elements.
    pub fn name(&self) -> Option<&str> {
        self.as_matrix().map(|m| m.name.as_str())
    }
}
