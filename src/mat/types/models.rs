//! Core data structures for MAT-file format components.
//!
//! This module defines the fundamental types used throughout the library:
//! - The file header and its byte order
//! - Data type and array class enumerations
//! - The packed array flags word of a matrix

use std::fmt;

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use chrono::NaiveDateTime;

/// Byte order of every multi-byte field in a file, fixed by the header marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endianness {
    /// Marker "MI".
    Big,
    /// Marker "IM".
    Little,
}

impl Endianness {
    /// The two marker bytes stored at the end of the header.
    pub fn marker(self) -> [u8; 2] {
        match self {
            Endianness::Big => *b"MI",
            Endianness::Little => *b"IM",
        }
    }

    /// Resolves the marker bytes, or `None` for anything but "MI"/"IM".
    pub fn from_marker(marker: [u8; 2]) -> Option<Self> {
        match &marker {
            b"MI" => Some(Endianness::Big),
            b"IM" => Some(Endianness::Little),
            _ => None,
        }
    }

    pub fn read_u16(self, buf: &[u8]) -> u16 {
        match self {
            Endianness::Big => BigEndian::read_u16(buf),
            Endianness::Little => LittleEndian::read_u16(buf),
        }
    }

    pub fn read_u32(self, buf: &[u8]) -> u32 {
        match self {
            Endianness::Big => BigEndian::read_u32(buf),
            Endianness::Little => LittleEndian::read_u32(buf),
        }
    }

    pub fn write_u16(self, buf: &mut [u8], n: u16) {
        match self {
            Endianness::Big => BigEndian::write_u16(buf, n),
            Endianness::Little => LittleEndian::write_u16(buf, n),
        }
    }

    pub fn write_u32(self, buf: &mut [u8], n: u32) {
        match self {
            Endianness::Big => BigEndian::write_u32(buf, n),
            Endianness::Little => LittleEndian::write_u32(buf, n),
        }
    }
}

/// Parsed 128-byte preamble of a MAT-file.
///
/// Only level 5.0 files are representable. The header text is regenerated
/// from these fields when writing, so trailing free text after the timestamp
/// is not preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub level: String,
    pub platform: String,
    pub created: NaiveDateTime,
    pub byte_order: Endianness,
}

impl Header {
    /// Builds a level 5.0 header.
    pub fn new(platform: impl Into<String>, created: NaiveDateTime, byte_order: Endianness) -> Self {
        Self {
            level: super::LEVEL_5.to_string(),
            platform: platform.into(),
            created,
            byte_order,
        }
    }
}

impl fmt::Display for Header {
    /// Renders the header text without the trailing filler bytes.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MATLAB {} MAT-file, Platform: {}, Created on: {}",
            self.level,
            self.platform,
            self.created.format(super::TIMESTAMP_FORMAT)
        )
    }
}

/// MAT primitive data type codes carried by every tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Int8 = 1,
    UInt8 = 2,
    Int16 = 3,
    UInt16 = 4,
    Int32 = 5,
    UInt32 = 6,
    Single = 7,
    Double = 9,
    Int64 = 12,
    UInt64 = 13,
    Matrix = 14,
    Compressed = 15,
    Utf8 = 16,
    Utf16 = 17,
    Utf32 = 18,
}

impl DataType {
    pub fn code(self) -> u32 {
        self as u32
    }

    /// Size in bytes of one value, for the fixed-width numeric types.
    pub fn element_size(self) -> Option<usize> {
        match self {
            DataType::Int8 | DataType::UInt8 => Some(1),
            DataType::Int16 | DataType::UInt16 => Some(2),
            DataType::Int32 | DataType::UInt32 | DataType::Single => Some(4),
            DataType::Int64 | DataType::UInt64 | DataType::Double => Some(8),
            _ => None,
        }
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            DataType::Int8
                | DataType::UInt8
                | DataType::Int16
                | DataType::UInt16
                | DataType::Int32
                | DataType::UInt32
                | DataType::Int64
                | DataType::UInt64
        )
    }

    pub fn is_numeric(self) -> bool {
        self.element_size().is_some()
    }

    pub fn is_text(self) -> bool {
        matches!(self, DataType::Utf8 | DataType::Utf16 | DataType::Utf32)
    }
}

impl TryFrom<u32> for DataType {
    /// The unrecognized code.
    type Error = u32;

    fn try_from(code: u32) -> std::result::Result<Self, u32> {
        Ok(match code {
            1 => Self::Int8,
            2 => Self::UInt8,
            3 => Self::Int16,
            4 => Self::UInt16,
            5 => Self::Int32,
            6 => Self::UInt32,
            7 => Self::Single,
            9 => Self::Double,
            12 => Self::Int64,
            13 => Self::UInt64,
            14 => Self::Matrix,
            15 => Self::Compressed,
            16 => Self::Utf8,
            17 => Self::Utf16,
            18 => Self::Utf32,
            _ => return Err(code),
        })
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Int8 => "miINT8",
            DataType::UInt8 => "miUINT8",
            DataType::Int16 => "miINT16",
            DataType::UInt16 => "miUINT16",
            DataType::Int32 => "miINT32",
            DataType::UInt32 => "miUINT32",
            DataType::Single => "miSINGLE",
            DataType::Double => "miDOUBLE",
            DataType::Int64 => "miINT64",
            DataType::UInt64 => "miUINT64",
            DataType::Matrix => "miMATRIX",
            DataType::Compressed => "miCOMPRESSED",
            DataType::Utf8 => "miUTF8",
            DataType::Utf16 => "miUTF16",
            DataType::Utf32 => "miUTF32",
        };
        f.write_str(name)
    }
}

/// MATLAB array classes (mxClass) stored in the array flags word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatrixClass {
    Cell = 1,
    Struct = 2,
    Object = 3,
    Char = 4,
    Sparse = 5,
    Double = 6,
    Single = 7,
    Int8 = 8,
    UInt8 = 9,
    Int16 = 10,
    UInt16 = 11,
    Int32 = 12,
    UInt32 = 13,
    Int64 = 14,
    UInt64 = 15,
}

impl MatrixClass {
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Data type the class's values are held in, both in memory and as the
    /// canonical storage type when writing.
    ///
    /// `None` for the aggregate and sparse classes, whose payloads are not decoded.
    pub fn storage_type(self) -> Option<DataType> {
        match self {
            MatrixClass::Double => Some(DataType::Double),
            MatrixClass::Single => Some(DataType::Single),
            MatrixClass::Int8 => Some(DataType::Int8),
            MatrixClass::UInt8 => Some(DataType::UInt8),
            MatrixClass::Int16 => Some(DataType::Int16),
            MatrixClass::UInt16 => Some(DataType::UInt16),
            MatrixClass::Int32 => Some(DataType::Int32),
            MatrixClass::UInt32 => Some(DataType::UInt32),
            MatrixClass::Int64 => Some(DataType::Int64),
            MatrixClass::UInt64 => Some(DataType::UInt64),
            MatrixClass::Char => Some(DataType::UInt16),
            MatrixClass::Cell | MatrixClass::Struct | MatrixClass::Object | MatrixClass::Sparse => None,
        }
    }
}

impl TryFrom<u8> for MatrixClass {
    /// The unrecognized class code.
    type Error = u8;

    fn try_from(code: u8) -> std::result::Result<Self, u8> {
        Ok(match code {
            1 => Self::Cell,
            2 => Self::Struct,
            3 => Self::Object,
            4 => Self::Char,
            5 => Self::Sparse,
            6 => Self::Double,
            7 => Self::Single,
            8 => Self::Int8,
            9 => Self::UInt8,
            10 => Self::Int16,
            11 => Self::UInt16,
            12 => Self::Int32,
            13 => Self::UInt32,
            14 => Self::Int64,
            15 => Self::UInt64,
            _ => return Err(code),
        })
    }
}

impl fmt::Display for MatrixClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MatrixClass::Cell => "mxCELL",
            MatrixClass::Struct => "mxSTRUCT",
            MatrixClass::Object => "mxOBJECT",
            MatrixClass::Char => "mxCHAR",
            MatrixClass::Sparse => "mxSPARSE",
            MatrixClass::Double => "mxDOUBLE",
            MatrixClass::Single => "mxSINGLE",
            MatrixClass::Int8 => "mxINT8",
            MatrixClass::UInt8 => "mxUINT8",
            MatrixClass::Int16 => "mxINT16",
            MatrixClass::UInt16 => "mxUINT16",
            MatrixClass::Int32 => "mxINT32",
            MatrixClass::UInt32 => "mxUINT32",
            MatrixClass::Int64 => "mxINT64",
            MatrixClass::UInt64 => "mxUINT64",
        };
        f.write_str(name)
    }
}

/// Contents of the array flags sub-element of a matrix.
///
/// The first flags word packs the class code in bits 0-7 and the
/// complex (0x0800), global (0x0400) and logical (0x0200) bits above it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrayFlags {
    pub class: MatrixClass,
    pub is_complex: bool,
    pub is_global: bool,
    pub is_logical: bool,
}

impl ArrayFlags {
    pub const COMPLEX: u32 = 0x0800;
    pub const GLOBAL: u32 = 0x0400;
    pub const LOGICAL: u32 = 0x0200;

    /// Unpacks the flags word. `Err` carries the unknown class code.
    pub fn from_word(word: u32) -> std::result::Result<Self, u8> {
        let class = MatrixClass::try_from((word & 0xFF) as u8)?;
        Ok(Self {
            class,
            is_complex: word & Self::COMPLEX != 0,
            is_global: word & Self::GLOBAL != 0,
            is_logical: word & Self::LOGICAL != 0,
        })
    }

    pub fn to_word(self) -> u32 {
        let mut word = u32::from(self.class.code());
        if self.is_complex {
            word |= Self::COMPLEX;
        }
        if self.is_global {
            word |= Self::GLOBAL;
        }
        if self.is_logical {
            word |= Self::LOGICAL;
        }
        word
    }
}
