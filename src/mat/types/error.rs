//! Custom error types for the mat5-codec crate.

use std::io;

use thiserror::Error;

use super::models::MatrixClass;

/// The primary error type for all operations in this crate.
#[derive(Debug, Error)]
pub enum MatError {
    /// An error originating from I/O operations on the underlying stream.
    #[error("I/O error: {0:?}")]
    Io(#[from] io::Error),

    /// The header text does not start with the `MATLAB ` descriptor.
    #[error("Not a MAT-file: header text starts with {found:?}")]
    InvalidMagic { found: String },

    /// The header declares a level other than 5.0 (e.g. a v7.3 HDF5 file).
    #[error("Unsupported MAT-file level: {0}. Only level 5.0 is supported.")]
    UnsupportedLevel(String),

    /// The creation timestamp in the header text could not be parsed.
    #[error("Invalid header timestamp {text:?}: {source}")]
    InvalidTimestamp {
        text: String,
        #[source]
        source: chrono::ParseError,
    },

    /// The 2-byte endian indicator is neither "MI" nor "IM".
    #[error("Invalid byte order marker: {marker:?}")]
    InvalidByteOrder { marker: String },

    /// The stream ended before a declared number of bytes could be read.
    #[error("Truncated read at offset {offset}: expected {expected} bytes, but found {found} bytes")]
    TruncatedRead { offset: u64, expected: u64, found: u64 },

    /// A tag carries a data type code that is unknown or cannot appear here.
    #[error("Unsupported data type {code} at offset {offset}")]
    UnsupportedType { code: u32, offset: u64 },

    /// A matrix uses a class whose payload decoding is not supported.
    #[error("Unsupported array class {class} for variable {name:?}")]
    UnsupportedClass { class: MatrixClass, name: String },

    /// The array flags sub-element of a matrix is malformed.
    #[error("Invalid array flags: {0}")]
    InvalidArrayFlags(String),

    /// The dimensions sub-element of a matrix is malformed.
    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),

    /// A declared payload size disagrees with the data it should contain.
    #[error("Length mismatch for {context}: expected {expected} bytes, but found {found} bytes")]
    LengthMismatch {
        context: &'static str,
        expected: u64,
        found: u64,
    },

    /// The zlib stream inside an miCOMPRESSED element is corrupt or truncated.
    #[error("Compressed stream error: {0}")]
    CompressedStream(#[source] io::Error),

    /// The data is structurally invalid for reasons not covered above.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// An element was written before the file header.
    #[error("Header must be written before any element")]
    HeaderNotWritten,

    /// A read was aborted through a cancel token or deadline.
    #[error("Read cancelled")]
    Cancelled,
}

impl MatError {
    /// Create a LengthMismatch error.
    pub fn length_mismatch(context: &'static str, expected: u64, found: u64) -> Self {
        Self::LengthMismatch { context, expected, found }
    }

    /// Wrap an error raised while reading an inflated sub-stream.
    ///
    /// Short reads and raw I/O failures inside the envelope are reported as
    /// compression failures; structural errors of the nested element pass through.
    pub(crate) fn into_compressed(self) -> Self {
        match self {
            Self::Io(e) => Self::CompressedStream(e),
            Self::TruncatedRead { offset, expected, found } => Self::CompressedStream(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "inflated stream ended at offset {}: expected {} bytes, found {}",
                    offset, expected, found
                ),
            )),
            other => other,
        }
    }

    /// Whether the stream is still positioned on a tag boundary after this error.
    pub fn is_resumable(&self) -> bool {
        matches!(self, Self::UnsupportedClass { .. })
    }
}

/// A convenience `Result` type alias using the crate's `MatError` type.
pub type Result<T> = std::result::Result<T, MatError>;
