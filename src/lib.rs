//! # mat5-codec
//!
//! A streaming reader and writer for MATLAB Level 5 MAT-files (`.mat`).
//! Supports both byte orders, small data elements, zlib-compressed (v7)
//! elements, and numeric and character arrays.
//!
//! **Note:** Cell, struct, object and sparse arrays are recognized but not
//! decoded; they surface as [`MatError::UnsupportedClass`].
pub mod mat;

// Re-export the main types for convenience
pub use mat::{
    MatError,
    MatReader,
    MatWriter,
    Result,
    cancel::{CancelToken, CancellableReader},
    iter::ElementIterator,
    types::{
        models::{ArrayFlags, DataType, Endianness, Header, MatrixClass},
        value::{Element, Matrix, NumericData, Value},
    },
};
