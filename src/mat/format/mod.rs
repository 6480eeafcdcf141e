//! Binary layout of MAT-file Level 5 streams.
//!
//! # Module Organization
//!
//! - [`header`]: The 128-byte preamble and the file's byte order
//! - [`tag`]: Regular and small data element tags
//! - [`element`]: Element dispatch, payload length and alignment padding
//! - [`matrix`]: The sub-elements of an miMATRIX payload
//!
//! # Architecture
//!
//! ```text
//! File Structure:
//! ┌─────────────────┐
//! │  Header (128 B) │ ← header::decode()
//! ├─────────────────┤
//! │  Tag            │ ← tag::decode()
//! │  Payload        │ ← element::decode()
//! │   ├ miMATRIX    │    → matrix::decode()
//! │   └ miCOMPRESSED│    → codec::compression::decode() → element::decode()
//! │  Padding        │
//! ├─────────────────┤
//! │  Tag ...        │
//! └─────────────────┘
//! ```

pub mod element;
pub mod header;
pub mod matrix;
pub mod tag;
