//! Codec layer for payload transformations.
//!
//! # Submodules
//!
//! - [`compression`][]: The zlib envelope of miCOMPRESSED elements
//! - [`numeric`][]: Typed numeric buffers in either byte order
//! - [`text`][]: miUTF8, miUTF16 and miUTF32 character data

pub mod compression;
pub mod numeric;
pub mod text;
