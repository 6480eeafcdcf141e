//! Core MAT-file Level 5 codec module

pub mod cancel;
pub mod codec;
pub mod format;
pub mod iter;
pub mod reader;
pub mod types;
pub mod utils;
pub mod writer;

pub use reader::MatReader;
pub use types::error::{MatError, Result};
pub use writer::MatWriter;
