//! Foundational data structures, error types, and format constants.

pub mod error;
pub mod models;
pub mod value;

/// The only MAT-file level this crate reads and writes.
pub const LEVEL_5: &str = "5.0";

/// `chrono` pattern of the header's creation timestamp (`Mon Feb 18 17:12:08 2013`).
pub const TIMESTAMP_FORMAT: &str = "%a %b %e %H:%M:%S %Y";
