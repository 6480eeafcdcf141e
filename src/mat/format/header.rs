//! MAT-file header parsing and serialization.
//!
//! # Header Structure
//! ```text
//! [116 bytes] Descriptive text, padded with spaces:
//!             "MATLAB 5.0 MAT-file, Platform: <p>, Created on: <Www Mmm dd HH:MM:SS yyyy>"
//! [  8 bytes] Subsystem data offset (unused, written as zeros)
//! [  2 bytes] Version (0x0100, in file byte order)
//! [  2 bytes] Endian indicator: "MI" big-endian, "IM" little-endian
//! ```

use std::io::{Read, Write};

use chrono::NaiveDateTime;
use log::{debug, info};

use crate::mat::types::error::{MatError, Result};
use crate::mat::types::models::{Endianness, Header};
use crate::mat::types::{LEVEL_5, TIMESTAMP_FORMAT};
use crate::mat::utils::ByteSource;

pub const HEADER_LEN: usize = 128;
pub const TEXT_LEN: usize = 116;
pub const SUBSYS_OFFSET_LEN: usize = 8;
pub const VERSION: u16 = 0x0100;

const MAGIC: &str = "MATLAB ";
const PLATFORM_LABEL: &str = " Platform: ";
const CREATED_LABEL: &str = " Created on: ";
const TIMESTAMP_LEN: usize = 24;

/// Parses the 128-byte header from the start of a stream.
///
/// # Errors
/// - [`MatError::TruncatedRead`] if the stream holds fewer than 128 bytes
/// - [`MatError::InvalidMagic`] if the text does not start with `MATLAB `
/// - [`MatError::UnsupportedLevel`] for any level other than 5.0
/// - [`MatError::InvalidTimestamp`] if the creation date does not parse
/// - [`MatError::InvalidByteOrder`] for an endian indicator other than "MI"/"IM"
pub fn decode<R: Read>(reader: &mut R) -> Result<Header> {
    let mut source = ByteSource::new(reader);
    decode_from(&mut source)
}

pub(crate) fn decode_from(source: &mut ByteSource<'_>) -> Result<Header> {
    info!("Parsing MAT-file header");

    let mut buf = [0u8; HEADER_LEN];
    source.read_exact(&mut buf)?;

    let text = String::from_utf8_lossy(&buf[..TEXT_LEN]);
    let (level, platform, created) = parse_text(&text)?;

    // Bytes 124-125 hold the version, 126-127 the endian indicator.
    let marker = [buf[HEADER_LEN - 2], buf[HEADER_LEN - 1]];
    let byte_order = Endianness::from_marker(marker).ok_or_else(|| MatError::InvalidByteOrder {
        marker: String::from_utf8_lossy(&marker).into_owned(),
    })?;
    let version = byte_order.read_u16(&buf[HEADER_LEN - 4..HEADER_LEN - 2]);
    debug!("Header version field: {:#06x}", version);

    let header = Header { level, platform, created, byte_order };
    info!("Header parsed: {} ({:?} endian)", header, byte_order);
    Ok(header)
}

/// Splits the descriptive text into level, platform and creation time.
fn parse_text(text: &str) -> Result<(String, String, NaiveDateTime)> {
    let rest = text.strip_prefix(MAGIC).ok_or_else(|| MatError::InvalidMagic {
        found: text.chars().take(MAGIC.len()).collect(),
    })?;

    let (level, rest) = rest.split_once(' ').ok_or_else(|| malformed("level"))?;
    if level != LEVEL_5 {
        return Err(MatError::UnsupportedLevel(level.to_string()));
    }

    let rest = rest.strip_prefix("MAT-file").ok_or_else(|| malformed("MAT-file descriptor"))?;
    let rest = rest.strip_prefix(',').unwrap_or(rest);
    let rest = rest.strip_prefix(PLATFORM_LABEL).ok_or_else(|| malformed("platform label"))?;
    let (platform, rest) = rest.split_once(',').ok_or_else(|| malformed("platform"))?;
    let rest = rest.strip_prefix(CREATED_LABEL).ok_or_else(|| malformed("creation label"))?;

    let stamp: String = rest.chars().take(TIMESTAMP_LEN).collect();
    let stamp = stamp.trim();
    let created = NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).map_err(|source| MatError::InvalidTimestamp {
        text: stamp.to_string(),
        source,
    })?;

    Ok((level.to_string(), platform.to_string(), created))
}

fn malformed(field: &str) -> MatError {
    MatError::InvalidFormat(format!("Malformed header text: missing {}", field))
}

/// Writes the 128-byte header.
///
/// # Errors
/// - [`MatError::UnsupportedLevel`] if the header is not level 5.0
/// - [`MatError::InvalidFormat`] if the rendered text exceeds 116 bytes
pub fn encode<W: Write>(writer: &mut W, header: &Header) -> Result<()> {
    if header.level != LEVEL_5 {
        return Err(MatError::UnsupportedLevel(header.level.clone()));
    }
    if header.platform.contains(',') {
        return Err(MatError::InvalidFormat(format!(
            "Platform {:?} must not contain a comma",
            header.platform
        )));
    }

    let text = header.to_string();
    if text.len() > TEXT_LEN {
        return Err(MatError::InvalidFormat(format!(
            "Header text is {} bytes, at most {} fit",
            text.len(),
            TEXT_LEN
        )));
    }

    let mut buf = [b' '; HEADER_LEN];
    buf[..text.len()].copy_from_slice(text.as_bytes());
    buf[TEXT_LEN..TEXT_LEN + SUBSYS_OFFSET_LEN].fill(0);
    header.byte_order.write_u16(&mut buf[HEADER_LEN - 4..HEADER_LEN - 2], VERSION);
    buf[HEADER_LEN - 2..].copy_from_slice(&header.byte_order.marker());

    writer.write_all(&buf)?;
    debug!("Header written: {}", text);
    Ok(())
}
