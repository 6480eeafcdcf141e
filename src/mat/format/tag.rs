//! Data element tags.
//!
//! Every element starts with an 8-byte tag in one of two layouts:
//!
//! ```text
//! Regular:  [type: u32][length: u32]            payload follows, padded to 8
//! Small:    [length: u16 | type: u16][inline: 4 bytes]   no further bytes
//! ```
//!
//! The small layout is recognized by a non-zero upper half in the first word,
//! read in the file's byte order.

use std::io::Write;

use log::trace;

use crate::mat::types::error::{MatError, Result};
use crate::mat::types::models::{DataType, Endianness};
use crate::mat::utils::{self, ByteSource};

/// Size of a tag in either layout.
pub const TAG_LEN: u64 = 8;

/// Largest payload that fits in a small data element.
pub const SMALL_MAX_LEN: u32 = 4;

/// A decoded element tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag {
    pub data_type: DataType,
    pub length: u32,
    /// Payload bytes embedded in a small-element tag; `None` for the regular layout.
    pub inline: Option<[u8; 4]>,
}

impl Tag {
    pub fn regular(data_type: DataType, length: u32) -> Self {
        Self { data_type, length, inline: None }
    }

    /// Chooses the layout a canonical encoder would use for `payload`.
    ///
    /// Payloads of 1 to 4 bytes are inlined. An empty payload keeps the regular
    /// layout, since a zero-length small tag would read back as a regular one.
    pub fn for_payload(data_type: DataType, payload: &[u8]) -> Result<Self> {
        let length = u32::try_from(payload.len())
            .map_err(|_| MatError::InvalidFormat(format!("{} payload of {} bytes exceeds 4 GiB", data_type, payload.len())))?;
        if (1..=SMALL_MAX_LEN).contains(&length) && data_type.code() <= u32::from(u16::MAX) {
            let mut inline = [0u8; 4];
            inline[..payload.len()].copy_from_slice(payload);
            Ok(Self { data_type, length, inline: Some(inline) })
        } else {
            Ok(Self::regular(data_type, length))
        }
    }

    pub fn is_small(&self) -> bool {
        self.inline.is_some()
    }

    /// Alignment padding that follows the payload of this tag.
    pub fn padding(&self) -> u64 {
        match self.data_type {
            _ if self.is_small() => 0,
            DataType::Compressed => 0,
            _ => utils::padding_for(u64::from(self.length)),
        }
    }

    /// Bytes this element occupies in the stream: tag, payload and padding.
    pub fn framed_len(&self) -> u64 {
        if self.is_small() {
            TAG_LEN
        } else {
            TAG_LEN + u64::from(self.length) + self.padding()
        }
    }

    /// The inline payload trimmed to the declared length.
    pub fn inline_payload(&self) -> Option<&[u8]> {
        self.inline.as_ref().map(|bytes| &bytes[..self.length as usize])
    }
}

/// Reads one tag.
///
/// # Errors
/// - [`MatError::TruncatedRead`] if fewer than 8 bytes remain
/// - [`MatError::UnsupportedType`] for an unknown type code
/// - [`MatError::InvalidFormat`] for a small tag longer than 4 bytes
pub fn decode(source: &mut ByteSource<'_>, order: Endianness) -> Result<Tag> {
    let start = source.offset();
    let mut buf = [0u8; 8];
    source.read_exact(&mut buf)?;
    parse(buf, start, order)
}

/// Reads one tag, or returns `None` if the stream ends cleanly before it.
pub fn decode_or_eof(source: &mut ByteSource<'_>, order: Endianness) -> Result<Option<Tag>> {
    let start = source.offset();
    let mut buf = [0u8; 8];
    if !source.read_exact_or_eof(&mut buf)? {
        return Ok(None);
    }
    parse(buf, start, order).map(Some)
}

fn parse(buf: [u8; 8], offset: u64, order: Endianness) -> Result<Tag> {
    let first = order.read_u32(&buf[0..4]);
    let small_len = first >> 16;

    let tag = if small_len != 0 {
        let code = first & 0xFFFF;
        if small_len > SMALL_MAX_LEN {
            return Err(MatError::InvalidFormat(format!(
                "Small element at offset {} declares {} bytes (maximum is {})",
                offset, small_len, SMALL_MAX_LEN
            )));
        }
        let data_type = DataType::try_from(code).map_err(|code| MatError::UnsupportedType { code, offset })?;
        let mut inline = [0u8; 4];
        inline.copy_from_slice(&buf[4..8]);
        trace!(
            "Small tag at {}: {} length={} inline={}",
            offset,
            data_type,
            small_len,
            hex::encode(&inline[..small_len as usize])
        );
        Tag { data_type, length: small_len, inline: Some(inline) }
    } else {
        let data_type = DataType::try_from(first).map_err(|code| MatError::UnsupportedType { code, offset })?;
        let length = order.read_u32(&buf[4..8]);
        trace!("Tag at {}: {} length={}", offset, data_type, length);
        Tag::regular(data_type, length)
    };

    Ok(tag)
}

/// Writes one tag; a small tag also writes its inline payload.
pub fn encode<W: Write>(writer: &mut W, tag: &Tag, order: Endianness) -> Result<()> {
    let mut buf = [0u8; 8];
    match tag.inline {
        Some(inline) => {
            if tag.length == 0 || tag.length > SMALL_MAX_LEN {
                return Err(MatError::InvalidFormat(format!(
                    "Small element cannot hold {} bytes",
                    tag.length
                )));
            }
            order.write_u32(&mut buf[0..4], (tag.length << 16) | tag.data_type.code());
            buf[4..8].copy_from_slice(&inline);
        }
        None => {
            order.write_u32(&mut buf[0..4], tag.data_type.code());
            order.write_u32(&mut buf[4..8], tag.length);
        }
    }
    writer.write_all(&buf)?;
    Ok(())
}
