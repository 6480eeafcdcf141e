//! The miCOMPRESSED envelope.
//!
//! An miCOMPRESSED element carries no value of its own: its payload is a zlib
//! stream whose inflated bytes hold one complete element, tag included.
//! Compressed envelopes are not followed by alignment padding.

use std::io::{self, Read, Write};

use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use log::{debug, trace};

use crate::mat::format::element;
use crate::mat::format::tag::{self, TAG_LEN, Tag};
use crate::mat::types::error::{MatError, Result};
use crate::mat::types::models::{DataType, Endianness};
use crate::mat::types::value::Element;
use crate::mat::utils::{ByteSource, map_read_error};

/// Decodes the element held in the next `length` compressed bytes.
///
/// All `length` bytes are consumed before returning, also when the nested
/// element fails to decode, so that the outer stream stays on a tag boundary.
///
/// # Errors
/// - [`MatError::CompressedStream`] if the zlib data is corrupt or shorter than declared
/// - any structural error of the nested element
pub fn decode(source: &mut ByteSource<'_>, length: u32, order: Endianness) -> Result<Element> {
    let start = source.offset();
    debug!("Inflating miCOMPRESSED element at offset {} ({} bytes)", start, length);

    let mut limited = source.by_ref().take(u64::from(length));
    let nested = {
        let mut decoder = ZlibDecoder::new(&mut limited);
        let nested = {
            let mut inflated = ByteSource::new(&mut decoder);
            element::decode_from(&mut inflated, order)
        };
        // Run the inflater to the end of its stream so the zlib checksum is verified.
        nested.and_then(|element| {
            let extra = io::copy(&mut decoder, &mut io::sink()).map_err(map_read_error)?;
            if extra > 0 {
                debug!("Ignoring {} inflated bytes after the nested element", extra);
            }
            Ok(element)
        })
    };
    let nested = nested.map_err(MatError::into_compressed);

    let drained = io::copy(&mut limited, &mut io::sink()).map_err(map_read_error);
    let missing = limited.limit();
    let element = nested?;
    let drained = drained?;
    if drained > 0 {
        trace!("Skipped {} compressed bytes after the zlib stream", drained);
    }
    if missing > 0 {
        return Err(MatError::CompressedStream(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!(
                "compressed element at offset {} declares {} bytes, stream ended {} bytes early",
                start, length, missing
            ),
        )));
    }

    trace!("Inflated {} element from offset {}", element.data_type, start);
    Ok(element)
}

/// Writes `inner` inside an miCOMPRESSED envelope, returning the bytes written.
pub fn encode<W: Write>(writer: &mut W, inner: &Element, order: Endianness, level: Compression) -> Result<u64> {
    if inner.data_type == DataType::Compressed {
        return Err(MatError::InvalidFormat(
            "miCOMPRESSED elements cannot be nested".to_string(),
        ));
    }

    let mut encoder = ZlibEncoder::new(Vec::new(), level);
    let plain_len = element::encode(&mut encoder, inner, order)?;
    let compressed = encoder.finish()?;
    let length = u32::try_from(compressed.len()).map_err(|_| {
        MatError::InvalidFormat(format!("Compressed payload of {} bytes exceeds 4 GiB", compressed.len()))
    })?;
    debug!("Deflated {} element: {} -> {} bytes", inner.data_type, plain_len, length);

    tag::encode(writer, &Tag::regular(DataType::Compressed, length), order)?;
    writer.write_all(&compressed)?;
    Ok(TAG_LEN + u64::from(length))
}
