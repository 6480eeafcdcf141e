use std::io::Read;

use log::{debug, info};

use super::format::{element, header, tag};
use super::iter::ElementIterator;
use super::types::error::Result;
use super::types::models::{Endianness, Header};
use super::types::value::Element;
use super::utils::ByteSource;

/// Sequential reader over the elements of a MAT-file stream.
///
/// The header is parsed when the reader is created; its byte order is then
/// applied to every element read from the same stream. The reader never
/// seeks, so any `Read` works, including sockets and decompressors.
#[derive(Debug)]
pub struct MatReader<R: Read> {
    inner: R,
    header: Header,
    /// Absolute offset of the next unread byte.
    offset: u64,
}

impl<R: Read> MatReader<R> {
    /// Parses the header from the start of `inner` and positions the reader
    /// on the first element.
    ///
    /// # Errors
    /// Returns an error if the stream is shorter than a header or the header
    /// is not a valid level 5 header.
    pub fn new(mut inner: R) -> Result<Self> {
        let mut source = ByteSource::new(&mut inner);
        let header = header::decode_from(&mut source)?;
        let offset = source.offset();
        info!("Opened MAT-file stream: {}", header);
        Ok(Self { inner, header, offset })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn byte_order(&self) -> Endianness {
        self.header.byte_order
    }

    /// Absolute stream offset of the next element.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Reads the next top-level element.
    ///
    /// Returns `Ok(None)` when the stream ends cleanly on an element boundary.
    /// Compressed elements are inflated and their nested element returned.
    ///
    /// After an error the reader is only usable again if
    /// [`MatError::is_resumable`](crate::MatError::is_resumable) holds.
    pub fn next_element(&mut self) -> Result<Option<Element>> {
        let order = self.header.byte_order;
        let mut source = ByteSource::at(&mut self.inner, self.offset);
        let result = match tag::decode_or_eof(&mut source, order) {
            Ok(Some(tag)) => element::decode_tagged(&mut source, tag, order).map(Some),
            Ok(None) => Ok(None),
            Err(e) => Err(e),
        };
        let start = self.offset;
        self.offset = source.offset();
        match &result {
            Ok(Some(element)) => debug!("Read {} element at offset {}", element.data_type, start),
            Ok(None) => debug!("End of stream at offset {}", start),
            Err(e) => debug!("Failed to read element at offset {}: {}", start, e),
        }
        result
    }

    /// Returns an iterator over the remaining top-level elements.
    pub fn elements(&mut self) -> ElementIterator<'_, R> {
        ElementIterator::new(self)
    }

    /// Reads the remaining elements, stopping at the first error.
    pub fn read_all(&mut self) -> Result<Vec<Element>> {
        self.elements().collect()
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}
