use std::io::Write;

use flate2::Compression;
use log::{debug, info};

use super::codec::compression;
use super::format::{element, header};
use super::types::error::{MatError, Result};
use super::types::models::{Endianness, Header};
use super::types::value::{Element, Value};

/// Sequential writer producing a MAT-file stream.
///
/// Mirrors [`MatReader`](crate::MatReader): the header is written first and
/// fixes the byte order of every element written after it.
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use mat5_codec::{Endianness, Header, Matrix, MatrixClass, MatWriter, NumericData, Element};
///
/// let created = NaiveDate::from_ymd_opt(2013, 2, 18).unwrap().and_hms_opt(17, 12, 8).unwrap();
/// let mut writer = MatWriter::new(Vec::new());
/// writer.write_header(&Header::new("posix", created, Endianness::Little))?;
///
/// let x = Matrix::new("x", MatrixClass::Double, vec![1, 2], NumericData::Double(vec![1.0, 2.0]))?;
/// writer.write_element(&Element::matrix(x))?;
/// let bytes = writer.into_inner();
/// assert_eq!(bytes.len() % 8, 0);
/// # Ok::<(), mat5_codec::MatError>(())
/// ```
#[derive(Debug)]
pub struct MatWriter<W: Write> {
    inner: W,
    byte_order: Option<Endianness>,
    compression: Option<Compression>,
    written: u64,
}

impl<W: Write> MatWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, byte_order: None, compression: None, written: 0 }
    }

    /// Wraps every element passed to [`write_element`](Self::write_element)
    /// in an miCOMPRESSED envelope deflated at `level`, as MATLAB v7 does.
    pub fn with_compression(mut self, level: Compression) -> Self {
        self.compression = Some(level);
        self
    }

    /// Writes the 128-byte header and adopts its byte order.
    pub fn write_header(&mut self, header: &Header) -> Result<()> {
        header::encode(&mut self.inner, header)?;
        self.byte_order = Some(header.byte_order);
        self.written += header::HEADER_LEN as u64;
        info!("Writing MAT-file stream: {}", header);
        Ok(())
    }

    /// Writes one top-level element, returning the bytes written.
    ///
    /// With compression enabled, elements that are not already compressed are
    /// wrapped in an envelope.
    ///
    /// # Errors
    /// - [`MatError::HeaderNotWritten`] before [`write_header`](Self::write_header)
    /// - [`MatError::InvalidFormat`] if the value does not fit its declared type
    pub fn write_element(&mut self, element: &Element) -> Result<u64> {
        let order = self.byte_order.ok_or(MatError::HeaderNotWritten)?;
        let written = match (self.compression, &element.value) {
            (Some(level), value) if !matches!(value, Value::Compressed(_)) => {
                compression::encode(&mut self.inner, element, order, level)?
            }
            _ => element::encode(&mut self.inner, element, order)?,
        };
        debug!("Wrote {} element at offset {} ({} bytes)", element.data_type, self.written, written);
        self.written += written;
        Ok(written)
    }

    /// Writes one element inside an miCOMPRESSED envelope, whatever the
    /// writer's compression setting.
    pub fn write_compressed(&mut self, element: &Element) -> Result<u64> {
        let order = self.byte_order.ok_or(MatError::HeaderNotWritten)?;
        let level = self.compression.unwrap_or_default();
        let written = compression::encode(&mut self.inner, element, order, level)?;
        debug!("Wrote compressed {} element at offset {} ({} bytes)", element.data_type, self.written, written);
        self.written += written;
        Ok(written)
    }

    /// Total bytes written so far, header included.
    pub fn bytes_written(&self) -> u64 {
        self.written
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}
