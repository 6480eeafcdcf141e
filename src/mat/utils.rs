//! Low-level byte reading utilities

use std::io::{self, Read};

use super::cancel::ReadCancelled;
use super::types::error::{MatError, Result};

/// Payloads are aligned on 8-byte boundaries.
pub const ALIGNMENT: u64 = 8;

/// Number of zero bytes that follow a payload of `len` bytes.
pub fn padding_for(len: u64) -> u64 {
    (ALIGNMENT - len % ALIGNMENT) % ALIGNMENT
}

/// A byte stream that tracks its absolute offset for error reporting.
///
/// Every decoder in the crate reads through this type. It wraps a trait
/// object so that the element decoder can recurse into an inflating view of
/// itself without growing a new generic instantiation per nesting level.
pub struct ByteSource<'a> {
    inner: &'a mut dyn Read,
    offset: u64,
}

impl<'a> ByteSource<'a> {
    pub fn new(inner: &'a mut dyn Read) -> Self {
        Self::at(inner, 0)
    }

    /// Wraps a reader already positioned `offset` bytes into its stream.
    pub fn at(inner: &'a mut dyn Read, offset: u64) -> Self {
        Self { inner, offset }
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Fills `buf` completely or fails with [`MatError::TruncatedRead`].
    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let start = self.offset;
        let filled = self.fill(buf)?;
        if filled < buf.len() {
            return Err(MatError::TruncatedRead {
                offset: start,
                expected: buf.len() as u64,
                found: filled as u64,
            });
        }
        Ok(())
    }

    /// Like [`read_exact`](Self::read_exact), but a stream that ends before
    /// the first byte yields `Ok(false)`.
    pub fn read_exact_or_eof(&mut self, buf: &mut [u8]) -> Result<bool> {
        let start = self.offset;
        let filled = self.fill(buf)?;
        match filled {
            0 if !buf.is_empty() => Ok(false),
            n if n == buf.len() => Ok(true),
            n => Err(MatError::TruncatedRead {
                offset: start,
                expected: buf.len() as u64,
                found: n as u64,
            }),
        }
    }

    /// Reads exactly `len` bytes into a new buffer.
    ///
    /// The buffer grows with the data actually read, so a corrupt declared
    /// length cannot trigger a huge allocation up front.
    pub fn read_vec(&mut self, len: u64) -> Result<Vec<u8>> {
        let start = self.offset;
        let mut buf = Vec::new();
        self.by_ref()
            .take(len)
            .read_to_end(&mut buf)
            .map_err(map_read_error)?;
        if (buf.len() as u64) < len {
            return Err(MatError::TruncatedRead {
                offset: start,
                expected: len,
                found: buf.len() as u64,
            });
        }
        Ok(buf)
    }

    /// Discards exactly `len` bytes.
    pub fn skip(&mut self, len: u64) -> Result<()> {
        let start = self.offset;
        let skipped = io::copy(&mut self.by_ref().take(len), &mut io::sink()).map_err(map_read_error)?;
        if skipped < len {
            return Err(MatError::TruncatedRead {
                offset: start,
                expected: len,
                found: skipped,
            });
        }
        Ok(())
    }

    fn fill(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => {
                    filled += n;
                    self.offset += n as u64;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(map_read_error(e)),
            }
        }
        Ok(filled)
    }
}

impl Read for ByteSource<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.offset += n as u64;
        Ok(n)
    }
}

/// Converts a read failure, recognizing aborts raised by a cancellable reader.
pub fn map_read_error(e: io::Error) -> MatError {
    if e.get_ref().is_some_and(|inner| inner.is::<ReadCancelled>()) {
        MatError::Cancelled
    } else {
        MatError::Io(e)
    }
}
