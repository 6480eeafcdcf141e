//! Iterator for sequential access to top-level elements.
//!
//! # Example
//! ```no_run
//! # use mat5_codec::MatReader;
//! # let file = std::fs::File::open("data.mat").unwrap();
//! let mut reader = MatReader::new(std::io::BufReader::new(file)).unwrap();
//! for result in reader.elements() {
//!     let element = result.unwrap();
//!     println!("{:?}: {}", element.name(), element.data_type);
//! }
//! ```

use std::io::Read;

use super::reader::MatReader;
use super::types::error::Result;
use super::types::value::Element;

/// Iterator over the remaining elements of a [`MatReader`].
///
/// Yields `Result<Element>`. An error that leaves the stream on an element
/// boundary (an unsupported array class) is yielded and iteration goes on;
/// any other error is yielded once and ends the iteration.
///
/// Created by [`MatReader::elements()`](crate::MatReader::elements).
pub struct ElementIterator<'a, R: Read> {
    reader: &'a mut MatReader<R>,
    done: bool,
}

impl<'a, R: Read> ElementIterator<'a, R> {
    pub(super) fn new(reader: &'a mut MatReader<R>) -> Self {
        Self { reader, done: false }
    }

    /// Skips elements that failed with a resumable error instead of yielding them.
    pub fn skip_unsupported(self) -> impl Iterator<Item = Result<Element>> {
        self.filter(|result| !matches!(result, Err(e) if e.is_resumable()))
    }
}

impl<R: Read> Iterator for ElementIterator<'_, R> {
    type Item = Result<Element>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.next_element() {
            Ok(Some(element)) => Some(Ok(element)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = !e.is_resumable();
                Some(Err(e))
            }
        }
    }
}
