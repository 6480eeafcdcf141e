//! Cooperative cancellation for blocking byte sources.
//!
//! The codec holds no state beyond the current call stack, so aborting a
//! read through [`CancellableReader`] is always safe: the decode in flight
//! fails with [`MatError::Cancelled`](crate::MatError::Cancelled) and the
//! reader can simply be dropped.

use std::fmt;
use std::io::{self, Read};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use log::debug;

/// Cancellation token shared between a reader and whoever may abort it.
///
/// Cloning a token shares the same underlying flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Error payload carried inside the `io::Error` of an aborted read.
#[derive(Debug)]
pub struct ReadCancelled {
    deadline_expired: bool,
}

impl fmt::Display for ReadCancelled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.deadline_expired {
            f.write_str("read deadline expired")
        } else {
            f.write_str("read cancelled")
        }
    }
}

impl std::error::Error for ReadCancelled {}

/// A reader that refuses further reads once its token is cancelled or its
/// deadline has passed.
///
/// The check happens before each call into the inner reader; a read that is
/// already blocked in the inner reader is not interrupted.
#[derive(Debug)]
pub struct CancellableReader<R> {
    inner: R,
    token: CancelToken,
    deadline: Option<Instant>,
}

impl<R: Read> CancellableReader<R> {
    pub fn new(inner: R, token: CancelToken) -> Self {
        Self { inner, token, deadline: None }
    }

    /// Fails every read issued after `deadline`.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Fails every read issued once `timeout` has elapsed from now.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn token(&self) -> &CancelToken {
        &self.token
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for CancellableReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.token.is_cancelled() {
            debug!("Read refused: token cancelled");
            return Err(io::Error::other(ReadCancelled { deadline_expired: false }));
        }
        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            debug!("Read refused: deadline expired");
            return Err(io::Error::new(
                io::ErrorKind::TimedOut,
                ReadCancelled { deadline_expired: true },
            ));
        }
        self.inner.read(buf)
    }
}
