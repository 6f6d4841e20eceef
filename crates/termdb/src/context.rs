//! Caller-supplied cancellation handles.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

/// A cancellation handle passed into result-collecting operations.
///
/// [`Collection::find`](crate::Collection::find) consults the context before
/// appending each result; once the context is cancelled or past its
/// deadline, the operation stops and returns the corresponding error with no
/// partial results.
///
/// Contexts are cheap to clone; clones share the same cancellation state, so
/// one side can hold on to a clone and [`cancel`](Context::cancel) it while
/// the other is querying.
///
/// # Example
///
/// ```
/// use termdb::Context;
///
/// let ctx = Context::background();
/// assert!(ctx.check().is_ok());
///
/// ctx.cancel();
/// assert!(ctx.check().is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    cancelled: AtomicBool,
    deadline: Option<Instant>,
}

impl Context {
    /// A context that is never cancelled and has no deadline.
    #[must_use]
    pub fn background() -> Self {
        Self::default()
    }

    /// A context whose deadline is `timeout` from now.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                cancelled: AtomicBool::new(false),
                deadline: Some(Instant::now() + timeout),
            }),
        }
    }

    /// Cancel the context. All clones observe the cancellation.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::Relaxed);
    }

    /// Returns `true` once [`cancel`](Context::cancel) has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Relaxed)
    }

    /// Fails with [`Error::Cancelled`] or [`Error::DeadlineExceeded`] when
    /// the context is no longer live.
    ///
    /// Cancellation takes precedence over the deadline.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(Error::Cancelled);
        }
        if let Some(deadline) = self.inner.deadline {
            if Instant::now() >= deadline {
                return Err(Error::DeadlineExceeded);
            }
        }
        Ok(())
    }
}
