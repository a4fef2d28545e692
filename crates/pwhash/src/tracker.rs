//! Outstanding-work accounting for delayed digest computations.
//!
//! A [`TaskGuard`] *is* a registration: it is created synchronously by
//! [`TaskTracker::register`] before the task it stands for is spawned, and
//! the registration is released exactly once when the guard is completed or
//! dropped. Because release happens in `Drop`, a task that errors or panics
//! still deregisters itself and can never hang a drain.

use crate::{Error, Result};
use core::time::Duration;
use tokio::time::timeout;
use tokio_util::task::{TaskTracker as Inner, task_tracker::TaskTrackerToken};

/// Counts spawned-but-unfinished computations so shutdown can wait for zero.
///
/// Cloning is cheap and every clone observes the same count.
#[derive(Clone, Debug, Default)]
pub struct TaskTracker {
    inner: Inner,
}

impl TaskTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one unit of outstanding work.
    ///
    /// Must be called before the unit is spawned: once this returns, a drain
    /// started at any later point will wait for the returned guard.
    pub fn register(&self) -> TaskGuard {
        TaskGuard {
            _token: self.inner.token(),
        }
    }

    /// Number of registrations not yet completed.
    pub fn outstanding(&self) -> usize {
        self.inner.len()
    }

    /// Whether a drain has been requested.
    pub fn is_draining(&self) -> bool {
        self.inner.is_closed()
    }

    /// Waits until the outstanding count reaches zero.
    ///
    /// Returns immediately if nothing is outstanding. Work registered after
    /// the drain has started is still counted and still waited for, provided
    /// it registers before the count reaches zero.
    pub async fn await_drain(&self) {
        self.inner.close();
        self.inner.wait().await;
    }

    /// Like [`Self::await_drain`], but gives up after `limit`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DrainTimeout`] with the number of registrations still
    /// outstanding when the limit elapsed. Those tasks are not cancelled.
    pub async fn await_drain_timeout(&self, limit: Duration) -> Result<()> {
        match timeout(limit, self.await_drain()).await {
            Ok(()) => Ok(()),
            Err(_) => Err(Error::DrainTimeout {
                outstanding: self.outstanding(),
            }),
        }
    }
}

/// A live registration in a [`TaskTracker`].
///
/// Dropping the guard completes the registration.
#[derive(Debug)]
#[must_use = "dropping a TaskGuard immediately completes its registration"]
pub struct TaskGuard {
    _token: TaskTrackerToken,
}

impl TaskGuard {
    /// Marks the unit of work complete.
    pub fn complete(self) {
        drop(self);
    }
}
