//! Drain-then-terminate shutdown sequencing.
//!
//! The coordinator moves through three states:
//!
//! ```text
//! Running --trigger()--> Draining --tracker drained--> Stopped
//! ```
//!
//! Intake is not synchronized against the trigger: a submission accepted
//! after the trigger is still registered with the [`TaskTracker`] and still
//! drained. Rejecting intake while draining is opt-in at the service level.
//!
//! The transport must hold on to [`ShutdownCoordinator::stopped`] as its
//! graceful-shutdown future so that it is only released after the drain.

use crate::{Result, TaskTracker};
use core::time::Duration;
use portable_atomic::{AtomicU8, Ordering};
use tokio_util::sync::{CancellationToken, WaitForCancellationFutureOwned};

/// Observable lifecycle of a [`ShutdownCoordinator`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum ShutdownState {
    /// Accepting work, no shutdown requested.
    Running = 0,
    /// Shutdown requested; waiting for outstanding computations.
    Draining = 1,
    /// All tracked work finished (or the drain limit elapsed). Terminal.
    Stopped = 2,
}

impl ShutdownState {
    const fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Running,
            1 => Self::Draining,
            _ => Self::Stopped,
        }
    }
}

/// Sequences graceful shutdown around a [`TaskTracker`].
#[derive(Debug)]
pub struct ShutdownCoordinator {
    tracker: TaskTracker,
    state: AtomicU8,
    triggered: CancellationToken,
    stopped: CancellationToken,
    drain_timeout: Option<Duration>,
}

impl ShutdownCoordinator {
    /// Creates a coordinator draining `tracker`.
    ///
    /// With `drain_timeout` set to `None` the drain waits unconditionally; a
    /// computation that never finishes then blocks shutdown forever.
    pub fn new(tracker: TaskTracker, drain_timeout: Option<Duration>) -> Self {
        Self {
            tracker,
            state: AtomicU8::new(ShutdownState::Running as u8),
            triggered: CancellationToken::new(),
            stopped: CancellationToken::new(),
            drain_timeout,
        }
    }

    pub fn state(&self) -> ShutdownState {
        ShutdownState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Whether shutdown has been requested.
    pub fn is_draining(&self) -> bool {
        self.state() != ShutdownState::Running
    }

    /// Requests shutdown. Safe to call any number of times from anywhere.
    ///
    /// Returns `true` only for the call that moved the coordinator out of
    /// [`ShutdownState::Running`].
    pub fn trigger(&self) -> bool {
        let first = self
            .state
            .compare_exchange(
                ShutdownState::Running as u8,
                ShutdownState::Draining as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok();
        if first {
            #[cfg(feature = "tracing")]
            tracing::info!("Shutdown requested");
        }
        self.triggered.cancel();
        first
    }

    /// Resolves once [`Self::trigger`] has been called.
    pub fn triggered(&self) -> WaitForCancellationFutureOwned {
        self.triggered.clone().cancelled_owned()
    }

    /// Resolves once the coordinator reaches [`ShutdownState::Stopped`].
    pub fn stopped(&self) -> WaitForCancellationFutureOwned {
        self.stopped.clone().cancelled_owned()
    }

    /// Drives the shutdown sequence to completion.
    ///
    /// Waits for the trigger, then for the tracker to drain, then flips to
    /// [`ShutdownState::Stopped`] and releases everyone awaiting
    /// [`Self::stopped`]. Blocks only the caller, never intake.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::DrainTimeout`] if a drain limit was configured
    /// and elapsed. The coordinator still reaches `Stopped` in that case.
    pub async fn run(&self) -> Result<()> {
        self.triggered.cancelled().await;

        #[cfg(feature = "tracing")]
        tracing::info!(
            "Draining in-flight digest computations ({} outstanding)",
            self.tracker.outstanding()
        );

        let result = match self.drain_timeout {
            Some(limit) => self.tracker.await_drain_timeout(limit).await,
            None => {
                self.tracker.await_drain().await;
                Ok(())
            }
        };

        match &result {
            Ok(()) => {
                #[cfg(feature = "tracing")]
                tracing::debug!("All digest computations drained");
            }
            Err(_e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!("Graceful drain incomplete: {_e}");
            }
        }

        self.state
            .store(ShutdownState::Stopped as u8, Ordering::Release);
        self.stopped.cancel();
        result
    }
}
