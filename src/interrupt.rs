//! Cancellation and timeout guards for calls to external collaborators.
//!
//! Every fetch made while ingesting a revision (polling, configuration
//! resolution, changed-file listing) is raced against the caller's
//! [`CancellationToken`] and bounded by a timeout, so a run never blocks
//! indefinitely and can be abandoned at any point before a version is
//! persisted.

use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Reason an external call did not complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Interrupted {
    /// The caller cancelled the run.
    #[error("operation cancelled")]
    Cancelled,

    /// The call exceeded its time limit.
    #[error("operation timed out after {0:?}")]
    TimedOut(Duration),
}

/// Runs `future` until it completes, `cancel` fires, or `limit` elapses.
///
/// Cancellation is checked before the timeout so a cancelled run never
/// reports a timeout.
///
/// # Errors
///
/// Returns [`Interrupted::Cancelled`] when the token fires first and
/// [`Interrupted::TimedOut`] when the limit elapses first.
pub async fn interruptible<F>(
    cancel: &CancellationToken,
    limit: Duration,
    future: F,
) -> Result<F::Output, Interrupted>
where
    F: Future,
{
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(Interrupted::Cancelled),
        outcome = tokio::time::timeout(limit, future) => {
            outcome.map_err(|_elapsed| Interrupted::TimedOut(limit))
        }
    }
}
