//! Requeue values returned by a reconciliation pass.

use std::time::Duration;

/// Result of a successful pass: when, if ever, to run it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    requeue_after: Option<Duration>,
}

impl Outcome {
    /// Run the pass again after `delay`.
    #[must_use]
    pub const fn requeue(delay: Duration) -> Self {
        Self {
            requeue_after: Some(delay),
        }
    }

    /// Nothing left to do until the resource changes.
    #[must_use]
    pub const fn done() -> Self {
        Self {
            requeue_after: None,
        }
    }

    /// Requested delay before the next pass.
    #[must_use]
    pub const fn requeue_after(&self) -> Option<Duration> {
        self.requeue_after
    }
}

/// Fixed delays used by the reconciler. No backoff is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequeuePolicy {
    /// After the finalizer was added.
    pub finalizer: Duration,
    /// After the torrent was submitted.
    pub created: Duration,
    /// After a remote call failed.
    pub error: Duration,
    /// Steady state polling of an active torrent.
    pub active: Duration,
}

impl Default for RequeuePolicy {
    fn default() -> Self {
        Self {
            finalizer: Duration::from_secs(1),
            created: Duration::from_secs(5),
            error: Duration::from_secs(10),
            active: Duration::from_secs(30),
        }
    }
}
