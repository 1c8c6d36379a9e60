//! Failures that abort a reconciliation pass.

use qbop_torrent_core::MagnetError;
use thiserror::Error;

use crate::store::StoreError;

/// Errors surfaced to the runtime instead of being recorded as conditions.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The desired magnet URI does not yield an info-hash.
    #[error("torrent {resource} has a malformed magnet uri")]
    MalformedMagnet {
        /// Resource carrying the bad URI.
        resource: String,
        /// Extraction failure.
        #[source]
        source: MagnetError,
    },
    /// Reading or writing the resource failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The pass was cancelled before it finished.
    #[error("reconciliation of {resource} was cancelled")]
    Cancelled {
        /// Resource whose pass was interrupted.
        resource: String,
    },
}

impl ReconcileError {
    /// Whether the pass stopped because of cancellation.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}
