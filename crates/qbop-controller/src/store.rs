//! Persistence seam for tracked resources.

use async_trait::async_trait;
use qbop_torrent_core::error::BoxError;
use qbop_torrent_core::{ResourceId, Torrent};
use thiserror::Error;

/// Read/write access to `Torrent` objects owned by the orchestration runtime.
///
/// Writes return the stored object so later writes in the same pass carry the
/// fresh resource version.
#[async_trait]
pub trait TorrentStore: Send + Sync {
    /// Fetch a resource, `Ok(None)` when it no longer exists.
    async fn get(&self, id: &ResourceId) -> Result<Option<Torrent>, StoreError>;

    /// Replace metadata and spec (finalizers).
    async fn update(&self, torrent: &Torrent) -> Result<Torrent, StoreError>;

    /// Replace the status subresource.
    async fn update_status(&self, torrent: &Torrent) -> Result<Torrent, StoreError>;
}

/// Failure reported by a [`TorrentStore`].
#[derive(Debug, Error)]
#[error("torrent store {operation} failed for {resource}")]
pub struct StoreError {
    /// Store operation identifier.
    pub operation: &'static str,
    /// Resource the operation targeted.
    pub resource: String,
    /// Underlying failure.
    #[source]
    pub source: BoxError,
}

impl StoreError {
    /// Wrap a backend failure with the operation and resource it hit.
    pub fn new(operation: &'static str, resource: &ResourceId, source: impl Into<BoxError>) -> Self {
        Self {
            operation,
            resource: resource.to_string(),
            source: source.into(),
        }
    }
}
