//! Reconciliation pass for a single `Torrent` resource.
//!
//! # Design
//! - Every pass starts from the stored object; nothing is cached between passes.
//! - Remote failures become `Degraded` conditions plus a fixed requeue.
//!   Malformed magnet URIs, store failures and cancellation abort the pass.
//! - The finalizer is persisted in a pass of its own before any remote side
//!   effect is attempted.
//! - Status is written only when the pass changed it.

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use qbop_torrent_core::error::error_chain;
use qbop_torrent_core::{
    Reason, RemoteError, RemoteTorrentService, ResourceId, Torrent, torrent_hash,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::ReconcileError;
use crate::outcome::{Outcome, RequeuePolicy};
use crate::status::sync_status;
use crate::store::TorrentStore;

const ADDED_MESSAGE: &str = "Torrent added to qBittorrent";
const ACTIVE_MESSAGE: &str = "Torrent is active on qBittorrent";

/// Drives `Torrent` resources towards the remote service state.
pub struct TorrentReconciler {
    store: Arc<dyn TorrentStore>,
    remote: Arc<dyn RemoteTorrentService>,
    policy: RequeuePolicy,
}

impl TorrentReconciler {
    /// Build a reconciler with the default requeue delays.
    #[must_use]
    pub fn new(store: Arc<dyn TorrentStore>, remote: Arc<dyn RemoteTorrentService>) -> Self {
        Self::with_policy(store, remote, RequeuePolicy::default())
    }

    /// Build a reconciler with explicit requeue delays.
    #[must_use]
    pub fn with_policy(
        store: Arc<dyn TorrentStore>,
        remote: Arc<dyn RemoteTorrentService>,
        policy: RequeuePolicy,
    ) -> Self {
        Self {
            store,
            remote,
            policy,
        }
    }

    /// Requeue delays in use.
    #[must_use]
    pub const fn policy(&self) -> &RequeuePolicy {
        &self.policy
    }

    /// Run one pass for the identified resource.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::MalformedMagnet`] when no hash can be derived,
    /// [`ReconcileError::Store`] when the resource cannot be read or written and
    /// [`ReconcileError::Cancelled`] when `cancel` fires mid-pass.
    pub async fn reconcile(
        &self,
        id: &ResourceId,
        cancel: &CancellationToken,
    ) -> Result<Outcome, ReconcileError> {
        let Some(torrent) = guarded(cancel, id, self.store.get(id)).await?? else {
            debug!(resource = %id, "torrent no longer exists");
            return Ok(Outcome::done());
        };

        if torrent.is_being_deleted() {
            return self.finalize(id, torrent, cancel).await;
        }

        if !torrent.has_finalizer() {
            let mut torrent = torrent;
            torrent.add_finalizer();
            self.update(id, &torrent, cancel).await?;
            info!(resource = %id, "finalizer added");
            return Ok(Outcome::requeue(self.policy.finalizer));
        }

        self.sync(id, torrent, cancel).await
    }

    async fn finalize(
        &self,
        id: &ResourceId,
        mut torrent: Torrent,
        cancel: &CancellationToken,
    ) -> Result<Outcome, ReconcileError> {
        if !torrent.has_finalizer() {
            debug!(resource = %id, "deleted torrent carries no finalizer");
            return Ok(Outcome::done());
        }

        let hash = torrent.observed_hash().to_string();
        if hash.is_empty() {
            debug!(resource = %id, "no remote torrent recorded, skipping delete");
        } else {
            info!(resource = %id, hash = %hash, "deleting torrent from qbittorrent");
            let deleted = guarded(cancel, id, self.remote.delete_torrent(&hash, true)).await?;
            if let Err(err) = deleted {
                self.degrade(id, torrent, Reason::FailedToDeleteTorrent, &err, cancel)
                    .await?;
                return Ok(Outcome::requeue(self.policy.error));
            }
        }

        torrent.remove_finalizer();
        self.update(id, &torrent, cancel).await?;
        info!(resource = %id, "finalizer removed");
        Ok(Outcome::done())
    }

    async fn sync(
        &self,
        id: &ResourceId,
        mut torrent: Torrent,
        cancel: &CancellationToken,
    ) -> Result<Outcome, ReconcileError> {
        let magnet_uri = torrent.spec.magnet_uri.clone();
        let hash = torrent_hash(&magnet_uri).map_err(|source| ReconcileError::MalformedMagnet {
            resource: id.to_string(),
            source,
        })?;

        let lookup = guarded(cancel, id, self.remote.get_torrent(hash)).await?;
        let remote = match lookup {
            Ok(remote) => remote,
            Err(err) => {
                self.degrade(id, torrent, Reason::FailedToGetTorrentInfo, &err, cancel)
                    .await?;
                return Ok(Outcome::requeue(self.policy.error));
            }
        };

        let Some(remote) = remote else {
            info!(resource = %id, hash, "torrent missing on qbittorrent, adding");
            let added = guarded(cancel, id, self.remote.add_torrent(&magnet_uri)).await?;
            if let Err(err) = added {
                self.degrade(id, torrent, Reason::FailedToAddTorrent, &err, cancel)
                    .await?;
                return Ok(Outcome::requeue(self.policy.error));
            }

            let changed = torrent.status_or_default().conditions.mark_available(
                Reason::TorrentAdded,
                ADDED_MESSAGE,
                Utc::now(),
            );
            self.update_status_if(changed, id, torrent, cancel).await?;
            return Ok(Outcome::requeue(self.policy.created));
        };

        let changed = sync_status(torrent.status_or_default(), &remote);
        torrent = self.update_status_if(changed, id, torrent, cancel).await?;

        let changed = torrent.status_or_default().conditions.mark_available(
            Reason::TorrentActive,
            ACTIVE_MESSAGE,
            Utc::now(),
        );
        self.update_status_if(changed, id, torrent, cancel).await?;
        Ok(Outcome::requeue(self.policy.active))
    }

    async fn degrade(
        &self,
        id: &ResourceId,
        mut torrent: Torrent,
        reason: Reason,
        err: &RemoteError,
        cancel: &CancellationToken,
    ) -> Result<Torrent, ReconcileError> {
        let message = error_chain(err);
        warn!(resource = %id, reason = %reason, error = %message, "qbittorrent call failed");
        let changed = torrent
            .status_or_default()
            .conditions
            .mark_degraded(reason, message, Utc::now());
        self.update_status_if(changed, id, torrent, cancel).await
    }

    async fn update(
        &self,
        id: &ResourceId,
        torrent: &Torrent,
        cancel: &CancellationToken,
    ) -> Result<Torrent, ReconcileError> {
        Ok(guarded(cancel, id, self.store.update(torrent)).await??)
    }

    async fn update_status_if(
        &self,
        changed: bool,
        id: &ResourceId,
        torrent: Torrent,
        cancel: &CancellationToken,
    ) -> Result<Torrent, ReconcileError> {
        if !changed {
            return Ok(torrent);
        }
        Ok(guarded(cancel, id, self.store.update_status(&torrent)).await??)
    }
}

/// Race `future` against cancellation; cancellation wins ties.
async fn guarded<F: Future>(
    cancel: &CancellationToken,
    id: &ResourceId,
    future: F,
) -> Result<F::Output, ReconcileError> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(ReconcileError::Cancelled {
            resource: id.to_string(),
        }),
        output = future => Ok(output),
    }
}
