//! `TorrentStore` backed by the Kubernetes API server.

use async_trait::async_trait;
use kube::api::{Api, PostParams};
use kube::Client;
use qbop_controller::{StoreError, TorrentStore};
use qbop_torrent_core::{ResourceId, Torrent};
use tracing::debug;

/// Reads and writes `Torrent` objects through `kube::Api`.
#[derive(Clone)]
pub struct KubeTorrentStore {
    client: Client,
}

impl KubeTorrentStore {
    /// Wrap a Kubernetes client.
    #[must_use]
    pub const fn new(client: Client) -> Self {
        Self { client }
    }

    fn api(&self, namespace: Option<&str>) -> Api<Torrent> {
        match namespace {
            Some(namespace) => Api::namespaced(self.client.clone(), namespace),
            None => Api::default_namespaced(self.client.clone()),
        }
    }
}

#[async_trait]
impl TorrentStore for KubeTorrentStore {
    async fn get(&self, id: &ResourceId) -> Result<Option<Torrent>, StoreError> {
        self.api(id.namespace.as_deref())
            .get_opt(&id.name)
            .await
            .map_err(|source| StoreError::new("get", id, source))
    }

    async fn update(&self, torrent: &Torrent) -> Result<Torrent, StoreError> {
        let id = torrent.resource_id();
        debug!(resource = %id, "replacing torrent");
        self.api(id.namespace.as_deref())
            .replace(&id.name, &PostParams::default(), torrent)
            .await
            .map_err(|source| StoreError::new("update", &id, source))
    }

    async fn update_status(&self, torrent: &Torrent) -> Result<Torrent, StoreError> {
        let id = torrent.resource_id();
        debug!(resource = %id, "replacing torrent status");
        let body =
            serde_json::to_vec(torrent).map_err(|source| StoreError::new("update_status", &id, source))?;
        self.api(id.namespace.as_deref())
            .replace_status(&id.name, &PostParams::default(), body)
            .await
            .map_err(|source| StoreError::new("update_status", &id, source))
    }
}
