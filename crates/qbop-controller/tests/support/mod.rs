//! In-memory fakes for the store and remote service seams.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use kube::ResourceExt;
use qbop_controller::{StoreError, TorrentStore};
use qbop_torrent_core::{
    RemoteError, RemoteResult, RemoteTorrent, RemoteTorrentService, ResourceId, Torrent,
    TorrentSpec,
};
use tokio::sync::Mutex;

pub const NAMESPACE: &str = "media";

/// Build a torrent resource with the given name and magnet URI.
pub fn torrent(name: &str, magnet_uri: &str) -> Torrent {
    let mut torrent = Torrent::new(
        name,
        TorrentSpec {
            magnet_uri: magnet_uri.to_string(),
        },
    );
    torrent.metadata.namespace = Some(NAMESPACE.to_string());
    torrent
}

/// Same as [`torrent`] with the finalizer already in place.
pub fn finalized(name: &str, magnet_uri: &str) -> Torrent {
    let mut torrent = torrent(name, magnet_uri);
    torrent.add_finalizer();
    torrent
}

/// Mark a resource as being deleted.
pub fn deleting(mut torrent: Torrent) -> Torrent {
    torrent.metadata.deletion_timestamp = Some(Time(Utc::now()));
    torrent
}

pub fn remote_record(hash: &str, state: &str) -> RemoteTorrent {
    RemoteTorrent {
        hash: hash.to_string(),
        name: "ubuntu.iso".to_string(),
        state: state.to_string(),
        total_size: 4_096,
        content_path: "/downloads/ubuntu.iso".to_string(),
        added_on: 1_700_000_000,
        time_active: 120,
        amount_left: 2_048,
        ..RemoteTorrent::default()
    }
}

/// Store backed by a map, mimicking API server finalizer handling.
#[derive(Default)]
pub struct InMemoryStore {
    objects: Mutex<HashMap<ResourceId, Torrent>>,
    updates: AtomicUsize,
    status_updates: AtomicUsize,
    fail_writes: AtomicBool,
}

impl InMemoryStore {
    pub async fn insert(&self, torrent: Torrent) -> ResourceId {
        let id = torrent.resource_id();
        self.objects.lock().await.insert(id.clone(), torrent);
        id
    }

    pub async fn object(&self, id: &ResourceId) -> Option<Torrent> {
        self.objects.lock().await.get(id).cloned()
    }

    pub fn updates(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    pub fn status_updates(&self) -> usize {
        self.status_updates.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.updates() + self.status_updates()
    }

    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    fn check_writable(&self, operation: &'static str, id: &ResourceId) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::new(
                operation,
                id,
                io::Error::other("the object has been modified"),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl TorrentStore for InMemoryStore {
    async fn get(&self, id: &ResourceId) -> Result<Option<Torrent>, StoreError> {
        Ok(self.objects.lock().await.get(id).cloned())
    }

    async fn update(&self, torrent: &Torrent) -> Result<Torrent, StoreError> {
        let id = torrent.resource_id();
        self.check_writable("update", &id)?;
        self.updates.fetch_add(1, Ordering::SeqCst);

        let mut objects = self.objects.lock().await;
        let mut stored = torrent.clone();
        if let Some(existing) = objects.get(&id) {
            stored.status.clone_from(&existing.status);
        }
        if stored.is_being_deleted() && stored.finalizers().is_empty() {
            objects.remove(&id);
        } else {
            objects.insert(id, stored.clone());
        }
        Ok(stored)
    }

    async fn update_status(&self, torrent: &Torrent) -> Result<Torrent, StoreError> {
        let id = torrent.resource_id();
        self.check_writable("update_status", &id)?;
        self.status_updates.fetch_add(1, Ordering::SeqCst);

        let mut objects = self.objects.lock().await;
        let Some(existing) = objects.get_mut(&id) else {
            return Err(StoreError::new(
                "update_status",
                &id,
                io::Error::new(io::ErrorKind::NotFound, "torrent not found"),
            ));
        };
        existing.status.clone_from(&torrent.status);
        Ok(existing.clone())
    }
}

/// Remote service fake with scripted records and failures.
#[derive(Default)]
pub struct ScriptedRemote {
    torrents: Mutex<Vec<RemoteTorrent>>,
    calls: Mutex<Vec<String>>,
    fail_list: AtomicBool,
    fail_add: AtomicBool,
    fail_delete: AtomicBool,
    hang: AtomicBool,
}

impl ScriptedRemote {
    pub async fn set_torrents(&self, torrents: Vec<RemoteTorrent>) {
        *self.torrents.lock().await = torrents;
    }

    pub async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }

    pub fn fail_list(&self) {
        self.fail_list.store(true, Ordering::SeqCst);
    }

    pub fn fail_add(&self) {
        self.fail_add.store(true, Ordering::SeqCst);
    }

    pub fn fail_delete(&self) {
        self.fail_delete.store(true, Ordering::SeqCst);
    }

    /// Make every call block until the caller gives up.
    pub fn hang(&self) {
        self.hang.store(true, Ordering::SeqCst);
    }

    async fn record(&self, call: String) {
        self.calls.lock().await.push(call);
        if self.hang.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
    }
}

fn connection_refused(operation: &'static str) -> RemoteError {
    RemoteError::transport(
        operation,
        io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused"),
    )
}

#[async_trait]
impl RemoteTorrentService for ScriptedRemote {
    async fn list_torrents(&self) -> RemoteResult<Vec<RemoteTorrent>> {
        self.record("list".to_string()).await;
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(RemoteError::Status {
                operation: "torrents.info",
                status: 500,
            });
        }
        Ok(self.torrents.lock().await.clone())
    }

    async fn add_torrent(&self, magnet_uri: &str) -> RemoteResult<()> {
        self.record(format!("add:{magnet_uri}")).await;
        if self.fail_add.load(Ordering::SeqCst) {
            return Err(connection_refused("torrents.add"));
        }
        Ok(())
    }

    async fn delete_torrent(&self, hash: &str, delete_files: bool) -> RemoteResult<()> {
        self.record(format!("delete:{hash}:{delete_files}")).await;
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(connection_refused("torrents.delete"));
        }
        Ok(())
    }
}
