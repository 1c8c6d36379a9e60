//! Torrent custom resource and remote record types.

mod conditions;

use std::fmt::{self, Display, Formatter};

use kube::{CustomResource, ResourceExt};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub use conditions::{Condition, ConditionStatus, ConditionType, Conditions};

/// Finalizer that blocks removal until the remote torrent is deleted.
pub const TORRENT_FINALIZER: &str = "torrent.qbittorrent.io/finalizer";

/// Desired state of a torrent, as declared by the user.
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[kube(
    group = "torrent.qbittorrent.io",
    version = "v1alpha1",
    kind = "Torrent",
    plural = "torrents",
    namespaced,
    status = "TorrentStatus",
    printcolumn = r#"{"name":"State","type":"string","jsonPath":".status.state"}"#,
    printcolumn = r#"{"name":"Name","type":"string","jsonPath":".status.name"}"#,
    printcolumn = r#"{"name":"Size","type":"string","jsonPath":".status.total_size"}"#,
    printcolumn = r#"{"name":"Progress","type":"string","jsonPath":".status.amount_left"}"#
)]
pub struct TorrentSpec {
    /// Magnet link identifying the torrent. Changes after admission are not re-synced.
    pub magnet_uri: String,
}

/// Observed state mirrored from the remote service.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct TorrentStatus {
    /// Path of the torrent content on the remote host.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content_path: String,
    /// Time the torrent was added, in epoch seconds.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub added_on: i64,
    /// Remote lifecycle state (`downloading`, `uploading`, `pausedDL`, ...).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub state: String,
    /// Total size of the selected content in bytes.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub total_size: i64,
    /// Display name reported by the remote service.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Seconds the torrent has been active.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub time_active: i64,
    /// Bytes still to download.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub amount_left: i64,
    /// Info-hash reported by the remote service.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub hash: String,
    /// Latest reconciliation observations.
    #[serde(default, skip_serializing_if = "Conditions::is_empty")]
    #[schemars(with = "Vec<Condition>")]
    pub conditions: Conditions,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_zero(value: &i64) -> bool {
    *value == 0
}

impl Torrent {
    /// Namespace-qualified identifier of this resource.
    #[must_use]
    pub fn resource_id(&self) -> ResourceId {
        ResourceId {
            namespace: self.namespace(),
            name: self.name_any(),
        }
    }

    /// Whether the orchestration runtime has marked the resource for deletion.
    #[must_use]
    pub const fn is_being_deleted(&self) -> bool {
        self.metadata.deletion_timestamp.is_some()
    }

    /// Whether the operator finalizer is present.
    #[must_use]
    pub fn has_finalizer(&self) -> bool {
        self.finalizers()
            .iter()
            .any(|finalizer| finalizer == TORRENT_FINALIZER)
    }

    /// Add the operator finalizer, returning `true` if it was missing.
    pub fn add_finalizer(&mut self) -> bool {
        if self.has_finalizer() {
            return false;
        }
        self.finalizers_mut().push(TORRENT_FINALIZER.to_string());
        true
    }

    /// Remove the operator finalizer, returning `true` if it was present.
    pub fn remove_finalizer(&mut self) -> bool {
        let finalizers = self.finalizers_mut();
        let before = finalizers.len();
        finalizers.retain(|finalizer| finalizer != TORRENT_FINALIZER);
        finalizers.len() != before
    }

    /// Hash recorded in status, or an empty string before the first sync.
    #[must_use]
    pub fn observed_hash(&self) -> &str {
        self.status.as_ref().map_or("", |status| status.hash.as_str())
    }

    /// Mutable status, created empty on first access.
    pub fn status_or_default(&mut self) -> &mut TorrentStatus {
        self.status.get_or_insert_with(TorrentStatus::default)
    }
}

/// Namespace-qualified identifier of a tracked resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceId {
    /// Namespace, absent for cluster-scoped lookups.
    pub namespace: Option<String>,
    /// Resource name.
    pub name: String,
}

impl ResourceId {
    /// Identifier for a namespaced resource.
    #[must_use]
    pub fn namespaced(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            name: name.into(),
        }
    }
}

impl Display for ResourceId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(namespace) => write!(formatter, "{namespace}/{}", self.name),
            None => formatter.write_str(&self.name),
        }
    }
}

/// Stable reasons recorded on conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    /// The torrent was submitted to the remote service.
    TorrentAdded,
    /// The torrent is listed by the remote service.
    TorrentActive,
    /// Listing torrents failed.
    FailedToGetTorrentInfo,
    /// Submitting the torrent failed.
    FailedToAddTorrent,
    /// Deleting the torrent failed.
    FailedToDeleteTorrent,
}

impl Reason {
    /// Machine-readable reason string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TorrentAdded => "TorrentAdded",
            Self::TorrentActive => "TorrentActive",
            Self::FailedToGetTorrentInfo => "FailedToGetTorrentInfo",
            Self::FailedToAddTorrent => "FailedToAddTorrent",
            Self::FailedToDeleteTorrent => "FailedToDeleteTorrent",
        }
    }
}

impl Display for Reason {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Torrent entry returned by `/api/v2/torrents/info`, limited to mirrored fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteTorrent {
    /// Time the torrent was added, in epoch seconds.
    pub added_on: i64,
    /// Bytes still to download.
    pub amount_left: i64,
    /// Path of the torrent content.
    pub content_path: String,
    /// Info-hash, lowercase hex for v1 torrents.
    pub hash: String,
    /// Magnet link reconstructed by the service.
    pub magnet_uri: String,
    /// Display name.
    pub name: String,
    /// Size of the selected files in bytes.
    pub size: i64,
    /// Lifecycle state.
    pub state: String,
    /// Total size of all files in bytes.
    pub total_size: i64,
    /// Seconds the torrent has been active.
    pub time_active: i64,
}

impl RemoteTorrent {
    /// Whether this record carries the given info-hash, ignoring ASCII case.
    #[must_use]
    pub fn matches_hash(&self, hash: &str) -> bool {
        self.hash.eq_ignore_ascii_case(hash)
    }
}
