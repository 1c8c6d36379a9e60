#![forbid(unsafe_code)]
#![warn(
    unused,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls
)]

//! Torrent custom resource model, magnet parsing and the remote service seam.
//!
//! Layout: `model/` (custom resource, status, conditions, remote records),
//! `magnet.rs` (info-hash extraction), `service/` (remote service trait),
//! `error.rs` (remote and magnet error types).

pub mod error;
pub mod magnet;
pub mod model;
pub mod service;

pub use error::{MagnetError, RemoteError, RemoteResult};
pub use magnet::torrent_hash;
pub use model::{
    Condition, ConditionStatus, ConditionType, Conditions, Reason, RemoteTorrent, ResourceId,
    TORRENT_FINALIZER, Torrent, TorrentSpec, TorrentStatus,
};
pub use service::RemoteTorrentService;
