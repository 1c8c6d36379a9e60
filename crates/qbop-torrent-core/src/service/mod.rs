//! Remote download service trait implemented by client adapters.

use async_trait::async_trait;

use crate::error::RemoteResult;
use crate::model::RemoteTorrent;

/// Operations the reconciler needs from the remote download service.
#[async_trait]
pub trait RemoteTorrentService: Send + Sync {
    /// Fetch the full torrent list.
    async fn list_torrents(&self) -> RemoteResult<Vec<RemoteTorrent>>;

    /// Find a single torrent by info-hash.
    ///
    /// `Ok(None)` means the service answered and the torrent is absent, which
    /// callers treat differently from a failed lookup.
    async fn get_torrent(&self, hash: &str) -> RemoteResult<Option<RemoteTorrent>> {
        let torrents = self.list_torrents().await?;
        Ok(torrents
            .into_iter()
            .find(|torrent| torrent.matches_hash(hash)))
    }

    /// Submit a magnet link for download.
    async fn add_torrent(&self, magnet_uri: &str) -> RemoteResult<()>;

    /// Remove a torrent, optionally deleting its downloaded files.
    async fn delete_torrent(&self, hash: &str, delete_files: bool) -> RemoteResult<()>;
}
