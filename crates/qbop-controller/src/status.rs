//! Mirror remote torrent fields onto the resource status.

use qbop_torrent_core::{RemoteTorrent, TorrentStatus};
use tracing::{debug, info};

/// Copy every mirrored field that differs, returning `true` when any did.
pub fn sync_status(status: &mut TorrentStatus, remote: &RemoteTorrent) -> bool {
    let mut changed = false;

    if status.state != remote.state {
        info!(
            old_state = %status.state,
            new_state = %remote.state,
            "torrent state changed"
        );
        status.state.clone_from(&remote.state);
        changed = true;
    }

    changed |= assign(&mut status.hash, &remote.hash, "hash");
    changed |= assign(&mut status.name, &remote.name, "name");
    changed |= assign(&mut status.total_size, &remote.total_size, "total_size");
    changed |= assign(&mut status.content_path, &remote.content_path, "content_path");
    changed |= assign(&mut status.added_on, &remote.added_on, "added_on");
    changed |= assign(&mut status.time_active, &remote.time_active, "time_active");
    changed |= assign(&mut status.amount_left, &remote.amount_left, "amount_left");

    changed
}

fn assign<T: PartialEq + Clone>(field: &mut T, value: &T, name: &'static str) -> bool {
    if field == value {
        return false;
    }
    debug!(field = name, "torrent status field changed");
    field.clone_from(value);
    true
}
