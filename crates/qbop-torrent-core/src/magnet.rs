//! Info-hash extraction from magnet URIs.

use crate::error::MagnetError;

const BTIH_MARKER: &str = "btih:";

/// Return the BitTorrent info-hash carried by a magnet URI.
///
/// The hash is the text between the first `btih:` marker and the next `&`
/// (or the end of the string). Its length and alphabet are not validated.
///
/// # Errors
///
/// Returns [`MagnetError::MissingMarker`] when `btih:` is absent and
/// [`MagnetError::EmptyHash`] when the marker ends the URI. A marker directly
/// followed by `&` yields an empty hash.
pub fn torrent_hash(magnet_uri: &str) -> Result<&str, MagnetError> {
    let start = magnet_uri
        .find(BTIH_MARKER)
        .map(|index| index + BTIH_MARKER.len())
        .ok_or(MagnetError::MissingMarker)?;

    if start == magnet_uri.len() {
        return Err(MagnetError::EmptyHash);
    }
    let rest = &magnet_uri[start..];
    Ok(rest.split_once('&').map_or(rest, |(hash, _)| hash))
}
