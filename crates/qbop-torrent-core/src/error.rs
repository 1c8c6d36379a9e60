//! Error types for magnet parsing and remote service calls.

use std::error::Error;

use thiserror::Error;

/// Boxed source error carried across the remote service seam.
pub type BoxError = Box<dyn Error + Send + Sync>;

/// Failure to derive an info-hash from a magnet URI.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MagnetError {
    /// The URI does not contain the `btih:` marker.
    #[error("magnet uri has no 'btih:' marker")]
    MissingMarker,
    /// The marker ends the URI.
    #[error("magnet uri has no hash after 'btih:'")]
    EmptyHash,
}

/// Errors raised by the remote download service client.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Logging in did not yield a usable session.
    #[error("authentication with qbittorrent failed: {reason}")]
    Authentication {
        /// Machine-readable reason for the failure.
        reason: &'static str,
        /// HTTP status returned by the login endpoint, when one was received.
        status: Option<u16>,
        /// Underlying transport failure, when the request never completed.
        #[source]
        source: Option<BoxError>,
    },
    /// The remote service rejected the current session.
    #[error("unauthorized access to qbittorrent during {operation} (status {status})")]
    Unauthorized {
        /// Operation identifier.
        operation: &'static str,
        /// HTTP status returned by the service.
        status: u16,
    },
    /// The remote service answered with a non-success status.
    #[error("qbittorrent {operation} failed with status {status}")]
    Status {
        /// Operation identifier.
        operation: &'static str,
        /// HTTP status returned by the service.
        status: u16,
    },
    /// The response body could not be decoded.
    #[error("failed to decode qbittorrent response for {operation}")]
    Decode {
        /// Operation identifier.
        operation: &'static str,
        /// Underlying decode error.
        #[source]
        source: BoxError,
    },
    /// The request could not be delivered or timed out.
    #[error("qbittorrent request for {operation} failed")]
    Transport {
        /// Operation identifier.
        operation: &'static str,
        /// Underlying transport error.
        #[source]
        source: BoxError,
    },
}

impl RemoteError {
    /// Build an authentication error without an underlying source.
    #[must_use]
    pub const fn authentication(reason: &'static str, status: Option<u16>) -> Self {
        Self::Authentication {
            reason,
            status,
            source: None,
        }
    }

    /// Build a transport error from any boxed source.
    pub fn transport(operation: &'static str, source: impl Into<BoxError>) -> Self {
        Self::Transport {
            operation,
            source: source.into(),
        }
    }

    /// Build a decode error from any boxed source.
    pub fn decode(operation: &'static str, source: impl Into<BoxError>) -> Self {
        Self::Decode {
            operation,
            source: source.into(),
        }
    }

    /// Whether the error means the session is no longer accepted.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}

/// Convenience alias for remote service results.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Render an error and its source chain as a single line.
#[must_use]
pub fn error_chain(error: &(dyn Error + 'static)) -> String {
    let mut message = error.to_string();
    let mut current = error.source();
    while let Some(source) = current {
        message.push_str(": ");
        message.push_str(&source.to_string());
        current = source.source();
    }
    message
}
