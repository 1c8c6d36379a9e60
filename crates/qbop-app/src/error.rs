//! # Design
//!
//! - Centralize application-level errors for bootstrap.
//! - Keep error messages constant while carrying context fields for debugging.
//! - Preserve source errors without re-logging at call sites.

use thiserror::Error;

/// Result alias for application operations.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("configuration operation failed")]
    Config {
        /// Operation identifier.
        operation: &'static str,
        /// Source configuration error.
        source: qbop_config::ConfigError,
    },
    /// Telemetry operations failed.
    #[error("telemetry operation failed")]
    Telemetry {
        /// Operation identifier.
        operation: &'static str,
        /// Source telemetry error.
        source: qbop_telemetry::TelemetryError,
    },
    /// The qBittorrent client could not be built or log in.
    #[error("qbittorrent operation failed")]
    Remote {
        /// Operation identifier.
        operation: &'static str,
        /// Source client error.
        source: qbop_torrent_core::RemoteError,
    },
    /// The Kubernetes client could not be built.
    #[error("kubernetes operation failed")]
    Kube {
        /// Operation identifier.
        operation: &'static str,
        /// Source kube error.
        source: kube::Error,
    },
}

impl AppError {
    pub(crate) const fn config(operation: &'static str, source: qbop_config::ConfigError) -> Self {
        Self::Config { operation, source }
    }

    pub(crate) const fn telemetry(
        operation: &'static str,
        source: qbop_telemetry::TelemetryError,
    ) -> Self {
        Self::Telemetry { operation, source }
    }

    pub(crate) const fn remote(
        operation: &'static str,
        source: qbop_torrent_core::RemoteError,
    ) -> Self {
        Self::Remote { operation, source }
    }

    pub(crate) const fn kube(operation: &'static str, source: kube::Error) -> Self {
        Self::Kube { operation, source }
    }
}
