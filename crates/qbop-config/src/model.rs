//! Typed operator settings.

use std::fmt::{self, Debug, Formatter};
use std::time::Duration;

use url::Url;

/// Default per-request timeout against qBittorrent.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
/// Default number of resources reconciled concurrently.
pub const DEFAULT_CONCURRENCY: u16 = 4;
/// Default log filter.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Complete operator configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorConfig {
    /// Remote service connection.
    pub qbittorrent: QbittorrentSettings,
    /// Controller runtime tunables.
    pub controller: ControllerSettings,
    /// Log output.
    pub logging: LoggingSettings,
}

/// Connection settings for the qBittorrent Web API.
#[derive(Clone, PartialEq, Eq)]
pub struct QbittorrentSettings {
    /// Base URL of the Web UI.
    pub url: Url,
    /// Login name.
    pub username: String,
    /// Login password, redacted from debug output.
    pub password: String,
    /// Timeout applied to every request.
    pub timeout: Duration,
    /// Log in again when the session is rejected.
    pub reauthenticate: bool,
}

impl Debug for QbittorrentSettings {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("QbittorrentSettings")
            .field("url", &self.url.as_str())
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("reauthenticate", &self.reauthenticate)
            .finish()
    }
}

/// Controller runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerSettings {
    /// Namespace to watch; `None` watches every namespace.
    pub watch_namespace: Option<String>,
    /// Maximum concurrent reconciliations.
    pub concurrency: u16,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            watch_namespace: None,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

/// Log settings handed to telemetry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Default filter directive, overridden by `RUST_LOG`.
    pub level: String,
    /// `json` or `pretty`; inferred from the build profile when unset.
    pub format: Option<String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            format: None,
        }
    }
}
