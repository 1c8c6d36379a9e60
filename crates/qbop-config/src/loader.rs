//! Build [`OperatorConfig`] from environment variables.

use crate::error::{ConfigError, ConfigResult};
use crate::model::{
    ControllerSettings, DEFAULT_TIMEOUT, LoggingSettings, OperatorConfig, QbittorrentSettings,
};
use crate::validate::{
    parse_base_url, parse_concurrency, parse_flag, parse_log_format, parse_seconds,
};

/// qBittorrent Web UI base URL.
pub const ENV_URL: &str = "QBITTORRENT_URL";
/// qBittorrent login name.
pub const ENV_USERNAME: &str = "QBITTORRENT_USERNAME";
/// qBittorrent login password.
pub const ENV_PASSWORD: &str = "QBITTORRENT_PASSWORD";
/// Per-request timeout in seconds.
pub const ENV_TIMEOUT_SECS: &str = "QBITTORRENT_TIMEOUT_SECS";
/// Re-login on rejected sessions.
pub const ENV_REAUTHENTICATE: &str = "QBOP_REAUTHENTICATE";
/// Restrict the watch to one namespace.
pub const ENV_WATCH_NAMESPACE: &str = "QBOP_WATCH_NAMESPACE";
/// Concurrent reconciliations.
pub const ENV_CONCURRENCY: &str = "QBOP_CONCURRENCY";
/// Default log filter.
pub const ENV_LOG_LEVEL: &str = "QBOP_LOG_LEVEL";
/// Log output format.
pub const ENV_LOG_FORMAT: &str = "QBOP_LOG_FORMAT";

impl OperatorConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is missing or any value is invalid.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary lookup.
    ///
    /// Blank values are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is missing or any value is invalid.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let require = |name: &'static str| get(name).ok_or(ConfigError::MissingEnv { name });

        let url = parse_base_url(ENV_URL, &require(ENV_URL)?)?;
        let username = require(ENV_USERNAME)?;
        let password = require(ENV_PASSWORD)?;
        let timeout = get(ENV_TIMEOUT_SECS)
            .map(|value| parse_seconds(ENV_TIMEOUT_SECS, &value))
            .transpose()?
            .unwrap_or(DEFAULT_TIMEOUT);
        let reauthenticate = get(ENV_REAUTHENTICATE)
            .map(|value| parse_flag(ENV_REAUTHENTICATE, &value))
            .transpose()?
            .unwrap_or(true);

        let mut controller = ControllerSettings {
            watch_namespace: get(ENV_WATCH_NAMESPACE).map(|value| value.trim().to_string()),
            ..ControllerSettings::default()
        };
        if let Some(value) = get(ENV_CONCURRENCY) {
            controller.concurrency = parse_concurrency(ENV_CONCURRENCY, &value)?;
        }

        let mut logging = LoggingSettings::default();
        if let Some(level) = get(ENV_LOG_LEVEL) {
            logging.level = level.trim().to_string();
        }
        logging.format = get(ENV_LOG_FORMAT)
            .map(|value| parse_log_format(ENV_LOG_FORMAT, &value))
            .transpose()?;

        Ok(Self {
            qbittorrent: QbittorrentSettings {
                url,
                username,
                password,
                timeout,
                reauthenticate,
            },
            controller,
            logging,
        })
    }
}
